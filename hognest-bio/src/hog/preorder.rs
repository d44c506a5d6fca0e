//! Pre-order flattening of a HOG tree with memoized subtree sizes
//!
//! One explicit-stack walk lists the nodes in pre-order; one reverse sweep
//! over that list accumulates subtree sizes bottom-up, since every node
//! appears after its parent in pre-order. Both passes are O(nodes) and
//! neither recurses, so deep trees cannot exhaust the call stack.

use super::HogNode;
use hognest_core::StructuralError;

#[derive(Debug, Clone)]
pub struct PreorderEntry<N> {
    pub node: N,
    /// Distance from the root (root = 0)
    pub depth: usize,
    /// Pre-order position of the parent
    pub parent: Option<usize>,
    /// Nodes in the subtree rooted here, including the node itself
    pub subtree_size: u64,
}

#[derive(Debug, Clone)]
pub struct PreorderIndex<N> {
    entries: Vec<PreorderEntry<N>>,
}

impl<'a, N: HogNode<'a>> PreorderIndex<N> {
    /// Flatten the tree under `root`
    ///
    /// Fails with [`StructuralError::DepthExceeded`] once a path reaches
    /// `max_depth` nodes, which is also how cycles surface, and with the
    /// node's own error when one of its child links dangles.
    pub fn build(root: N, group_key: &str, max_depth: usize) -> Result<Self, StructuralError> {
        let mut entries: Vec<PreorderEntry<N>> = Vec::new();
        let mut stack = vec![(root, 0usize, None)];
        let mut children = Vec::new();

        while let Some((node, depth, parent)) = stack.pop() {
            if depth >= max_depth {
                return Err(StructuralError::DepthExceeded {
                    group_key: group_key.to_string(),
                    max_depth,
                });
            }

            node.check_links()?;
            let index = entries.len();
            entries.push(PreorderEntry {
                node,
                depth,
                parent,
                subtree_size: 1,
            });

            // Reversed so the first child is popped first
            children.extend(node.children());
            while let Some(child) = children.pop() {
                stack.push((child, depth + 1, Some(index)));
            }
        }

        for index in (1..entries.len()).rev() {
            if let Some(parent) = entries[index].parent {
                entries[parent].subtree_size += entries[index].subtree_size;
            }
        }

        Ok(Self { entries })
    }
}

impl<N> PreorderIndex<N> {
    pub fn entries(&self) -> &[PreorderEntry<N>] {
        &self.entries
    }

    /// Total number of nodes in the tree
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subtree size of the root, i.e. the tree size
    pub fn tree_size(&self) -> u64 {
        self.entries.first().map(|e| e.subtree_size).unwrap_or(0)
    }
}
