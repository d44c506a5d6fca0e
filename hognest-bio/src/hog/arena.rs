//! Flat, index-linked HOG storage
//!
//! Streaming readers build trees bottom-up and link children by position, so
//! nothing stops a broken file from producing a cycle or a link to a node
//! that does not exist. The encoder rejects the first through its depth guard
//! and the second through [`HogNode::check_links`].

use super::{GeneRef, HogNode};
use hognest_core::{StructuralError, TaxonId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaEntry {
    #[serde(default)]
    pub taxon_id: Option<TaxonId>,
    #[serde(default)]
    pub children: Vec<usize>,
    #[serde(default, rename = "genes")]
    pub gene_refs: Vec<GeneRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HogArena {
    nodes: Vec<ArenaEntry>,
}

impl HogArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index
    pub fn push(&mut self, taxon_id: Option<TaxonId>, gene_refs: Vec<GeneRef>) -> usize {
        self.nodes.push(ArenaEntry {
            taxon_id,
            children: Vec::new(),
            gene_refs,
        });
        self.nodes.len() - 1
    }

    /// Link `child` under `parent`; both must already exist
    pub fn add_child(&mut self, parent: usize, child: usize) -> Result<(), StructuralError> {
        if child >= self.nodes.len() {
            return Err(StructuralError::DanglingChild { parent, child });
        }
        match self.nodes.get_mut(parent) {
            Some(entry) => {
                entry.children.push(child);
                Ok(())
            }
            None => Err(StructuralError::DanglingChild { parent, child }),
        }
    }

    /// Check that every child index points at an existing node
    pub fn validate(&self) -> Result<(), StructuralError> {
        for (parent, entry) in self.nodes.iter().enumerate() {
            if let Some(&child) = entry.children.iter().find(|&&c| c >= self.nodes.len()) {
                return Err(StructuralError::DanglingChild { parent, child });
            }
        }
        Ok(())
    }

    pub fn node(&self, index: usize) -> Option<ArenaNode<'_>> {
        (index < self.nodes.len()).then_some(ArenaNode { arena: self, index })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Handle to one node of a [`HogArena`]
#[derive(Debug, Clone, Copy)]
pub struct ArenaNode<'a> {
    arena: &'a HogArena,
    index: usize,
}

impl<'a> ArenaNode<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn entry(&self) -> &'a ArenaEntry {
        &self.arena.nodes[self.index]
    }
}

pub struct ArenaChildren<'a> {
    arena: &'a HogArena,
    indices: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for ArenaChildren<'a> {
    type Item = ArenaNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // Dangling indices are reported by `check_links`
        let arena = self.arena;
        self.indices.find_map(|&index| arena.node(index))
    }
}

impl<'a> HogNode<'a> for ArenaNode<'a> {
    type Children = ArenaChildren<'a>;

    fn taxon_id(self) -> Option<TaxonId> {
        self.entry().taxon_id
    }

    fn children(self) -> Self::Children {
        ArenaChildren {
            arena: self.arena,
            indices: self.entry().children.iter(),
        }
    }

    fn gene_refs(self) -> &'a [GeneRef] {
        &self.entry().gene_refs
    }

    fn check_links(self) -> Result<(), StructuralError> {
        match self
            .entry()
            .children
            .iter()
            .find(|&&child| child >= self.arena.len())
        {
            Some(&child) => Err(StructuralError::DanglingChild {
                parent: self.index,
                child,
            }),
            None => Ok(()),
        }
    }
}
