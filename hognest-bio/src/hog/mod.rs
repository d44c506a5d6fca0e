//! Hierarchical orthologous group (HOG) trees
//!
//! The encoder never touches a concrete tree type. It walks anything that
//! implements [`HogNode`], so the owned tree deserialized from the reader's
//! JSON hand-off ([`OrthologGroupNode`]) and the flat index-linked
//! [`HogArena`] are interchangeable inputs.

pub mod arena;
pub mod preorder;

use hognest_core::{StructuralError, TaxonId};
use serde::{Deserialize, Serialize};

pub use arena::{ArenaChildren, ArenaNode, HogArena};
pub use preorder::{PreorderEntry, PreorderIndex};

/// Read-only view of one group node of a HOG tree
///
/// Implemented for cheap `Copy` handles (`&OrthologGroupNode`, [`ArenaNode`])
/// so children can be produced by value while borrowing from the tree.
pub trait HogNode<'a>: Copy + 'a {
    type Children: Iterator<Item = Self>;

    /// Taxon of a speciation node, `None` for a duplication node
    fn taxon_id(self) -> Option<TaxonId>;

    /// Child group nodes in document order
    fn children(self) -> Self::Children;

    /// Gene leaves attached directly to this group
    fn gene_refs(self) -> &'a [GeneRef];

    /// Fail if a child link points at no node
    ///
    /// Owned trees cannot dangle; index-linked storage can.
    fn check_links(self) -> Result<(), StructuralError> {
        Ok(())
    }
}

/// Gene leaf as written by the orthology tool
///
/// `identifier` may hold several gene ids joined by `"; "`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneRef {
    pub species_taxon_id: TaxonId,
    pub identifier: String,
}

impl GeneRef {
    pub fn new(species_taxon_id: impl Into<TaxonId>, identifier: impl Into<String>) -> Self {
        Self {
            species_taxon_id: species_taxon_id.into(),
            identifier: identifier.into(),
        }
    }

    /// Candidate gene ids packed into the identifier
    pub fn candidates<'s>(&'s self, delimiter: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.identifier
            .split(delimiter)
            .filter(|candidate| !candidate.is_empty())
    }
}

/// Owned group node as handed over by the orthology file reader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrthologGroupNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxon_id: Option<TaxonId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OrthologGroupNode>,
    #[serde(default, rename = "genes", skip_serializing_if = "Vec::is_empty")]
    pub gene_refs: Vec<GeneRef>,
}

impl OrthologGroupNode {
    /// Create a duplication node with no children and no genes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a speciation node for `taxon_id`
    pub fn speciation(taxon_id: impl Into<TaxonId>) -> Self {
        Self {
            taxon_id: Some(taxon_id.into()),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: OrthologGroupNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_gene(mut self, species: impl Into<TaxonId>, identifier: impl Into<String>) -> Self {
        self.gene_refs.push(GeneRef::new(species, identifier));
        self
    }
}

impl<'a> HogNode<'a> for &'a OrthologGroupNode {
    type Children = std::slice::Iter<'a, OrthologGroupNode>;

    fn taxon_id(self) -> Option<TaxonId> {
        self.taxon_id
    }

    fn children(self) -> Self::Children {
        self.children.iter()
    }

    fn gene_refs(self) -> &'a [GeneRef] {
        &self.gene_refs
    }
}

/// One top-level HOG and the key all of its nodes are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HogGroup {
    pub group_key: String,
    pub root: OrthologGroupNode,
}

/// All top-level HOGs of one orthology release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HogForest {
    #[serde(default)]
    pub groups: Vec<HogGroup>,
}

impl HogForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group_key: impl Into<String>, root: OrthologGroupNode) -> Self {
        self.groups.push(HogGroup {
            group_key: group_key.into(),
            root,
        });
        self
    }

    /// `(root, group_key)` pairs in forest order, as the encoder consumes them
    pub fn entries(&self) -> Vec<(&OrthologGroupNode, &str)> {
        self.groups
            .iter()
            .map(|group| (&group.root, group.group_key.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
