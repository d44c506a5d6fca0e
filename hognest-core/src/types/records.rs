//! Records emitted by the nested-set encoder

use super::taxonomy::TaxonId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forest-wide unique identifier of an encoded group node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One row of the `HierarchicalGroup` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchicalGroupRecord {
    pub node_id: NodeId,
    /// Identifier of the top-level HOG this node descends from
    pub group_key: String,
    pub left_bound: u64,
    pub right_bound: u64,
    /// `TaxonId::DUPLICATION` for paralogy nodes
    pub taxon_id: TaxonId,
}

impl HierarchicalGroupRecord {
    /// Number of nodes in the subtree rooted here, derived from the interval width
    ///
    /// An inverted interval counts as empty.
    pub fn subtree_size(&self) -> u64 {
        if self.right_bound < self.left_bound {
            return 0;
        }
        (self.right_bound - self.left_bound) / 2 + 1
    }

    /// Whether `other` lies strictly inside this node's interval
    pub fn contains(&self, other: &HierarchicalGroupRecord) -> bool {
        self.left_bound < other.left_bound && other.right_bound < self.right_bound
    }

    pub fn is_leaf(&self) -> bool {
        self.right_bound == self.left_bound + 1
    }

    pub fn is_duplication(&self) -> bool {
        self.taxon_id.is_duplication()
    }
}

/// Link from a catalogued gene to its nearest enclosing group node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneAssociation {
    pub gene_id: String,
    pub parent_node_id: NodeId,
}

impl GeneAssociation {
    pub fn new(gene_id: impl Into<String>, parent_node_id: NodeId) -> Self {
        Self {
            gene_id: gene_id.into(),
            parent_node_id,
        }
    }
}
