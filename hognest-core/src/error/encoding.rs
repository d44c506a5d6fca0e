//! Nested-set encoding error types
//!
//! Fatal errors ([`StructuralError`], [`InvariantViolation`]) abort an encoding
//! run and are wrapped in [`EncodeError`]. [`ResolutionIssue`] values are
//! recoverable: they are logged and counted, never returned as `Err`.

use crate::types::{NodeId, TaxonId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Malformed or cyclic input tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("group {group_key} exceeds the maximum depth of {max_depth} (cyclic or malformed tree)")]
    DepthExceeded { group_key: String, max_depth: usize },

    #[error("group at position {position} has an empty group key")]
    EmptyGroupKey { position: usize },

    #[error("group {group_key} overflows the bound counter")]
    BoundOverflow { group_key: String },

    #[error("node {parent} references missing child {child}")]
    DanglingChild { parent: usize, child: usize },
}

/// Computed output that breaks one of the nested-set invariants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    /// Node the violation was detected on
    pub node_id: NodeId,
    /// The specific type of violation
    pub violation: InvariantViolationType,
    /// Optional context, usually the group key
    pub context: Option<String>,
}

/// Specific nested-set invariant breaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantViolationType {
    /// `right != left + 2 * subtree_size - 1`
    BoundWidth {
        left: u64,
        right: u64,
        subtree_size: u64,
    },
    /// `right <= left`
    InvertedInterval { left: u64, right: u64 },
    /// Interval partially overlaps another interval of the same group
    PartialOverlap { other: NodeId },
    /// A bound value is used twice in the forest
    DuplicateBound { bound: u64 },
    /// A node id is used twice in the forest
    DuplicateNodeId,
    /// A gene is associated more than once
    DuplicateGene { gene_id: String },
    /// An associated gene is not in the gene catalog
    UnknownGene { gene_id: String },
    /// An association points at a node that was never emitted
    DanglingParent { gene_id: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}: ", self.node_id)?;
        match &self.violation {
            InvariantViolationType::BoundWidth {
                left,
                right,
                subtree_size,
            } => write!(
                f,
                "interval [{}, {}] does not fit subtree size {}",
                left, right, subtree_size
            ),
            InvariantViolationType::InvertedInterval { left, right } => {
                write!(f, "inverted interval [{}, {}]", left, right)
            }
            InvariantViolationType::PartialOverlap { other } => {
                write!(f, "interval partially overlaps node {}", other)
            }
            InvariantViolationType::DuplicateBound { bound } => {
                write!(f, "bound {} is not unique", bound)
            }
            InvariantViolationType::DuplicateNodeId => write!(f, "node id is not unique"),
            InvariantViolationType::DuplicateGene { gene_id } => {
                write!(f, "gene {} is associated more than once", gene_id)
            }
            InvariantViolationType::UnknownGene { gene_id } => {
                write!(f, "gene {} is not in the catalog", gene_id)
            }
            InvariantViolationType::DanglingParent { gene_id } => {
                write!(f, "gene {} points at a missing node", gene_id)
            }
        }?;
        if let Some(ctx) = &self.context {
            write!(f, " [{}]", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvariantViolation {}

impl InvariantViolation {
    /// Create a new invariant violation
    pub fn new(node_id: NodeId, violation: InvariantViolationType) -> Self {
        Self {
            node_id,
            violation,
            context: None,
        }
    }

    /// Create an invariant violation with context
    pub fn with_context(
        node_id: NodeId,
        violation: InvariantViolationType,
        context: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            violation,
            context: Some(context.into()),
        }
    }
}

/// Fatal error of an encoding run; no partial output accompanies it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

/// Recoverable problem met while resolving gene references
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    #[error("gene {gene_id} (species {species}) under node {node_id} is not in the catalog")]
    CatalogMiss {
        gene_id: String,
        species: TaxonId,
        node_id: NodeId,
    },

    #[error("gene {gene_id} already belongs to node {existing}, dropped for node {proposed}")]
    Conflict {
        gene_id: String,
        existing: NodeId,
        proposed: NodeId,
    },
}

impl ResolutionIssue {
    /// Gene identifier the issue is about
    pub fn gene_id(&self) -> &str {
        match self {
            Self::CatalogMiss { gene_id, .. } | Self::Conflict { gene_id, .. } => gene_id,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
