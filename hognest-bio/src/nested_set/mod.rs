//! Nested-set encoding of HOG forests
//!
//! Each group node becomes a [`HierarchicalGroupRecord`] whose interval
//! `[left_bound, right_bound]` encloses exactly the intervals of its
//! descendants, and each catalogued gene leaf becomes a [`GeneAssociation`]
//! to the nearest enclosing group node.
//!
//! [`HierarchicalGroupRecord`]: hognest_core::HierarchicalGroupRecord
//! [`GeneAssociation`]: hognest_core::GeneAssociation

pub mod encoder;
pub mod report;
pub mod resolver;
pub mod verify;

pub use encoder::{encode, EncoderOptions, Encoding, NestedSetEncoder};
pub use report::EncodeReport;
pub use resolver::{
    synthetic_gene_id, CandidateExpander, Claim, ConflictIndex, DeferredMiss, Expansion,
    GeneResolver, Proposal,
};
pub use verify::{verify_associations, verify_catalog_membership, verify_nested_set};
