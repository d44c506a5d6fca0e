/// Core types shared across all hognest modules
pub mod format;
pub mod records;
pub mod taxonomy;

// Re-export commonly used types at module level
pub use format::OutputFormat;
pub use records::{GeneAssociation, HierarchicalGroupRecord, NodeId};
pub use taxonomy::TaxonId;
