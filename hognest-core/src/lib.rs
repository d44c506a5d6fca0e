//! Core utilities and types shared across all hognest crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{
    EncodeError, HognestError, HognestResult, InvariantViolation, InvariantViolationType,
    ResolutionIssue, StructuralError,
};
pub use config::{load_config, save_config, Config};

// Re-export core types
pub use types::{GeneAssociation, HierarchicalGroupRecord, NodeId, OutputFormat, TaxonId};

/// Version information for the hognest project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
