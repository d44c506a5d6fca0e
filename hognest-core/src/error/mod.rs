//! Core error types for hognest

pub mod encoding;

use thiserror::Error;
pub use encoding::{
    EncodeError, InvariantViolation, InvariantViolationType, ResolutionIssue, StructuralError,
};

/// Main error type for hognest operations
#[derive(Error, Debug)]
pub enum HognestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Structural error: {0}")]
    Structural(StructuralError),

    #[error("Encoding invariant violated: {0}")]
    InvariantViolation(InvariantViolation),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for hognest operations
pub type HognestResult<T> = Result<T, HognestError>;

impl HognestError {
    /// Whether this error means the encoded output must not be persisted
    pub fn is_fatal_encoding(&self) -> bool {
        matches!(self, Self::Structural(_) | Self::InvariantViolation(_))
    }
}

// Conversion implementations for common error types
impl From<EncodeError> for HognestError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Structural(e) => HognestError::Structural(e),
            EncodeError::InvariantViolation(e) => HognestError::InvariantViolation(e),
        }
    }
}

impl From<serde_json::Error> for HognestError {
    fn from(err: serde_json::Error) -> Self {
        HognestError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for HognestError {
    fn from(err: csv::Error) -> Self {
        HognestError::Parse(err.to_string())
    }
}

impl From<anyhow::Error> for HognestError {
    fn from(err: anyhow::Error) -> Self {
        HognestError::Other(err.to_string())
    }
}
