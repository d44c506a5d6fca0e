/// Taxonomy-related types used throughout hognest
use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxonomy ID type - newtype pattern for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
#[serde(transparent)]
pub struct TaxonId(pub u32);

impl TaxonId {
    /// Create a new TaxonId
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Check if this is the duplication sentinel (0)
    ///
    /// Group nodes without a taxon are paralogy (duplication) nodes rather
    /// than speciation nodes.
    pub fn is_duplication(&self) -> bool {
        self.0 == 0
    }

    /// Taxon of a group node, falling back to the duplication sentinel
    pub fn or_duplication(taxon: Option<TaxonId>) -> Self {
        taxon.unwrap_or(Self::DUPLICATION)
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TaxonId> for u32 {
    fn from(taxon: TaxonId) -> Self {
        taxon.0
    }
}

// Common taxonomy constants
impl TaxonId {
    pub const DUPLICATION: Self = Self(0);
    pub const HUMAN: Self = Self(9606);
    pub const CHIMPANZEE: Self = Self(9598);
    pub const HOMININAE: Self = Self(207598);
    pub const MOUSE: Self = Self(10090);
}
