//! Reference catalogs consulted while resolving gene references

use hognest_core::TaxonId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Membership query over catalogued gene identifiers
pub trait GeneCatalog {
    fn contains_gene(&self, gene_id: &str) -> bool;
}

impl<S: std::hash::BuildHasher> GeneCatalog for HashSet<String, S> {
    fn contains_gene(&self, gene_id: &str) -> bool {
        self.contains(gene_id)
    }
}

impl GeneCatalog for BTreeSet<String> {
    fn contains_gene(&self, gene_id: &str) -> bool {
        self.contains(gene_id)
    }
}

/// In-memory gene catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneSet {
    genes: HashSet<String>,
}

impl GeneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the gene was already present
    pub fn insert(&mut self, gene_id: impl Into<String>) -> bool {
        self.genes.insert(gene_id.into())
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl GeneCatalog for GeneSet {
    fn contains_gene(&self, gene_id: &str) -> bool {
        self.genes.contains(gene_id)
    }
}

impl<T: Into<String>> FromIterator<T> for GeneSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            genes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Species annotated on another species' reference genome
///
/// Maps the reference species to the synthetic id prefixes its dependents
/// use. Prefixes are kept sorted so resolution order is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeSharingMap {
    prefixes: HashMap<TaxonId, BTreeSet<String>>,
}

impl GenomeSharingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<TaxonId>, prefix: impl Into<String>) {
        self.prefixes
            .entry(reference.into())
            .or_default()
            .insert(prefix.into());
    }

    pub fn with_prefix(mut self, reference: impl Into<TaxonId>, prefix: impl Into<String>) -> Self {
        self.insert(reference, prefix);
        self
    }

    /// Synthetic prefixes of the species sharing `reference`'s genome
    pub fn prefixes_for(&self, reference: TaxonId) -> Option<&BTreeSet<String>> {
        self.prefixes.get(&reference)
    }

    /// Number of reference species
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<T: Into<TaxonId>, P: Into<String>> FromIterator<(T, P)> for GenomeSharingMap {
    fn from_iter<I: IntoIterator<Item = (T, P)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (reference, prefix) in iter {
            map.insert(reference, prefix);
        }
        map
    }
}
