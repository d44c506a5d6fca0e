//! Custom assertions for testing
//!
//! Provides specialized assertions for nested-set encodings.

use hognest_bio::nested_set::{verify_associations, verify_catalog_membership, verify_nested_set};
use hognest_bio::GeneCatalog;
use hognest_core::{GeneAssociation, HierarchicalGroupRecord};

/// Assert that records satisfy every nested-set invariant
pub fn assert_nested_set(records: &[HierarchicalGroupRecord]) {
    if let Err(violation) = verify_nested_set(records) {
        panic!("Nested-set invariant violated: {}", violation);
    }
}

/// Assert that associations are unique, catalogued and point at emitted nodes
pub fn assert_associations_resolved<C: GeneCatalog + ?Sized>(
    associations: &[GeneAssociation],
    records: &[HierarchicalGroupRecord],
    catalog: &C,
) {
    if let Err(violation) = verify_associations(associations, records) {
        panic!("Association invariant violated: {}", violation);
    }
    if let Err(violation) = verify_catalog_membership(associations, catalog) {
        panic!("Association invariant violated: {}", violation);
    }
}

/// Assert the subtree sizes implied by each record's interval width
pub fn assert_subtree_sizes(records: &[HierarchicalGroupRecord], expected: &[u64]) {
    let sizes: Vec<u64> = records.iter().map(|r| r.subtree_size()).collect();
    assert_eq!(
        sizes, expected,
        "Subtree sizes {:?} do not match expected {:?}",
        sizes, expected
    );
}
