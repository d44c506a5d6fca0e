//! Property tests for the nested-set encoder over random forests

use hognest_bio::nested_set::{verify_associations, verify_catalog_membership, verify_nested_set};
use hognest_bio::{GeneCatalog, GeneSet, GenomeSharingMap, HogForest, NestedSetEncoder, OrthologGroupNode};
use hognest_core::{NodeId, TaxonId};
use proptest::prelude::*;
use std::collections::HashMap;

const GENE_POOL: usize = 40;

/// Species whose genes are re-issued under the `ALT` and `GENE` prefixes
const GORILLA: TaxonId = TaxonId(9595);
const SHARED_PREFIXES: [&str; 2] = ["ALT", "GENE"];

fn gene(n: usize) -> String {
    format!("GENE{:05}", n)
}

fn arb_node_fields() -> impl Strategy<Value = (Option<u32>, Vec<usize>)> {
    (
        proptest::option::of(1u32..50_000),
        proptest::collection::vec(0..GENE_POOL, 0..3),
    )
}

fn build_node(taxon: Option<u32>, genes: Vec<usize>, children: Vec<OrthologGroupNode>) -> OrthologGroupNode {
    let mut node = match taxon {
        Some(taxon) => OrthologGroupNode::speciation(taxon),
        None => OrthologGroupNode::new(),
    };
    for n in genes {
        node = node.with_gene(TaxonId::HUMAN, gene(n));
    }
    node.children = children;
    node
}

fn arb_tree() -> impl Strategy<Value = OrthologGroupNode> {
    let leaf = arb_node_fields().prop_map(|(taxon, genes)| build_node(taxon, genes, Vec::new()));
    leaf.prop_recursive(6, 64, 4, |inner| {
        (arb_node_fields(), proptest::collection::vec(inner, 0..4))
            .prop_map(|((taxon, genes), children)| build_node(taxon, genes, children))
    })
}

fn arb_forest() -> impl Strategy<Value = HogForest> {
    proptest::collection::vec(arb_tree(), 0..6).prop_map(|trees| {
        trees
            .into_iter()
            .enumerate()
            .fold(HogForest::new(), |forest, (i, root)| {
                forest.with_group(format!("HOG:{:07}", i + 1), root)
            })
    })
}

fn arb_catalog() -> impl Strategy<Value = GeneSet> {
    proptest::collection::vec(any::<bool>(), GENE_POOL).prop_map(|keep| {
        keep.into_iter()
            .enumerate()
            .filter(|(_, kept)| *kept)
            .map(|(n, _)| gene(n))
            .collect()
    })
}

/// Gene leaf as (from the shared-genome species, pool index)
type Leaf = (bool, usize);

fn leaf_gene(&(shared, n): &Leaf) -> (TaxonId, String) {
    if shared {
        (GORILLA, format!("GORGO{:05}", n))
    } else {
        (TaxonId::HUMAN, gene(n))
    }
}

fn build_shared_node(genes: Vec<Leaf>, children: Vec<OrthologGroupNode>) -> OrthologGroupNode {
    let mut node = OrthologGroupNode::new();
    for leaf in &genes {
        let (species, identifier) = leaf_gene(leaf);
        node = node.with_gene(species, identifier);
    }
    node.children = children;
    node
}

/// Forests mixing human genes with gorilla genes whose synthetic ids can
/// collide with directly referenced human ones
fn arb_shared_forest() -> impl Strategy<Value = HogForest> {
    let leaves = || proptest::collection::vec((any::<bool>(), 0..GENE_POOL), 0..3);
    let tree = leaves()
        .prop_map(|genes| build_shared_node(genes, Vec::new()))
        .prop_recursive(5, 48, 4, move |inner| {
            (leaves(), proptest::collection::vec(inner, 0..4))
                .prop_map(|(genes, children)| build_shared_node(genes, children))
        });
    proptest::collection::vec(tree, 1..5).prop_map(|trees| {
        trees
            .into_iter()
            .enumerate()
            .fold(HogForest::new(), |forest, (i, root)| {
                forest.with_group(format!("HOG:{:07}", i + 1), root)
            })
    })
}

/// Catalog drawn from the `GENE`, `ALT` and `GORGO` id spaces
fn arb_shared_catalog() -> impl Strategy<Value = GeneSet> {
    proptest::collection::vec(any::<bool>(), 3 * GENE_POOL).prop_map(|keep| {
        keep.into_iter()
            .enumerate()
            .filter(|(_, kept)| *kept)
            .map(|(i, _)| {
                let prefix = ["GENE", "ALT", "GORGO"][i / GENE_POOL];
                format!("{}{:05}", prefix, i % GENE_POOL)
            })
            .collect()
    })
}

fn shared_sharing() -> GenomeSharingMap {
    SHARED_PREFIXES
        .iter()
        .fold(GenomeSharingMap::new(), |map, prefix| map.with_prefix(GORILLA, *prefix))
}

/// Like [`first_owners`], with gorilla ids also tried under every shared prefix
fn first_shared_owners(
    node: &OrthologGroupNode,
    next_id: &mut u64,
    catalog: &GeneSet,
    owners: &mut HashMap<String, NodeId>,
) {
    let id = NodeId(*next_id);
    *next_id += 1;
    for gene_ref in &node.gene_refs {
        let mut candidates = vec![gene_ref.identifier.clone()];
        if gene_ref.species_taxon_id == GORILLA {
            let suffix = gene_ref.identifier.trim_start_matches("GORGO");
            candidates.extend(SHARED_PREFIXES.iter().map(|p| format!("{}{}", p, suffix)));
        }
        for candidate in candidates {
            if catalog.contains_gene(&candidate) {
                owners.entry(candidate).or_insert(id);
            }
        }
    }
    for child in &node.children {
        first_shared_owners(child, next_id, catalog, owners);
    }
}

/// Pre-order walk assigning sequential ids, recording the first node per gene
fn first_owners(
    node: &OrthologGroupNode,
    next_id: &mut u64,
    catalog: &GeneSet,
    owners: &mut HashMap<String, NodeId>,
) {
    let id = NodeId(*next_id);
    *next_id += 1;
    for gene_ref in &node.gene_refs {
        if catalog.contains_gene(&gene_ref.identifier) {
            owners.entry(gene_ref.identifier.clone()).or_insert(id);
        }
    }
    for child in &node.children {
        first_owners(child, next_id, catalog, owners);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bounds_are_a_valid_nested_set(forest in arb_forest()) {
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();
        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&forest.entries())
            .unwrap();

        prop_assert!(verify_nested_set(&encoding.groups).is_ok());

        // Bounds tile 1..=2N and ids run 1..=N in emission order
        let n = encoding.groups.len() as u64;
        let mut bounds: Vec<u64> = encoding
            .groups
            .iter()
            .flat_map(|r| [r.left_bound, r.right_bound])
            .collect();
        bounds.sort_unstable();
        prop_assert_eq!(bounds, (1..=2 * n).collect::<Vec<_>>());
        let ids: Vec<u64> = encoding.groups.iter().map(|r| r.node_id.value()).collect();
        prop_assert_eq!(ids, (1..=n).collect::<Vec<_>>());
    }

    #[test]
    fn interval_width_matches_descendant_count(forest in arb_forest()) {
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();
        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&forest.entries())
            .unwrap();

        for record in &encoding.groups {
            let descendants = encoding
                .groups
                .iter()
                .filter(|other| record.contains(other))
                .count() as u64;
            prop_assert_eq!(record.subtree_size(), descendants + 1);
        }
    }

    #[test]
    fn first_visited_node_owns_each_gene(forest in arb_forest(), catalog in arb_catalog()) {
        let sharing = GenomeSharingMap::new();
        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&forest.entries())
            .unwrap();

        let mut expected = HashMap::new();
        let mut next_id = 1;
        for group in &forest.groups {
            first_owners(&group.root, &mut next_id, &catalog, &mut expected);
        }

        let actual: HashMap<String, NodeId> = encoding
            .associations
            .iter()
            .map(|a| (a.gene_id.clone(), a.parent_node_id))
            .collect();
        prop_assert_eq!(actual.len(), encoding.associations.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn parallel_encoding_matches_sequential(forest in arb_forest(), catalog in arb_catalog()) {
        let sharing = GenomeSharingMap::new();
        let encoder = NestedSetEncoder::new(&catalog, &sharing);

        let sequential = encoder.encode(&forest.entries()).unwrap();
        let parallel = encoder.encode_parallel(&forest.entries()).unwrap();
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn synthetic_ids_stay_unique_and_catalogued(
        forest in arb_shared_forest(),
        catalog in arb_shared_catalog(),
    ) {
        let sharing = shared_sharing();
        let encoder = NestedSetEncoder::new(&catalog, &sharing);
        let encoding = encoder.encode(&forest.entries()).unwrap();

        prop_assert!(verify_associations(&encoding.associations, &encoding.groups).is_ok());
        prop_assert!(verify_catalog_membership(&encoding.associations, &catalog).is_ok());
        prop_assert!(encoding.report.synthetic_associations <= encoding.report.associations);

        let mut expected = HashMap::new();
        let mut next_id = 1;
        for group in &forest.groups {
            first_shared_owners(&group.root, &mut next_id, &catalog, &mut expected);
        }
        let actual: HashMap<String, NodeId> = encoding
            .associations
            .iter()
            .map(|a| (a.gene_id.clone(), a.parent_node_id))
            .collect();
        prop_assert_eq!(actual, expected);

        prop_assert_eq!(encoder.encode_parallel(&forest.entries()).unwrap(), encoding);
    }
}
