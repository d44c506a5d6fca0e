//! Test fixtures and data generators
//!
//! Common test forests and catalogs for use across the hognest workspace.

use hognest_bio::{GeneSet, GenomeSharingMap, HogForest, OrthologGroupNode};
use hognest_core::TaxonId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Common test taxonomy IDs
pub mod taxonomy {
    use hognest_core::TaxonId;

    pub const HOMININAE: TaxonId = TaxonId(207598);
    pub const HUMAN: TaxonId = TaxonId(9606);
    pub const CHIMPANZEE: TaxonId = TaxonId(9598);
    pub const GORILLA: TaxonId = TaxonId(9595);
    pub const MOUSE: TaxonId = TaxonId(10090);
}

/// Two small groups covering speciation, duplication, compound identifiers,
/// genome sharing and a catalog miss
///
/// With [`primate_catalog`] and [`primate_sharing`] the encoding is:
///
/// | node | group       | bounds  | genes                    |
/// |------|-------------|---------|--------------------------|
/// | 1    | HOG:0000001 | [1, 8]  |                          |
/// | 2    | HOG:0000001 | [2, 3]  | HUMAN00001, HUMAN00002   |
/// | 3    | HOG:0000001 | [4, 5]  | PANTR00001               |
/// | 4    | HOG:0000001 | [6, 7]  | FAKE100001 (synthetic)   |
/// | 5    | HOG:0000002 | [9, 10] | MOUSE00001               |
pub fn primate_forest() -> HogForest {
    use taxonomy::*;

    HogForest::new()
        .with_group(
            "HOG:0000001",
            OrthologGroupNode::speciation(HOMININAE)
                .with_child(OrthologGroupNode::new().with_gene(HUMAN, "HUMAN00001; HUMAN00002"))
                .with_child(OrthologGroupNode::speciation(CHIMPANZEE).with_gene(CHIMPANZEE, "PANTR00001"))
                .with_child(OrthologGroupNode::speciation(GORILLA).with_gene(GORILLA, "GORGO00001")),
        )
        .with_group(
            "HOG:0000002",
            OrthologGroupNode::speciation(MOUSE)
                .with_gene(MOUSE, "MOUSE00001")
                .with_gene(MOUSE, "MOUSE99999"),
        )
}

pub fn primate_catalog() -> GeneSet {
    ["HUMAN00001", "HUMAN00002", "PANTR00001", "FAKE100001", "MOUSE00001"]
        .into_iter()
        .collect()
}

/// Gorilla genes re-issued under the `FAKE1` and `FAKE2` prefixes
pub fn primate_sharing() -> GenomeSharingMap {
    GenomeSharingMap::new()
        .with_prefix(taxonomy::GORILLA, "FAKE1")
        .with_prefix(taxonomy::GORILLA, "FAKE2")
}

/// Parameters of [`random_forest`]
#[derive(Debug, Clone, Copy)]
pub struct ForestShape {
    pub groups: usize,
    pub max_children: usize,
    pub max_depth: usize,
    /// Size of the gene id pool; small pools force conflicts
    pub gene_pool: usize,
    /// Probability that a node carries a gene leaf
    pub gene_rate: f64,
}

impl Default for ForestShape {
    fn default() -> Self {
        Self {
            groups: 25,
            max_children: 4,
            max_depth: 6,
            gene_pool: 200,
            gene_rate: 0.5,
        }
    }
}

/// Id of the `n`-th gene of the random pool
pub fn pool_gene(n: usize) -> String {
    format!("GENE{:05}", n)
}

/// Generate a random forest, deterministic for a given seed
pub fn random_forest(seed: u64, shape: ForestShape) -> HogForest {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut forest = HogForest::new();
    for group in 0..shape.groups {
        let root = random_node(&mut rng, &shape, 1);
        forest = forest.with_group(format!("HOG:{:07}", group + 1), root);
    }
    forest
}

fn random_node(rng: &mut StdRng, shape: &ForestShape, depth: usize) -> OrthologGroupNode {
    let mut node = if rng.gen_bool(0.3) {
        OrthologGroupNode::new()
    } else {
        OrthologGroupNode::speciation(TaxonId(rng.gen_range(1..100_000)))
    };

    if shape.gene_pool > 0 && rng.gen_bool(shape.gene_rate) {
        let first = pool_gene(rng.gen_range(0..shape.gene_pool));
        let identifier = if rng.gen_bool(0.2) {
            format!("{}; {}", first, pool_gene(rng.gen_range(0..shape.gene_pool)))
        } else {
            first
        };
        node = node.with_gene(taxonomy::HUMAN, identifier);
    }

    if depth < shape.max_depth {
        for _ in 0..rng.gen_range(0..=shape.max_children) {
            node = node.with_child(random_node(rng, shape, depth + 1));
        }
    }
    node
}

/// Catalog holding each pool gene with probability `keep_rate`
pub fn random_catalog(seed: u64, gene_pool: usize, keep_rate: f64) -> GeneSet {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..gene_pool)
        .filter(|_| rng.gen_bool(keep_rate))
        .map(pool_gene)
        .collect()
}
