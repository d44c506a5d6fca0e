//! Nested-set encoder
//!
//! Every tree is flattened once ([`PreorderIndex`]), which yields its subtree
//! sizes. Sizes fix the bound range (`2 * size`) and id range (`size`) of each
//! tree, so tree starts are a prefix sum and trees can be laid out
//! independently. Gene proposals are then settled through the conflict index
//! in forest order, which keeps sequential and parallel runs identical.

use super::report::EncodeReport;
use super::resolver::{CandidateExpander, Expansion, GeneResolver};
use super::verify::{verify_associations, verify_catalog_membership, verify_nested_set};
use crate::catalog::{GeneCatalog, GenomeSharingMap};
use crate::hog::{HogNode, PreorderIndex};
use hognest_core::config::Config;
use hognest_core::{
    EncodeError, GeneAssociation, HierarchicalGroupRecord, NodeId, StructuralError, TaxonId,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Knobs of a single encode run
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub first_bound: u64,
    pub first_node_id: u64,
    pub max_depth: usize,
    pub gene_delimiter: String,
    pub verify_invariants: bool,
    pub warn_on_empty_subtrees: bool,
    pub issue_sample_limit: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EncoderOptions {
    fn from(config: &Config) -> Self {
        Self {
            first_bound: config.encoding.first_bound,
            first_node_id: config.encoding.first_node_id,
            max_depth: config.encoding.max_depth,
            gene_delimiter: config.encoding.gene_delimiter.clone(),
            verify_invariants: config.encoding.verify_invariants,
            warn_on_empty_subtrees: config.diagnostics.warn_on_empty_subtrees,
            issue_sample_limit: config.diagnostics.issue_sample_limit,
        }
    }
}

/// Output of one encode run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    pub groups: Vec<HierarchicalGroupRecord>,
    pub associations: Vec<GeneAssociation>,
    pub report: EncodeReport,
}

impl Encoding {
    pub fn into_parts(self) -> (Vec<HierarchicalGroupRecord>, Vec<GeneAssociation>) {
        (self.groups, self.associations)
    }
}

/// Where a tree's bounds and ids begin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreeStart {
    first_bound: u64,
    first_node_id: u64,
}

/// A tree with bounds assigned and genes proposed but not yet claimed
struct TreeLayout<'k> {
    group_key: &'k str,
    records: Vec<HierarchicalGroupRecord>,
    parents: Vec<Option<usize>>,
    gene_ref_counts: Vec<usize>,
    expansion: Expansion,
    report: EncodeReport,
}

pub struct NestedSetEncoder<'c, C: ?Sized> {
    catalog: &'c C,
    sharing: &'c GenomeSharingMap,
    options: EncoderOptions,
}

impl<'c, C: GeneCatalog + ?Sized> NestedSetEncoder<'c, C> {
    pub fn new(catalog: &'c C, sharing: &'c GenomeSharingMap) -> Self {
        Self {
            catalog,
            sharing,
            options: EncoderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncoderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encode `(root, group_key)` pairs one tree after another
    pub fn encode<'a, N: HogNode<'a>>(&self, forest: &[(N, &str)]) -> Result<Encoding, EncodeError> {
        let indices = forest
            .iter()
            .enumerate()
            .map(|(position, &(root, group_key))| self.index_tree(position, root, group_key))
            .collect::<Result<Vec<_>, _>>()?;
        let starts = self.tree_starts(&indices, forest)?;

        let mut resolver = self.resolver();
        let expander = resolver.expander();
        let mut encoding = self.empty_encoding(&indices);

        for ((index, start), &(_, group_key)) in indices.iter().zip(starts).zip(forest) {
            let layout = self.layout_tree(index, group_key, start, expander);
            self.settle(layout, &mut resolver, &mut encoding);
        }

        self.finish(encoding, resolver)
    }

    /// Encode with trees flattened and laid out on the rayon pool
    ///
    /// Produces exactly the output of [`NestedSetEncoder::encode`].
    pub fn encode_parallel<'a, N>(&self, forest: &[(N, &str)]) -> Result<Encoding, EncodeError>
    where
        N: HogNode<'a> + Send + Sync,
        C: Sync,
    {
        let indices = forest
            .par_iter()
            .enumerate()
            .map(|(position, &(root, group_key))| self.index_tree(position, root, group_key))
            .collect::<Result<Vec<_>, _>>()?;
        let starts = self.tree_starts(&indices, forest)?;

        let mut resolver = self.resolver();
        let expander = resolver.expander();

        let layouts: Vec<TreeLayout<'_>> = indices
            .par_iter()
            .zip(starts.par_iter())
            .zip(forest.par_iter())
            .map(|((index, &start), &(_, group_key))| {
                self.layout_tree(index, group_key, start, expander)
            })
            .collect();

        let mut encoding = self.empty_encoding(&indices);
        for layout in layouts {
            self.settle(layout, &mut resolver, &mut encoding);
        }

        self.finish(encoding, resolver)
    }

    fn resolver(&self) -> GeneResolver<'_, C> {
        GeneResolver::new(
            self.catalog,
            self.sharing,
            &self.options.gene_delimiter,
            self.options.issue_sample_limit,
        )
    }

    fn empty_encoding<N>(&self, indices: &[PreorderIndex<N>]) -> Encoding {
        let nodes: usize = indices.iter().map(PreorderIndex::len).sum();
        Encoding {
            groups: Vec::with_capacity(nodes),
            associations: Vec::new(),
            report: EncodeReport::new(self.options.issue_sample_limit),
        }
    }

    fn index_tree<'a, N: HogNode<'a>>(
        &self,
        position: usize,
        root: N,
        group_key: &str,
    ) -> Result<PreorderIndex<N>, StructuralError> {
        if group_key.is_empty() {
            return Err(StructuralError::EmptyGroupKey { position });
        }
        PreorderIndex::build(root, group_key, self.options.max_depth)
    }

    /// Prefix sums of the per-tree bound and id ranges
    fn tree_starts<N, R>(
        &self,
        indices: &[PreorderIndex<N>],
        forest: &[(R, &str)],
    ) -> Result<Vec<TreeStart>, StructuralError> {
        let mut next = TreeStart {
            first_bound: self.options.first_bound,
            first_node_id: self.options.first_node_id,
        };
        let mut starts = Vec::with_capacity(indices.len());

        for (index, (_, group_key)) in indices.iter().zip(forest) {
            let size = index.tree_size();
            let overflow = || StructuralError::BoundOverflow {
                group_key: group_key.to_string(),
            };
            let first_bound = size
                .checked_mul(2)
                .and_then(|width| next.first_bound.checked_add(width))
                .ok_or_else(overflow)?;
            let first_node_id = next.first_node_id.checked_add(size).ok_or_else(overflow)?;

            starts.push(next);
            next = TreeStart {
                first_bound,
                first_node_id,
            };
        }

        Ok(starts)
    }

    /// Assign bounds and ids in pre-order and collect gene proposals
    fn layout_tree<'k, 'a, N: HogNode<'a>>(
        &self,
        index: &PreorderIndex<N>,
        group_key: &'k str,
        start: TreeStart,
        expander: CandidateExpander<'_, C>,
    ) -> TreeLayout<'k> {
        let mut layout = TreeLayout {
            group_key,
            records: Vec::with_capacity(index.len()),
            parents: Vec::with_capacity(index.len()),
            gene_ref_counts: Vec::with_capacity(index.len()),
            expansion: Expansion::default(),
            report: EncodeReport::new(self.options.issue_sample_limit),
        };
        layout.report.groups = 1;

        // (depth, right bound) of the nodes whose subtree is still open
        let mut open: Vec<(usize, u64)> = Vec::new();
        let mut next_bound = start.first_bound;

        for (local, entry) in index.entries().iter().enumerate() {
            while let Some(&(depth, right)) = open.last() {
                if depth < entry.depth {
                    break;
                }
                open.pop();
                next_bound = right + 1;
            }

            let left_bound = next_bound;
            next_bound += 1;
            let right_bound = left_bound + 2 * entry.subtree_size - 1;
            let node_id = NodeId(start.first_node_id + local as u64);
            let taxon_id = TaxonId::or_duplication(entry.node.taxon_id());

            layout.report.nodes += 1;
            if taxon_id.is_duplication() {
                layout.report.duplication_nodes += 1;
            } else {
                layout.report.speciation_nodes += 1;
            }

            layout.records.push(HierarchicalGroupRecord {
                node_id,
                group_key: group_key.to_string(),
                left_bound,
                right_bound,
                taxon_id,
            });
            layout.parents.push(entry.parent);

            let refs = entry.node.gene_refs();
            layout.gene_ref_counts.push(refs.len());
            expander.expand(refs, local, node_id, &mut layout.expansion, &mut layout.report);

            open.push((entry.depth, right_bound));
        }

        debug!(
            "Laid out {} ({} nodes, {} gene proposals)",
            group_key,
            layout.records.len(),
            layout.expansion.proposals.len()
        );
        layout
    }

    /// Claim a tree's proposals in visit order and report gene-less nodes
    ///
    /// Catalog misses reach the issue sample only for nodes that kept nothing.
    fn settle(
        &self,
        layout: TreeLayout<'_>,
        resolver: &mut GeneResolver<'_, C>,
        encoding: &mut Encoding,
    ) {
        let mut retained = vec![0u64; layout.records.len()];
        for proposal in &layout.expansion.proposals {
            let node_id = layout.records[proposal.local].node_id;
            if let Some(association) = resolver.accept(proposal, node_id) {
                retained[proposal.local] += 1;
                encoding.associations.push(association);
            }
        }

        let mut report = layout.report;
        for (local, record) in layout.records.iter().enumerate() {
            let refs = layout.gene_ref_counts[local];
            if refs > 0 && retained[local] == 0 {
                warn!(
                    "Node {} in {} kept none of its {} gene references",
                    record.node_id, layout.group_key, refs
                );
                report.nodes_without_retained_genes += 1;
            }
        }
        resolver.surface_misses(
            layout
                .expansion
                .misses
                .into_iter()
                .filter(|miss| retained[miss.local] == 0),
        );

        // Children follow their parent in pre-order, so a reverse sweep
        // accumulates subtree gene totals bottom-up
        let mut subtree_genes = retained;
        for local in (1..subtree_genes.len()).rev() {
            if let Some(parent) = layout.parents[local] {
                subtree_genes[parent] += subtree_genes[local];
            }
        }
        for (local, record) in layout.records.iter().enumerate() {
            let parent_has_genes = layout.parents[local]
                .map(|parent| subtree_genes[parent] > 0)
                .unwrap_or(true);
            if subtree_genes[local] == 0 && parent_has_genes {
                report.empty_subtrees += 1;
                if self.options.warn_on_empty_subtrees {
                    warn!(
                        "Subtree of node {} in {} has no associated genes",
                        record.node_id, layout.group_key
                    );
                }
            }
        }

        encoding.report.absorb(report);
        encoding.groups.extend(layout.records);
    }

    fn finish(
        &self,
        mut encoding: Encoding,
        resolver: GeneResolver<'_, C>,
    ) -> Result<Encoding, EncodeError> {
        encoding.report.absorb(resolver.into_report());

        if self.options.verify_invariants {
            verify_nested_set(&encoding.groups)?;
            verify_associations(&encoding.associations, &encoding.groups)?;
            verify_catalog_membership(&encoding.associations, self.catalog)?;
        }

        let report = &encoding.report;
        info!(
            "Encoded {} groups: {} nodes, {} gene associations ({} synthetic), {} conflicts, {} catalog misses",
            report.groups,
            report.nodes,
            report.associations,
            report.synthetic_associations,
            report.conflicts,
            report.catalog_misses
        );
        Ok(encoding)
    }
}

/// Encode a forest with default options
pub fn encode<'a, N, C>(
    forest: &[(N, &str)],
    catalog: &C,
    sharing: &GenomeSharingMap,
) -> Result<(Vec<HierarchicalGroupRecord>, Vec<GeneAssociation>), EncodeError>
where
    N: HogNode<'a>,
    C: GeneCatalog + ?Sized,
{
    NestedSetEncoder::new(catalog, sharing)
        .encode(forest)
        .map(Encoding::into_parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GeneSet;
    use crate::hog::{HogArena, HogForest, OrthologGroupNode};
    use hognest_core::ResolutionIssue;
    use pretty_assertions::assert_eq;

    fn bounds(encoding: &Encoding) -> Vec<(u64, u64, u64)> {
        encoding
            .groups
            .iter()
            .map(|r| (r.node_id.value(), r.left_bound, r.right_bound))
            .collect()
    }

    #[test]
    fn test_root_with_two_leaves() {
        let forest = HogForest::new().with_group(
            "HOG:0000001",
            OrthologGroupNode::new()
                .with_child(OrthologGroupNode::new())
                .with_child(OrthologGroupNode::new()),
        );
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&forest.entries())
            .unwrap();

        assert_eq!(bounds(&encoding), vec![(1, 1, 6), (2, 2, 3), (3, 4, 5)]);
        assert!(encoding.associations.is_empty());
        assert!(encoding.groups.iter().all(|r| r.group_key == "HOG:0000001"));
        assert_eq!(encoding.report.empty_subtrees, 1);
    }

    #[test]
    fn test_bounds_continue_across_trees() {
        let forest = HogForest::new()
            .with_group(
                "HOG:1",
                OrthologGroupNode::new().with_child(OrthologGroupNode::new()),
            )
            .with_group("HOG:2", OrthologGroupNode::speciation(9604));
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&forest.entries())
            .unwrap();

        assert_eq!(bounds(&encoding), vec![(1, 1, 4), (2, 2, 3), (3, 5, 6)]);
        assert_eq!(encoding.groups[2].group_key, "HOG:2");
        assert_eq!(encoding.groups[2].taxon_id, TaxonId(9604));
        assert_eq!(encoding.report.duplication_nodes, 2);
        assert_eq!(encoding.report.speciation_nodes, 1);
    }

    #[test]
    fn test_deep_siblings_close_intervals() {
        // root(a(b(c)), d)
        let tree = OrthologGroupNode::new()
            .with_child(
                OrthologGroupNode::new()
                    .with_child(OrthologGroupNode::new().with_child(OrthologGroupNode::new())),
            )
            .with_child(OrthologGroupNode::new());
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&[(&tree, "HOG:1")])
            .unwrap();

        assert_eq!(
            bounds(&encoding),
            vec![(1, 1, 10), (2, 2, 7), (3, 3, 6), (4, 4, 5), (5, 8, 9)]
        );
    }

    #[test]
    fn test_genes_attach_to_their_own_node() {
        let tree = OrthologGroupNode::speciation(9604)
            .with_gene(9606, "HUMAN00009")
            .with_child(OrthologGroupNode::new().with_gene(9606, "HUMAN00001; HUMAN00002"))
            .with_child(OrthologGroupNode::speciation(9598).with_gene(9598, "PANTR00001"));
        let catalog: GeneSet = ["HUMAN00001", "HUMAN00002", "PANTR00001", "HUMAN00009"]
            .into_iter()
            .collect();
        let sharing = GenomeSharingMap::new();

        let (_, associations) = encode(&[(&tree, "HOG:1")], &catalog, &sharing).unwrap();

        assert_eq!(
            associations,
            vec![
                GeneAssociation::new("HUMAN00009", NodeId(1)),
                GeneAssociation::new("HUMAN00001", NodeId(2)),
                GeneAssociation::new("HUMAN00002", NodeId(2)),
                GeneAssociation::new("PANTR00001", NodeId(3)),
            ]
        );
    }

    #[test]
    fn test_conflict_keeps_first_visited_node() {
        let tree = OrthologGroupNode::new()
            .with_child(OrthologGroupNode::new().with_gene(9606, "HUMAN00001"))
            .with_child(OrthologGroupNode::new().with_gene(9606, "HUMAN00001"));
        let catalog: GeneSet = ["HUMAN00001"].into_iter().collect();
        let sharing = GenomeSharingMap::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&[(&tree, "HOG:1")])
            .unwrap();

        assert_eq!(
            encoding.associations,
            vec![GeneAssociation::new("HUMAN00001", NodeId(2))]
        );
        assert_eq!(encoding.report.conflicts, 1);
        assert_eq!(encoding.report.nodes_without_retained_genes, 1);
        assert_eq!(encoding.report.empty_subtrees, 1);
    }

    #[test]
    fn test_conflicts_span_trees() {
        let forest = HogForest::new()
            .with_group("HOG:1", OrthologGroupNode::new().with_gene(9606, "HUMAN00001"))
            .with_group("HOG:2", OrthologGroupNode::new().with_gene(9606, "HUMAN00001"));
        let catalog: GeneSet = ["HUMAN00001"].into_iter().collect();
        let sharing = GenomeSharingMap::new();

        let (_, associations) = encode(&forest.entries(), &catalog, &sharing).unwrap();
        assert_eq!(associations, vec![GeneAssociation::new("HUMAN00001", NodeId(1))]);
    }

    #[test]
    fn test_configured_start_values() {
        let tree = OrthologGroupNode::new().with_child(OrthologGroupNode::new());
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();
        let options = EncoderOptions {
            first_bound: 101,
            first_node_id: 5001,
            ..EncoderOptions::default()
        };

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .with_options(options)
            .encode(&[(&tree, "HOG:1")])
            .unwrap();

        assert_eq!(bounds(&encoding), vec![(5001, 101, 104), (5002, 102, 103)]);
    }

    #[test]
    fn test_empty_forest() {
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();
        let forest: Vec<(&OrthologGroupNode, &str)> = Vec::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing).encode(&forest).unwrap();
        assert!(encoding.groups.is_empty());
        assert!(encoding.associations.is_empty());
        assert_eq!(encoding.report.groups, 0);
    }

    #[test]
    fn test_empty_group_key_is_structural() {
        let tree = OrthologGroupNode::new();
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();

        let err = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&[(&tree, "HOG:1"), (&tree, "")])
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::Structural(StructuralError::EmptyGroupKey { position: 1 })
        );
    }

    #[test]
    fn test_cycle_aborts_without_output() {
        let mut arena = HogArena::new();
        let healthy = arena.push(Some(TaxonId(9604)), vec![]);
        let root = arena.push(None, vec![]);
        let child = arena.push(None, vec![]);
        arena.add_child(root, child).unwrap();
        arena.add_child(child, root).unwrap();

        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();
        let options = EncoderOptions {
            max_depth: 32,
            ..EncoderOptions::default()
        };

        let forest = vec![
            (arena.node(healthy).unwrap(), "HOG:ok"),
            (arena.node(root).unwrap(), "HOG:cycle"),
        ];
        let result = NestedSetEncoder::new(&catalog, &sharing)
            .with_options(options)
            .encode(&forest);

        match result {
            Err(EncodeError::Structural(StructuralError::DepthExceeded { group_key, .. })) => {
                assert_eq!(group_key, "HOG:cycle")
            }
            other => panic!("Expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut forest = HogForest::new();
        for i in 0..20u32 {
            let mut root = OrthologGroupNode::speciation(9604);
            for j in 0..(i % 4) {
                root = root.with_child(
                    OrthologGroupNode::new()
                        .with_gene(9606, format!("HUMAN{:05}", i * 10 + j))
                        .with_gene(9606, "HUMAN99999"),
                );
            }
            forest = forest.with_group(format!("HOG:{:07}", i), root);
        }
        let catalog: GeneSet = (0..200)
            .map(|n| format!("HUMAN{:05}", n))
            .chain(std::iter::once("HUMAN99999".to_string()))
            .collect();
        let sharing = GenomeSharingMap::new();
        let encoder = NestedSetEncoder::new(&catalog, &sharing);

        let sequential = encoder.encode(&forest.entries()).unwrap();
        let parallel = encoder.encode_parallel(&forest.entries()).unwrap();

        assert_eq!(sequential, parallel);
        assert!(sequential.report.conflicts > 0);
    }

    #[test]
    fn test_misses_listed_only_for_gene_less_nodes() {
        let tree = OrthologGroupNode::new()
            .with_gene(9606, "KEEP00001; GONE00001")
            .with_child(OrthologGroupNode::new().with_gene(9606, "GONE00002"));
        let catalog: GeneSet = ["KEEP00001"].into_iter().collect();
        let sharing = GenomeSharingMap::new();

        let encoding = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&[(&tree, "HOG:1")])
            .unwrap();

        assert_eq!(
            encoding.associations,
            vec![GeneAssociation::new("KEEP00001", NodeId(1))]
        );
        assert_eq!(encoding.report.catalog_misses, 2);
        assert_eq!(
            encoding.report.issues,
            vec![ResolutionIssue::CatalogMiss {
                gene_id: "GONE00002".to_string(),
                species: TaxonId::HUMAN,
                node_id: NodeId(2),
            }]
        );
    }

    #[test]
    fn test_conflicts_survive_a_full_issue_sample() {
        let mut forest = HogForest::new();
        for i in 0..3 {
            let mut root = OrthologGroupNode::new().with_gene(9606, "DUP00001");
            for j in 0..5 {
                root = root.with_child(
                    OrthologGroupNode::new().with_gene(9606, format!("GONE{}{:04}", i, j)),
                );
            }
            forest = forest.with_group(format!("HOG:{}", i), root);
        }
        let catalog: GeneSet = ["DUP00001"].into_iter().collect();
        let sharing = GenomeSharingMap::new();
        let options = EncoderOptions {
            issue_sample_limit: 5,
            ..EncoderOptions::default()
        };
        let encoder = NestedSetEncoder::new(&catalog, &sharing).with_options(options);

        for encoding in [
            encoder.encode(&forest.entries()).unwrap(),
            encoder.encode_parallel(&forest.entries()).unwrap(),
        ] {
            let report = &encoding.report;
            assert_eq!(report.conflicts, 2);
            assert_eq!(report.conflict_issues().count(), 2);
            assert_eq!(report.issues.len(), 5);
            assert_eq!(report.issues_dropped, 10);
        }
    }

    #[test]
    fn test_dangling_arena_child_aborts() {
        let arena: HogArena =
            serde_json::from_str(r#"{"nodes": [{"children": [1, 7]}, {}]}"#).unwrap();
        let catalog = GeneSet::new();
        let sharing = GenomeSharingMap::new();

        let result = NestedSetEncoder::new(&catalog, &sharing)
            .encode(&[(arena.node(0).unwrap(), "HOG:broken")]);
        assert_eq!(
            result,
            Err(EncodeError::Structural(StructuralError::DanglingChild {
                parent: 0,
                child: 7,
            }))
        );
    }
}
