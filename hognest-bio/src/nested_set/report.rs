//! Run statistics of one encoding call

use hognest_core::ResolutionIssue;
use serde::{Deserialize, Serialize};

const DEFAULT_ISSUE_LIMIT: usize = 100;

/// Counters and a bounded sample of recoverable issues for one encode run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeReport {
    /// Top-level groups encoded
    pub groups: u64,
    /// Group nodes emitted
    pub nodes: u64,
    pub speciation_nodes: u64,
    pub duplication_nodes: u64,
    /// Gene leaves seen on group nodes
    pub gene_refs: u64,
    /// Candidate ids after splitting compound identifiers
    pub candidates: u64,
    /// Lookups (direct or synthetic) the catalog did not know
    pub catalog_misses: u64,
    pub associations: u64,
    /// Associations created through a genome-sharing prefix
    pub synthetic_associations: u64,
    /// Genes dropped because another node already owns them
    pub conflicts: u64,
    /// Genes proposed twice for the same node
    pub duplicate_proposals: u64,
    /// Nodes that carried gene leaves but kept none of them
    pub nodes_without_retained_genes: u64,
    /// Maximal subtrees without a single associated gene
    pub empty_subtrees: u64,
    /// Sample of catalog misses from nodes that kept no gene, capped at the
    /// issue limit
    pub issues: Vec<ResolutionIssue>,
    /// Sample of conflicts, capped separately so misses cannot crowd them out
    #[serde(default)]
    pub conflict_sample: Vec<ResolutionIssue>,
    /// Issues counted but kept in neither sample
    pub issues_dropped: u64,
    #[serde(skip, default = "default_issue_limit")]
    issue_limit: usize,
}

fn default_issue_limit() -> usize {
    DEFAULT_ISSUE_LIMIT
}

impl Default for EncodeReport {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUE_LIMIT)
    }
}

impl EncodeReport {
    pub fn new(issue_limit: usize) -> Self {
        Self {
            groups: 0,
            nodes: 0,
            speciation_nodes: 0,
            duplication_nodes: 0,
            gene_refs: 0,
            candidates: 0,
            catalog_misses: 0,
            associations: 0,
            synthetic_associations: 0,
            conflicts: 0,
            duplicate_proposals: 0,
            nodes_without_retained_genes: 0,
            empty_subtrees: 0,
            issues: Vec::new(),
            conflict_sample: Vec::new(),
            issues_dropped: 0,
            issue_limit,
        }
    }

    /// Keep `issue` if its sample has room
    pub fn record_issue(&mut self, issue: ResolutionIssue) {
        let sample = if issue.is_conflict() {
            &mut self.conflict_sample
        } else {
            &mut self.issues
        };
        if sample.len() < self.issue_limit {
            sample.push(issue);
        } else {
            self.issues_dropped += 1;
        }
    }

    /// Fold a partial report (one tree, or the resolver's) into this one
    pub fn absorb(&mut self, other: EncodeReport) {
        self.groups += other.groups;
        self.nodes += other.nodes;
        self.speciation_nodes += other.speciation_nodes;
        self.duplication_nodes += other.duplication_nodes;
        self.gene_refs += other.gene_refs;
        self.candidates += other.candidates;
        self.catalog_misses += other.catalog_misses;
        self.associations += other.associations;
        self.synthetic_associations += other.synthetic_associations;
        self.conflicts += other.conflicts;
        self.duplicate_proposals += other.duplicate_proposals;
        self.nodes_without_retained_genes += other.nodes_without_retained_genes;
        self.empty_subtrees += other.empty_subtrees;
        self.issues_dropped += other.issues_dropped;
        for issue in other.issues.into_iter().chain(other.conflict_sample) {
            self.record_issue(issue);
        }
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicts > 0
    }

    /// Conflicts kept in the conflict sample
    pub fn conflict_issues(&self) -> impl Iterator<Item = &ResolutionIssue> {
        self.conflict_sample.iter()
    }
}
