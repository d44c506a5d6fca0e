//! Gene association resolution
//!
//! Resolution runs in two steps. [`CandidateExpander`] turns a node's gene
//! leaves into catalog-confirmed proposals; it only reads the catalogs and can
//! run on many trees at once. [`GeneResolver`] then claims proposals through
//! the forest-scoped [`ConflictIndex`] in visit order, so the first node to
//! propose a gene keeps it.

use super::report::EncodeReport;
use crate::catalog::{GeneCatalog, GenomeSharingMap};
use crate::hog::GeneRef;
use hognest_core::{GeneAssociation, NodeId, ResolutionIssue};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Replace the leading alphabetic prefix of `candidate` with `prefix`
///
/// `"PFX00001"` with prefix `"FAKE1"` gives `"FAKE100001"`. Candidates without
/// a suffix after the prefix have no synthetic counterpart.
pub fn synthetic_gene_id(candidate: &str, prefix: &str) -> Option<String> {
    let split = candidate
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(candidate.len());
    let suffix = &candidate[split..];
    if suffix.is_empty() {
        return None;
    }
    Some(format!("{}{}", prefix, suffix))
}

/// A catalogued gene id proposed for one node of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub gene_id: String,
    /// Pre-order position of the proposing node within its tree
    pub local: usize,
    /// Built from a genome-sharing prefix
    pub synthetic: bool,
}

/// A catalog miss held back until its node's claims are settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredMiss {
    pub local: usize,
    pub issue: ResolutionIssue,
}

/// Proposals and held-back misses collected for one tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub proposals: Vec<Proposal>,
    /// Surfaced only for nodes that end up keeping no gene
    pub misses: Vec<DeferredMiss>,
}

/// Catalog lookups for gene leaves
pub struct CandidateExpander<'c, C: ?Sized> {
    catalog: &'c C,
    sharing: &'c GenomeSharingMap,
    delimiter: &'c str,
}

impl<C: ?Sized> Clone for CandidateExpander<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for CandidateExpander<'_, C> {}

impl<'c, C: GeneCatalog + ?Sized> CandidateExpander<'c, C> {
    pub fn new(catalog: &'c C, sharing: &'c GenomeSharingMap, delimiter: &'c str) -> Self {
        Self {
            catalog,
            sharing,
            delimiter,
        }
    }

    /// Propose every catalogued id reachable from `refs`
    ///
    /// Each candidate is looked up as written and, for species whose genome
    /// is shared, once per dependent prefix. Unknown ids are counted as
    /// catalog misses and kept aside in `out.misses`.
    pub fn expand(
        &self,
        refs: &[GeneRef],
        local: usize,
        node_id: NodeId,
        out: &mut Expansion,
        report: &mut EncodeReport,
    ) {
        for gene_ref in refs {
            report.gene_refs += 1;
            let prefixes = self.sharing.prefixes_for(gene_ref.species_taxon_id);

            for candidate in gene_ref.candidates(self.delimiter) {
                report.candidates += 1;
                self.lookup(candidate, gene_ref, local, node_id, false, out, report);

                for prefix in prefixes.into_iter().flatten() {
                    match synthetic_gene_id(candidate, prefix) {
                        Some(synthetic) => {
                            self.lookup(&synthetic, gene_ref, local, node_id, true, out, report)
                        }
                        None => trace!("{} has no numeric suffix for prefix {}", candidate, prefix),
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lookup(
        &self,
        gene_id: &str,
        gene_ref: &GeneRef,
        local: usize,
        node_id: NodeId,
        synthetic: bool,
        out: &mut Expansion,
        report: &mut EncodeReport,
    ) {
        if self.catalog.contains_gene(gene_id) {
            out.proposals.push(Proposal {
                gene_id: gene_id.to_string(),
                local,
                synthetic,
            });
        } else {
            trace!("Dropping {} under node {}: not in catalog", gene_id, node_id);
            report.catalog_misses += 1;
            out.misses.push(DeferredMiss {
                local,
                issue: ResolutionIssue::CatalogMiss {
                    gene_id: gene_id.to_string(),
                    species: gene_ref.species_taxon_id,
                    node_id,
                },
            });
        }
    }
}

/// Outcome of claiming a gene for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Accepted,
    /// The same node already owns the gene
    AlreadyHeld,
    /// Another node owns the gene
    Conflict(NodeId),
}

/// Forest-scoped gene → node ownership
#[derive(Debug, Default)]
pub struct ConflictIndex {
    owners: HashMap<String, NodeId>,
}

impl ConflictIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, gene_id: &str, node_id: NodeId) -> Claim {
        match self.owners.entry(gene_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(node_id);
                Claim::Accepted
            }
            Entry::Occupied(owner) if *owner.get() == node_id => Claim::AlreadyHeld,
            Entry::Occupied(owner) => Claim::Conflict(*owner.get()),
        }
    }

    pub fn owner(&self, gene_id: &str) -> Option<NodeId> {
        self.owners.get(gene_id).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Stateful resolver scoped to a single encode run
pub struct GeneResolver<'c, C: ?Sized> {
    expander: CandidateExpander<'c, C>,
    index: ConflictIndex,
    report: EncodeReport,
}

impl<'c, C: GeneCatalog + ?Sized> GeneResolver<'c, C> {
    pub fn new(
        catalog: &'c C,
        sharing: &'c GenomeSharingMap,
        delimiter: &'c str,
        issue_limit: usize,
    ) -> Self {
        Self {
            expander: CandidateExpander::new(catalog, sharing, delimiter),
            index: ConflictIndex::new(),
            report: EncodeReport::new(issue_limit),
        }
    }

    pub fn expander(&self) -> CandidateExpander<'c, C> {
        self.expander
    }

    /// Resolve the gene leaves of one node right away
    pub fn resolve(&mut self, refs: &[GeneRef], parent: NodeId) -> Vec<GeneAssociation> {
        let mut expansion = Expansion::default();
        let expander = self.expander;
        expander.expand(refs, 0, parent, &mut expansion, &mut self.report);

        let associations: Vec<GeneAssociation> = expansion
            .proposals
            .iter()
            .filter_map(|proposal| self.accept(proposal, parent))
            .collect();
        if associations.is_empty() {
            self.surface_misses(expansion.misses);
        }
        associations
    }

    /// Record misses of a node that kept no gene
    pub fn surface_misses(&mut self, misses: impl IntoIterator<Item = DeferredMiss>) {
        for miss in misses {
            self.report.record_issue(miss.issue);
        }
    }

    /// Claim a proposal for `node_id`; `None` if the gene is already owned
    pub fn accept(&mut self, proposal: &Proposal, node_id: NodeId) -> Option<GeneAssociation> {
        match self.index.claim(&proposal.gene_id, node_id) {
            Claim::Accepted => {
                self.report.associations += 1;
                if proposal.synthetic {
                    self.report.synthetic_associations += 1;
                }
                Some(GeneAssociation::new(proposal.gene_id.clone(), node_id))
            }
            Claim::AlreadyHeld => {
                debug!("{} proposed twice for node {}", proposal.gene_id, node_id);
                self.report.duplicate_proposals += 1;
                None
            }
            Claim::Conflict(existing) => {
                let issue = ResolutionIssue::Conflict {
                    gene_id: proposal.gene_id.clone(),
                    existing,
                    proposed: node_id,
                };
                warn!("{}", issue);
                self.report.conflicts += 1;
                self.report.record_issue(issue);
                None
            }
        }
    }

    pub fn owner(&self, gene_id: &str) -> Option<NodeId> {
        self.index.owner(gene_id)
    }

    pub fn report(&self) -> &EncodeReport {
        &self.report
    }

    pub fn into_report(self) -> EncodeReport {
        self.report
    }
}
