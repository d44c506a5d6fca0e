//! Post-hoc checks of encoder output
//!
//! These work on the emitted rows alone, so they also validate tables read
//! back from disk.

use crate::catalog::GeneCatalog;
use hognest_core::{
    GeneAssociation, HierarchicalGroupRecord, InvariantViolation, InvariantViolationType, NodeId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Check ids, bound uniqueness, proper nesting and interval widths
///
/// Widths are checked against the number of records actually nested inside
/// each interval within its group.
pub fn verify_nested_set(records: &[HierarchicalGroupRecord]) -> Result<(), InvariantViolation> {
    let mut node_ids = HashSet::with_capacity(records.len());
    let mut bounds = HashSet::with_capacity(records.len() * 2);

    for record in records {
        if !node_ids.insert(record.node_id) {
            return Err(violation(record, InvariantViolationType::DuplicateNodeId));
        }
        if record.right_bound <= record.left_bound {
            return Err(violation(
                record,
                InvariantViolationType::InvertedInterval {
                    left: record.left_bound,
                    right: record.right_bound,
                },
            ));
        }
        for bound in [record.left_bound, record.right_bound] {
            if !bounds.insert(bound) {
                return Err(violation(
                    record,
                    InvariantViolationType::DuplicateBound { bound },
                ));
            }
        }
    }

    let mut groups: BTreeMap<&str, Vec<&HierarchicalGroupRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(&record.group_key).or_default().push(record);
    }

    for (group_key, mut members) in groups {
        members.sort_by_key(|record| record.left_bound);
        verify_group(&members)?;
        debug!("Verified {} nodes of {}", members.len(), group_key);
    }

    Ok(())
}

/// Stack sweep over one group sorted by left bound
fn verify_group(members: &[&HierarchicalGroupRecord]) -> Result<(), InvariantViolation> {
    // (position in `members`, nodes seen in its subtree so far)
    let mut open: Vec<(usize, u64)> = Vec::new();

    for (position, record) in members.iter().enumerate() {
        while let Some(&(top, _)) = open.last() {
            if members[top].right_bound > record.left_bound {
                break;
            }
            close(members, &mut open)?;
        }
        if let Some(&(top, _)) = open.last() {
            if record.right_bound > members[top].right_bound {
                return Err(violation(
                    record,
                    InvariantViolationType::PartialOverlap {
                        other: members[top].node_id,
                    },
                ));
            }
        }
        open.push((position, 1));
    }

    while !open.is_empty() {
        close(members, &mut open)?;
    }
    Ok(())
}

fn close(
    members: &[&HierarchicalGroupRecord],
    open: &mut Vec<(usize, u64)>,
) -> Result<(), InvariantViolation> {
    let Some((position, size)) = open.pop() else {
        return Ok(());
    };
    let record = members[position];
    if record.right_bound - record.left_bound + 1 != 2 * size {
        return Err(violation(
            record,
            InvariantViolationType::BoundWidth {
                left: record.left_bound,
                right: record.right_bound,
                subtree_size: size,
            },
        ));
    }
    if let Some((_, parent_size)) = open.last_mut() {
        *parent_size += size;
    }
    Ok(())
}

fn violation(record: &HierarchicalGroupRecord, kind: InvariantViolationType) -> InvariantViolation {
    InvariantViolation::with_context(record.node_id, kind, record.group_key.as_str())
}

/// Check that every gene appears once and points at an emitted node
pub fn verify_associations(
    associations: &[GeneAssociation],
    records: &[HierarchicalGroupRecord],
) -> Result<(), InvariantViolation> {
    let nodes: HashSet<NodeId> = records.iter().map(|record| record.node_id).collect();
    let mut owners: HashMap<&str, NodeId> = HashMap::with_capacity(associations.len());

    for association in associations {
        if !nodes.contains(&association.parent_node_id) {
            return Err(InvariantViolation::new(
                association.parent_node_id,
                InvariantViolationType::DanglingParent {
                    gene_id: association.gene_id.clone(),
                },
            ));
        }
        if let Some(first) = owners.insert(&association.gene_id, association.parent_node_id) {
            return Err(InvariantViolation::with_context(
                association.parent_node_id,
                InvariantViolationType::DuplicateGene {
                    gene_id: association.gene_id.clone(),
                },
                format!("first associated with node {}", first),
            ));
        }
    }

    Ok(())
}

/// Check that every associated gene is catalogued
pub fn verify_catalog_membership<C: GeneCatalog + ?Sized>(
    associations: &[GeneAssociation],
    catalog: &C,
) -> Result<(), InvariantViolation> {
    match associations
        .iter()
        .find(|association| !catalog.contains_gene(&association.gene_id))
    {
        Some(association) => Err(InvariantViolation::new(
            association.parent_node_id,
            InvariantViolationType::UnknownGene {
                gene_id: association.gene_id.clone(),
            },
        )),
        None => Ok(()),
    }
}
