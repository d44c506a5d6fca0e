//! Encoded table writers and readers
//!
//! TSV files carry a header row and load directly into the
//! `HierarchicalGroup` and `Gene` tables.

use super::at_path;
use crate::nested_set::Encoding;
use csv::{ReaderBuilder, WriterBuilder};
use hognest_core::error::{HognestError, HognestResult};
use hognest_core::{GeneAssociation, HierarchicalGroupRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const GROUPS_TSV: &str = "hierarchical_groups.tsv";
pub const ASSOCIATIONS_TSV: &str = "gene_associations.tsv";
pub const ENCODING_JSON: &str = "encoding.json";

const GROUP_COLUMNS: [&str; 5] = ["node_id", "group_key", "left_bound", "right_bound", "taxon_id"];
const ASSOCIATION_COLUMNS: [&str; 2] = ["gene_id", "parent_node_id"];

// Header is written up front so empty tables still carry it
fn write_tsv<W: Write, T: Serialize>(writer: W, columns: &[&str], rows: &[T]) -> HognestResult<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_tsv<R: Read, T: DeserializeOwned>(reader: R) -> HognestResult<Vec<T>> {
    let mut reader = ReaderBuilder::new().delimiter(b'\t').from_reader(reader);
    reader
        .deserialize()
        .map(|row| {
            row.map_err(|e| match e.position() {
                Some(position) => {
                    HognestError::Parse(format!("line {}: {}", position.line(), e))
                }
                None => HognestError::Parse(e.to_string()),
            })
        })
        .collect()
}

/// Write `node_id group_key left_bound right_bound taxon_id` rows
pub fn write_groups_tsv<W: Write>(writer: W, records: &[HierarchicalGroupRecord]) -> HognestResult<()> {
    write_tsv(writer, &GROUP_COLUMNS, records)
}

/// Write `gene_id parent_node_id` rows
pub fn write_associations_tsv<W: Write>(
    writer: W,
    associations: &[GeneAssociation],
) -> HognestResult<()> {
    write_tsv(writer, &ASSOCIATION_COLUMNS, associations)
}

pub fn read_groups_tsv<R: Read>(reader: R) -> HognestResult<Vec<HierarchicalGroupRecord>> {
    read_tsv(reader)
}

pub fn read_associations_tsv<R: Read>(reader: R) -> HognestResult<Vec<GeneAssociation>> {
    read_tsv(reader)
}

/// Groups, associations and the run report in one document
pub fn write_encoding_json<W: Write>(writer: W, encoding: &Encoding) -> HognestResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, encoding)?;
    writer.flush()?;
    Ok(())
}

pub fn read_encoding_json<R: Read>(reader: R) -> HognestResult<Encoding> {
    serde_json::from_reader(reader).map_err(|e| {
        HognestError::Parse(format!("line {} column {}: {}", e.line(), e.column(), e))
    })
}

pub fn read_groups_file(path: &Path) -> HognestResult<Vec<HierarchicalGroupRecord>> {
    read_groups_tsv(File::open(path)?).map_err(|e| at_path(path, e))
}

pub fn read_associations_file(path: &Path) -> HognestResult<Vec<GeneAssociation>> {
    read_associations_tsv(File::open(path)?).map_err(|e| at_path(path, e))
}
