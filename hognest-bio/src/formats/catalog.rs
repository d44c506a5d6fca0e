//! Tab-separated catalog inputs
//!
//! Both files allow `#` comment lines and blank lines.

use super::at_path;
use crate::catalog::{GeneSet, GenomeSharingMap};
use csv::{ReaderBuilder, StringRecord};
use hognest_core::error::{HognestError, HognestResult};
use hognest_core::TaxonId;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_error(err: csv::Error) -> HognestError {
    match err.position() {
        Some(position) => HognestError::Parse(format!("line {}: {}", position.line(), err)),
        None => HognestError::Parse(err.to_string()),
    }
}

/// Read the catalogued gene ids (first column) from `path`
pub fn read_gene_catalog(path: &Path) -> HognestResult<GeneSet> {
    let catalog = parse_gene_catalog(File::open(path)?).map_err(|e| at_path(path, e))?;
    debug!("Read {} catalogued genes from {}", catalog.len(), path.display());
    Ok(catalog)
}

pub fn parse_gene_catalog<R: Read>(reader: R) -> HognestResult<GeneSet> {
    let mut catalog = GeneSet::new();
    for result in tsv_reader(reader).records() {
        let record = result.map_err(parse_error)?;
        match record.get(0).map(str::trim) {
            Some(gene_id) if !gene_id.is_empty() => {
                catalog.insert(gene_id);
            }
            _ => continue,
        }
    }
    Ok(catalog)
}

/// Read `reference_taxon_id<TAB>prefix` rows from `path`
pub fn read_genome_sharing(path: &Path) -> HognestResult<GenomeSharingMap> {
    let sharing = parse_genome_sharing(File::open(path)?).map_err(|e| at_path(path, e))?;
    debug!(
        "Read synthetic prefixes for {} reference species from {}",
        sharing.len(),
        path.display()
    );
    Ok(sharing)
}

pub fn parse_genome_sharing<R: Read>(reader: R) -> HognestResult<GenomeSharingMap> {
    let mut sharing = GenomeSharingMap::new();
    for result in tsv_reader(reader).records() {
        let record = result.map_err(parse_error)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = line_of(&record);

        let (taxon, prefix) = match (record.get(0), record.get(1)) {
            (Some(taxon), Some(prefix)) => (taxon.trim(), prefix.trim()),
            _ => {
                return Err(HognestError::Parse(format!(
                    "line {}: expected reference taxon id and prefix",
                    line
                )))
            }
        };
        let taxon: u32 = taxon.parse().map_err(|_| {
            HognestError::Parse(format!("line {}: invalid taxon id '{}'", line, taxon))
        })?;
        if prefix.is_empty() {
            return Err(HognestError::Parse(format!("line {}: empty prefix", line)));
        }

        sharing.insert(TaxonId(taxon), prefix);
    }
    Ok(sharing)
}
