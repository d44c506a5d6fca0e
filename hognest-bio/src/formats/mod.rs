pub mod catalog;
pub mod forest;
pub mod records;

// Re-export commonly used functions
pub use catalog::{parse_gene_catalog, parse_genome_sharing, read_gene_catalog, read_genome_sharing};
pub use forest::{parse_forest_json, read_forest_json, write_forest_json};
pub use records::{
    read_associations_file, read_associations_tsv, read_encoding_json, read_groups_file,
    read_groups_tsv, write_associations_tsv, write_encoding_json, write_groups_tsv,
    ASSOCIATIONS_TSV, ENCODING_JSON, GROUPS_TSV,
};

use crate::nested_set::Encoding;
use hognest_core::error::{HognestError, HognestResult};
use hognest_core::OutputFormat;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix a parse error with the file it came from
pub(crate) fn at_path(path: &Path, err: HognestError) -> HognestError {
    match err {
        HognestError::Parse(msg) => HognestError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}

/// Write an encoding into `directory` and return the files created
///
/// TSV output is split into the group and association tables; JSON output is
/// a single document that also holds the run report.
pub fn write_encoding(
    encoding: &Encoding,
    directory: &Path,
    format: OutputFormat,
) -> HognestResult<Vec<PathBuf>> {
    fs::create_dir_all(directory)?;

    let written = match format {
        OutputFormat::Tsv => {
            let groups = directory.join(GROUPS_TSV);
            write_groups_tsv(BufWriter::new(File::create(&groups)?), &encoding.groups)?;
            let associations = directory.join(ASSOCIATIONS_TSV);
            write_associations_tsv(
                BufWriter::new(File::create(&associations)?),
                &encoding.associations,
            )?;
            vec![groups, associations]
        }
        OutputFormat::Json => {
            let path = directory.join(ENCODING_JSON);
            write_encoding_json(File::create(&path)?, encoding)?;
            vec![path]
        }
    };

    info!(
        "Wrote {} group records and {} gene associations to {}",
        encoding.groups.len(),
        encoding.associations.len(),
        directory.display()
    );
    Ok(written)
}
