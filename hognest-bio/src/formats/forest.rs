//! JSON hand-off format of parsed HOG forests

use super::at_path;
use crate::hog::HogForest;
use hognest_core::error::{HognestError, HognestResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Read a `{"groups": [{"group_key", "root"}]}` document
pub fn read_forest_json(path: &Path) -> HognestResult<HogForest> {
    let file = File::open(path).map_err(|e| {
        HognestError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let forest = parse_forest_json(BufReader::new(file)).map_err(|e| at_path(path, e))?;
    debug!("Read {} groups from {}", forest.len(), path.display());
    Ok(forest)
}

/// Parse a forest document from any reader
///
/// Syntax and shape errors carry the line and column reported by serde_json.
pub fn parse_forest_json<R: Read>(reader: R) -> HognestResult<HogForest> {
    serde_json::from_reader(reader).map_err(|e| {
        HognestError::Parse(format!(
            "line {} column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })
}

pub fn write_forest_json(forest: &HogForest, path: &Path) -> HognestResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, forest)?;
    writer.flush()?;
    Ok(())
}
