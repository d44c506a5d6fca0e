use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use hognest_bio::formats::{read_associations_file, read_gene_catalog, read_groups_file};
use hognest_bio::nested_set::{verify_associations, verify_catalog_membership, verify_nested_set};
use hognest_core::HognestError;
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// Group table written by `hognest encode`
    #[arg(long, value_name = "FILE")]
    pub groups: PathBuf,

    /// Gene association table written by `hognest encode`
    #[arg(long, value_name = "FILE")]
    pub associations: Option<PathBuf>,

    /// Check associated genes against this catalog
    #[arg(long, value_name = "FILE", requires = "associations")]
    pub catalog: Option<PathBuf>,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    action(&format!("Verifying {}", args.groups.display()));
    let records = read_groups_file(&args.groups)?;
    verify_nested_set(&records).map_err(HognestError::InvariantViolation)?;
    success(&format!(
        "{} group records form a valid nested set",
        format_number(records.len() as u64)
    ));

    if let Some(path) = &args.associations {
        let associations = read_associations_file(path)?;
        verify_associations(&associations, &records).map_err(HognestError::InvariantViolation)?;

        if let Some(catalog_path) = &args.catalog {
            let catalog = read_gene_catalog(catalog_path)?;
            verify_catalog_membership(&associations, &catalog)
                .map_err(HognestError::InvariantViolation)?;
        }
        success(&format!(
            "{} gene associations are unique and point at known nodes",
            format_number(associations.len() as u64)
        ));
    }

    Ok(())
}
