use super::effective_config;
use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use hognest_bio::formats::{read_forest_json, read_gene_catalog, read_genome_sharing, write_encoding};
use hognest_bio::{EncodeReport, EncoderOptions, GenomeSharingMap, NestedSetEncoder};
use hognest_core::{HognestError, OutputFormat};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct EncodeArgs {
    /// Parsed HOG forest (JSON)
    #[arg(long, value_name = "FILE")]
    pub forest: PathBuf,

    /// Gene catalog, one gene id per line
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Genome-sharing map (reference taxon id and synthetic prefix per line)
    #[arg(long, value_name = "FILE")]
    pub sharing: Option<PathBuf>,

    /// Output directory (defaults to output.directory from the config)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Output format (defaults to output.format from the config)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", env = "HOGNEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lay out top-level groups on the thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Also write the run report as JSON
    #[arg(long = "report-output", value_name = "FILE")]
    pub report_output: Option<PathBuf>,
}

pub fn run(args: EncodeArgs) -> Result<()> {
    let config = effective_config(args.config.as_deref())?;

    action(&format!("Reading forest from {}", args.forest.display()));
    let forest = read_forest_json(&args.forest)?;
    let catalog = read_gene_catalog(&args.catalog)?;
    let sharing = match &args.sharing {
        Some(path) => read_genome_sharing(path)?,
        None => GenomeSharingMap::new(),
    };
    info!(
        "Loaded {} groups, {} catalogued genes, {} sharing references",
        forest.len(),
        catalog.len(),
        sharing.len()
    );

    let parallel = args.parallel || config.encoding.parallel;
    let encoder =
        NestedSetEncoder::new(&catalog, &sharing).with_options(EncoderOptions::from(&config));
    let entries = forest.entries();

    action(&format!(
        "Encoding {} groups{}",
        format_number(entries.len() as u64),
        if parallel { " in parallel" } else { "" }
    ));
    // Nothing is written when encoding or verification fails
    let encoding = if parallel {
        encoder.encode_parallel(&entries)
    } else {
        encoder.encode(&entries)
    }
    .map_err(HognestError::from)?;

    let directory = args
        .out
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let format = args.format.unwrap_or(config.output.format);
    let written = write_encoding(&encoding, &directory, format)?;

    if let Some(path) = &args.report_output {
        let report = serde_json::to_string_pretty(&encoding.report).map_err(HognestError::from)?;
        std::fs::write(path, report).map_err(HognestError::Io)?;
    }

    print_report(&encoding.report);
    for path in &written {
        success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

fn print_report(report: &EncodeReport) {
    tree_section(
        "Groups",
        vec![
            ("Top-level groups", format_number(report.groups)),
            ("Nodes", format_number(report.nodes)),
            ("Speciation nodes", format_number(report.speciation_nodes)),
            ("Duplication nodes", format_number(report.duplication_nodes)),
        ],
        false,
    );
    tree_section(
        "Genes",
        vec![
            ("Gene references", format_number(report.gene_refs)),
            ("Associations", format_number(report.associations)),
            ("Synthetic associations", format_number(report.synthetic_associations)),
            ("Catalog misses", format_number(report.catalog_misses)),
            ("Conflicts", format_number(report.conflicts)),
            ("Empty subtrees", format_number(report.empty_subtrees)),
        ],
        true,
    );

    if report.has_conflicts() {
        warning(&format!(
            "{} genes were claimed by more than one node; the first node kept them",
            format_number(report.conflicts)
        ));
        for issue in report.conflict_issues().take(5) {
            info(&issue.to_string());
        }
    }
}
