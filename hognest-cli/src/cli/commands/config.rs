use super::effective_config;
use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use hognest_core::{save_config, Config, HognestError};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write a default configuration to PATH instead of printing
    #[arg(long, value_name = "PATH")]
    pub init: Option<PathBuf>,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Configuration file to show
    #[arg(short, long, value_name = "FILE", env = "HOGNEST_CONFIG")]
    pub config: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    if let Some(path) = &args.init {
        if path.exists() && !args.force {
            return Err(HognestError::Configuration(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ))
            .into());
        }
        save_config(path, &Config::default())?;
        success(&format!("Wrote default configuration to {}", path.display()));
        return Ok(());
    }

    let config = effective_config(args.config.as_deref())?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| HognestError::Configuration(format!("Failed to serialize config: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}
