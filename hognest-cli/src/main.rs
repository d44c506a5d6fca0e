use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use hognest_core::HognestError;

fn main() {
    let cli = Cli::parse();

    // HOGNEST_LOG sets the level unless -v asks for more; RUST_LOG wins over both
    let log_level = match cli.verbose {
        0 => std::env::var("HOGNEST_LOG").unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

/// Map an error to the process exit code
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<HognestError>() {
        Some(HognestError::Configuration(_)) => 2,
        Some(HognestError::Io(_)) => 3,
        Some(HognestError::Parse(_)) => 4,
        Some(HognestError::Structural(_)) | Some(HognestError::InvariantViolation(_)) => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Configure thread pool
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Encode(args) => crate::cli::commands::encode::run(args),
        Commands::Verify(args) => crate::cli::commands::verify::run(args),
        Commands::Config(args) => crate::cli::commands::config::run(args),
    }
}
