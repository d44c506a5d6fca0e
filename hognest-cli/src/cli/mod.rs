pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hognest",
    version,
    about = "Nested-set encoding of hierarchical orthologous groups",
    long_about = "Hognest flattens forests of hierarchical orthologous groups into nested-set \
                  interval records and resolves their gene leaves against a gene catalog, \
                  producing tables that answer ancestry queries with range comparisons."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a HOG forest into group and gene association tables
    Encode(commands::encode::EncodeArgs),

    /// Re-check previously written tables
    Verify(commands::verify::VerifyArgs),

    /// Show the effective configuration or write a default one
    Config(commands::config::ConfigArgs),
}
