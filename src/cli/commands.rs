//! CLI commands and argument parsing

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetch complete datasets from paginated HTTP APIs
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page reachable from a seed URL
    Fetch {
        /// Absolute URL of the first page
        seed_url: String,

        /// Correlation id attached to requests and logs (generated if omitted)
        #[arg(long)]
        correlation_id: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Override the maximum number of pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Override the per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Print the effective configuration as YAML
    Config,
}
