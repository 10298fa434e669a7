//! CLI module
//!
//! Command-line interface for fetching paginated datasets.
//!
//! # Commands
//!
//! - `fetch` - Walk every page from a seed URL and write the items
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
