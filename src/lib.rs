// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

//! # pagewalk
//!
//! Fetch complete datasets from paginated HTTP JSON APIs.
//!
//! Given a seed URL, pagewalk follows next-page links until the last page,
//! merging every page's items into one ordered result set. Cycles, limits,
//! timeouts and cancellation end a traversal with a typed error; a caller
//! never receives a partial dataset.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::{ConnectorFacade, IngestConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load("ingest.yaml")?;
//!     let facade = ConnectorFacade::from_config(&config)?;
//!
//!     let items = facade
//!         .fetch_all("https://api.example.com/articles", "req-1234")
//!         .await?;
//!
//!     for item in &items {
//!         println!("{item}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     ConnectorFacade                       │
//! │        fetch_all(seed, correlation_id) → ResultSet        │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//!                   PaginationTraversal (per call)
//!                              │
//! ┌──────────────┬─────────────┴─────┬─────────────┬──────────┐
//! │    HTTP      │    Pagination     │    Page     │  Result  │
//! ├──────────────┼───────────────────┼─────────────┼──────────┤
//! │ Timeout      │ Next link         │ Items path  │ Ordered  │
//! │ Retry        │ Page number       │ Next path   │ append   │
//! │ Backoff      │ Relative links    │             │          │
//! └──────────────┴───────────────────┴─────────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// YAML configuration
pub mod config;

/// Page decoding
pub mod page;

/// Ordered result accumulation
pub mod accumulator;

/// HTTP page fetching with retry
pub mod http;

/// Next-page strategies
pub mod pagination;

/// Traversal state machine
pub mod traversal;

/// Public entry point
pub mod connector;

/// Result set serialization
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::IngestConfig;
pub use connector::ConnectorFacade;
pub use error::{Error, ErrorKind, Result, TraversalError};
pub use traversal::ResultSet;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
