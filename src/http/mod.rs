//! HTTP module
//!
//! Provides the [`PageFetcher`] seam and its reqwest-backed implementation.
//!
//! # Features
//!
//! - **Bounded requests**: per-request timeout and redirect limit
//! - **Automatic Retries**: injectable [`RetryPolicy`] with backoff
//! - **Error classification**: network, status, and parse failures are kept apart
//! - **Correlation**: every request carries the caller's correlation id

mod client;
mod retry;

pub use client::{FetchedPage, HttpPageFetcher, PageFetcher, CORRELATION_HEADER};
pub use retry::RetryPolicy;
