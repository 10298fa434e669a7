//! Page response module
//!
//! Decodes a fetched JSON body into an explicit [`PageResponse`]: the ordered
//! item records plus an optional next-page link.
//!
//! # Overview
//!
//! A [`PageLayout`] names where the items and the next link live in the body.
//! Bodies that do not fit the layout are rejected with a parse error rather
//! than probed field by field at each call site.

mod types;

pub use types::{lookup_path, PageLayout, PageResponse};
