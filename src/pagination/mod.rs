//! Pagination module
//!
//! Supports: Next Link (hypermedia), Page Number (legacy)
//!
//! # Overview
//!
//! A [`Paginator`] looks at the page just fetched and decides which URL to
//! fetch next, or that the resource is exhausted. Which strategy an upstream
//! needs is a configuration choice; see [`PaginationConfigDef`].

mod strategies;
mod types;

pub use strategies::{NextLinkPaginator, PageNumberPaginator};
pub use types::{NextPage, PageSummary, Paginator};

use crate::config::PaginationConfigDef;

/// Build the paginator described by a pagination config
pub fn paginator_from_config(config: &PaginationConfigDef) -> Box<dyn Paginator> {
    match config {
        PaginationConfigDef::NextLink {
            end_markers,
            resolve_relative,
            ..
        } => Box::new(
            NextLinkPaginator::new()
                .with_end_markers(end_markers.clone())
                .with_resolve_relative(*resolve_relative),
        ),
        PaginationConfigDef::PageNumber { param, start_page } => {
            Box::new(PageNumberPaginator::new(param.clone(), *start_page))
        }
    }
}
