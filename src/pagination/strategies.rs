//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PageSummary, Paginator};
use crate::error::{Error, Result};
use url::Url;

// ============================================================================
// Next Link Pagination
// ============================================================================

/// Hypermedia pagination (next URL in the response body)
///
/// Follows the link each page carries until a page has none.
/// Common patterns:
/// - `{ "links": { "next": "https://api.example.com/items?page=2" } }`
/// - `{ "nextLink": "/items?cursor=abc" }`
#[derive(Debug, Clone)]
pub struct NextLinkPaginator {
    /// Link values that mean "no more pages"
    pub end_markers: Vec<String>,
    /// Resolve relative links against the requesting URL
    pub resolve_relative: bool,
}

impl Default for NextLinkPaginator {
    fn default() -> Self {
        Self {
            end_markers: Vec::new(),
            resolve_relative: true,
        }
    }
}

impl NextLinkPaginator {
    /// Create a new next link paginator
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the end-of-pagination marker values
    #[must_use]
    pub fn with_end_markers(mut self, markers: Vec<String>) -> Self {
        self.end_markers = markers;
        self
    }

    /// Enable or disable relative link resolution
    #[must_use]
    pub fn with_resolve_relative(mut self, resolve: bool) -> Self {
        self.resolve_relative = resolve;
        self
    }

    fn resolve(&self, current: &Url, link: &str) -> Result<Url> {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) if self.resolve_relative => {
                current.join(link).map_err(|e| {
                    Error::parse(format!("cannot resolve next link '{link}': {e}"))
                })?
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Err(Error::parse(format!(
                    "next link '{link}' is not an absolute URL"
                )))
            }
            Err(e) => return Err(Error::parse(format!("malformed next link '{link}': {e}"))),
        };

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::parse(format!(
                "next link '{link}' has unsupported scheme '{scheme}'"
            ))),
        }
    }
}

impl Paginator for NextLinkPaginator {
    fn next_page(&self, current: &Url, page: &PageSummary) -> Result<NextPage> {
        let Some(link) = page.next_link.as_deref().map(str::trim) else {
            return Ok(NextPage::Done);
        };

        if link.is_empty() || self.end_markers.iter().any(|m| m == link) {
            return Ok(NextPage::Done);
        }

        self.resolve(current, link).map(NextPage::Continue)
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// Rewrites a page-number query parameter (`?page=1`, `?page=2`, ...) and
/// stops at the first page with no items. An empty response body counts as
/// such a page.
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u32,
}

impl Default for PageNumberPaginator {
    fn default() -> Self {
        Self::new("page", 1)
    }
}

impl PageNumberPaginator {
    /// Create a new page number paginator
    pub fn new(param: impl Into<String>, start_page: u32) -> Self {
        Self {
            param: param.into(),
            start_page,
        }
    }

    fn current_page(&self, url: &Url) -> Result<u32> {
        match url.query_pairs().find(|(k, _)| k == self.param.as_str()) {
            Some((_, value)) => value.parse().map_err(|_| {
                Error::parse(format!(
                    "query parameter '{}' is not a page number: '{value}'",
                    self.param
                ))
            }),
            None => Ok(self.start_page),
        }
    }
}

impl Paginator for PageNumberPaginator {
    fn first_page(&self, seed: &Url) -> Url {
        if seed.query_pairs().any(|(k, _)| k == self.param.as_str()) {
            seed.clone()
        } else {
            with_query_param(seed, &self.param, &self.start_page.to_string())
        }
    }

    fn next_page(&self, current: &Url, page: &PageSummary) -> Result<NextPage> {
        if page.item_count == 0 {
            return Ok(NextPage::Done);
        }

        let next = self
            .current_page(current)?
            .checked_add(1)
            .ok_or_else(|| Error::parse("page number overflow"))?;

        Ok(NextPage::Continue(with_query_param(
            current,
            &self.param,
            &next.to_string(),
        )))
    }
}

/// Replace (or add) one query parameter, keeping the others in order
fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let others: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = url.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(others)
        .append_pair(key, value);
    next
}
