//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::error::Result;
use url::Url;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this URL next
    Continue(Url),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The next URL, if any
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Continue(url) => Some(url),
            Self::Done => None,
        }
    }
}

/// What a paginator gets to see of a page after its items were merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Raw next link from the page, if any
    pub next_link: Option<String>,
    /// Number of items the page carried
    pub item_count: usize,
}

impl PageSummary {
    /// Create a summary
    pub fn new(next_link: Option<String>, item_count: usize) -> Self {
        Self {
            next_link,
            item_count,
        }
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// URL of the first page for a seed URL
    fn first_page(&self, seed: &Url) -> Url {
        seed.clone()
    }

    /// Decide what to fetch after the page at `current`
    ///
    /// Returns a parse error when the page's navigation cannot be turned
    /// into a usable URL.
    fn next_page(&self, current: &Url, page: &PageSummary) -> Result<NextPage>;
}
