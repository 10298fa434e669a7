//! Traversal types
//!
//! States, limits and the completed result set of a traversal.

use crate::config::LimitsConfig;
use crate::error::Error;
use crate::page::PageResponse;
use crate::pagination::PageSummary;
use crate::types::JsonValue;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// State of a pagination traversal
#[derive(Debug)]
pub enum TraversalState {
    /// About to fetch `target`
    Fetching {
        /// URL of the page to fetch
        target: Url,
    },
    /// A page arrived and its items are being merged
    Accumulating {
        /// URL the page was fetched from
        url: Url,
        /// The decoded page
        page: PageResponse,
    },
    /// Items merged, deciding where to go next
    Following {
        /// URL the page was fetched from
        url: Url,
        /// Navigation left over from the merged page
        summary: PageSummary,
    },
    /// Every page has been visited
    Done,
    /// The traversal failed
    Failed {
        /// URL being fetched or followed when the error happened
        url: Url,
        /// The error
        error: Error,
    },
}

impl TraversalState {
    /// Short state name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetching { .. } => "fetching",
            Self::Accumulating { .. } => "accumulating",
            Self::Following { .. } => "following",
            Self::Done => "done",
            Self::Failed { .. } => "failed",
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// Bounds on a single traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Maximum number of pages fetched
    pub max_pages: usize,
    /// Total elapsed-time budget
    pub max_elapsed: Option<Duration>,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}

impl TraversalLimits {
    /// Build limits from their config section
    pub fn from_config(config: &LimitsConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_elapsed: config.max_elapsed_ms.map(Duration::from_millis),
        }
    }

    /// Set the page limit
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the elapsed-time budget
    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }
}

/// Statistics from a completed traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Pages fetched
    pub pages_fetched: usize,
    /// Wall-clock duration
    pub elapsed: Duration,
}

/// Every item of a completed traversal, in page-then-item order
///
/// Serializes as a plain JSON array of the items.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    items: Vec<JsonValue>,
    #[serde(skip)]
    stats: TraversalStats,
}

impl ResultSet {
    /// Create a result set
    pub fn new(items: Vec<JsonValue>, stats: TraversalStats) -> Self {
        Self { items, stats }
    }

    /// The items
    pub fn items(&self) -> &[JsonValue] {
        &self.items
    }

    /// Returns the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items were collected
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over the items
    pub fn iter(&self) -> std::slice::Iter<'_, JsonValue> {
        self.items.iter()
    }

    /// Traversal statistics
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    /// Consume the result set and return its items
    pub fn into_items(self) -> Vec<JsonValue> {
        self.items
    }
}

impl IntoIterator for ResultSet {
    type Item = JsonValue;
    type IntoIter = std::vec::IntoIter<JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a JsonValue;
    type IntoIter = std::slice::Iter<'a, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
