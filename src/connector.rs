//! Connector facade
//!
//! [`ConnectorFacade`] is the entry point for callers: hand it a seed URL
//! and a correlation id, get back the complete, ordered result set or a
//! [`TraversalError`].
//!
//! ```rust,ignore
//! use pagewalk::{ConnectorFacade, IngestConfig};
//!
//! let facade = ConnectorFacade::from_config(&IngestConfig::default())?;
//! let items = facade
//!     .fetch_all("https://api.example.com/articles", "req-1234")
//!     .await?;
//! println!("{} articles", items.len());
//! ```

use crate::config::IngestConfig;
use crate::error::{Error, Result, TraversalError};
use crate::http::{HttpPageFetcher, PageFetcher};
use crate::page::PageLayout;
use crate::pagination::{paginator_from_config, Paginator};
use crate::traversal::{PaginationTraversal, ResultSet, TraversalLimits};
use crate::types::CorrelationId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use url::Url;

/// Entry point for fetching a complete paginated dataset
///
/// A facade holds only immutable settings. Each `fetch_all` call builds its
/// own traversal and accumulator, so a single facade can serve concurrent
/// callers without their results mixing.
pub struct ConnectorFacade {
    fetcher: Arc<dyn PageFetcher>,
    paginator: Box<dyn Paginator>,
    layout: PageLayout,
    limits: TraversalLimits,
}

impl ConnectorFacade {
    /// Create a facade around an existing fetcher
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &IngestConfig) -> Self {
        Self {
            fetcher,
            paginator: paginator_from_config(&config.page.pagination),
            layout: PageLayout::from_config(&config.page),
            limits: TraversalLimits::from_config(&config.limits),
        }
    }

    /// Create a facade backed by an HTTP fetcher
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpPageFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    /// Replace the paginator
    #[must_use]
    pub fn with_paginator(mut self, paginator: Box<dyn Paginator>) -> Self {
        self.paginator = paginator;
        self
    }

    /// Replace the page layout
    #[must_use]
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the traversal limits
    #[must_use]
    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Traversal limits in effect
    pub fn limits(&self) -> TraversalLimits {
        self.limits
    }

    /// Fetch every page reachable from `seed_url`
    pub async fn fetch_all(
        &self,
        seed_url: &str,
        correlation_id: impl Into<CorrelationId>,
    ) -> std::result::Result<ResultSet, TraversalError> {
        self.fetch_all_with_cancel(seed_url, correlation_id, CancellationToken::new())
            .await
    }

    /// Fetch every page reachable from `seed_url`, aborting when `cancel` fires
    pub async fn fetch_all_with_cancel(
        &self,
        seed_url: &str,
        correlation_id: impl Into<CorrelationId>,
        cancel: CancellationToken,
    ) -> std::result::Result<ResultSet, TraversalError> {
        let correlation_id = correlation_id.into();
        let span = info_span!("fetch_all", correlation_id = %correlation_id, seed = %seed_url);

        async move {
            let seed = parse_seed(seed_url).map_err(|e| {
                TraversalError::new(correlation_id.clone(), seed_url, 0, e)
            })?;

            info!("starting traversal");
            PaginationTraversal::new(
                self.fetcher.as_ref(),
                self.paginator.as_ref(),
                &self.layout,
                correlation_id,
            )
            .with_limits(self.limits)
            .with_cancellation(cancel)
            .run(seed)
            .await
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for ConnectorFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorFacade")
            .field("layout", &self.layout)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Parse a seed URL, accepting only absolute http(s) URLs
fn parse_seed(seed: &str) -> Result<Url> {
    let url = Url::parse(seed.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::parse(format!(
            "seed URL '{seed}' has unsupported scheme '{scheme}'"
        ))),
    }
}
