//! Pagination traversal
//!
//! Walks a paginated resource from a seed URL to completion.
//!
//! # Overview
//!
//! [`PaginationTraversal`] is an explicit state machine driven by a loop:
//!
//! ```text
//! Fetching ──ok──▶ Accumulating ──▶ Following ──next──▶ Fetching
//!    │                                  │
//!    └──err──▶ Failed ◀──cycle/bad link─┤
//!                                       └──no next──▶ Done
//! ```
//!
//! Exactly one fetch is in flight at a time, since the next URL is only
//! known once the previous page is parsed. A traversal owns its
//! accumulator and visited set; it is consumed by [`PaginationTraversal::run`]
//! and cannot be reused. On failure the accumulated items are dropped.

mod types;

pub use types::{ResultSet, TraversalLimits, TraversalState, TraversalStats};

use crate::accumulator::ResultAccumulator;
use crate::error::{Error, Result, TraversalError};
use crate::http::{FetchedPage, PageFetcher};
use crate::page::{PageLayout, PageResponse};
use crate::pagination::{NextPage, PageSummary, Paginator};
use crate::types::CorrelationId;
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// A single walk over a paginated resource
pub struct PaginationTraversal<'a> {
    fetcher: &'a dyn PageFetcher,
    paginator: &'a dyn Paginator,
    layout: &'a PageLayout,
    limits: TraversalLimits,
    correlation_id: CorrelationId,
    cancel: CancellationToken,
    accumulator: ResultAccumulator,
    visited: HashSet<String>,
    pages_fetched: usize,
    started: Instant,
}

impl<'a> PaginationTraversal<'a> {
    /// Create a traversal with default limits and no cancellation
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        paginator: &'a dyn Paginator,
        layout: &'a PageLayout,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            fetcher,
            paginator,
            layout,
            limits: TraversalLimits::default(),
            correlation_id,
            cancel: CancellationToken::new(),
            accumulator: ResultAccumulator::new(),
            visited: HashSet::new(),
            pages_fetched: 0,
            started: Instant::now(),
        }
    }

    /// Set traversal limits
    #[must_use]
    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Abort the traversal when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the traversal to a terminal state
    pub async fn run(mut self, seed: Url) -> std::result::Result<ResultSet, TraversalError> {
        self.started = Instant::now();
        let first = self.paginator.first_page(&seed);
        self.visited.insert(visit_key(&first));

        let mut state = TraversalState::Fetching { target: first };
        loop {
            state = match state {
                TraversalState::Fetching { target } => self.fetch(target).await,
                TraversalState::Accumulating { url, page } => self.accumulate(url, page),
                TraversalState::Following { url, summary } => self.follow(url, summary),
                TraversalState::Done => return Ok(self.finish()),
                TraversalState::Failed { url, error } => return Err(self.fail(&url, error)),
            };
        }
    }

    async fn fetch(&mut self, target: Url) -> TraversalState {
        if self.cancel.is_cancelled() {
            return TraversalState::Failed {
                url: target,
                error: Error::Cancelled,
            };
        }

        if self.pages_fetched >= self.limits.max_pages {
            return TraversalState::Failed {
                url: target,
                error: Error::PageLimitExceeded {
                    max_pages: self.limits.max_pages,
                },
            };
        }

        debug!(url = %target, page = self.pages_fetched + 1, "fetching page");

        let budget = match self.remaining_budget() {
            Ok(budget) => budget,
            Err(error) => return TraversalState::Failed { url: target, error },
        };

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = within_budget(budget, self.fetcher.fetch(&target, &self.correlation_id)) => result,
        };

        match outcome {
            Ok(fetched) => self.arrive(&target, fetched),
            Err(error) => TraversalState::Failed { url: target, error },
        }
    }

    /// Decode a fetched page, keyed by the URL it was served from
    ///
    /// Relative links on the page resolve against that URL. A redirect onto
    /// an already-visited page is a cycle.
    fn arrive(&mut self, requested: &Url, fetched: FetchedPage) -> TraversalState {
        let FetchedPage { url, body } = fetched;

        let key = visit_key(&url);
        if key != visit_key(requested) {
            debug!(requested = %requested, url = %url, "followed redirect");
            if !self.visited.insert(key) {
                return TraversalState::Failed {
                    error: Error::cycle(url.as_str()),
                    url,
                };
            }
        }

        match self.layout.decode(body) {
            Ok(page) => {
                self.pages_fetched += 1;
                TraversalState::Accumulating { url, page }
            }
            Err(error) => TraversalState::Failed { url, error },
        }
    }

    fn accumulate(&mut self, url: Url, page: PageResponse) -> TraversalState {
        let PageResponse { items, next_link } = page;
        let summary = PageSummary::new(next_link, items.len());

        self.accumulator.append(items);
        debug!(
            url = %url,
            page_items = summary.item_count,
            total_items = self.accumulator.len(),
            "page merged"
        );

        TraversalState::Following { url, summary }
    }

    fn follow(&mut self, url: Url, summary: PageSummary) -> TraversalState {
        match self.paginator.next_page(&url, &summary) {
            Ok(NextPage::Done) => TraversalState::Done,
            Ok(NextPage::Continue(next)) => {
                if self.visited.insert(visit_key(&next)) {
                    TraversalState::Fetching { target: next }
                } else {
                    TraversalState::Failed {
                        error: Error::cycle(next.as_str()),
                        url: next,
                    }
                }
            }
            Err(error) => TraversalState::Failed { url, error },
        }
    }

    fn finish(self) -> ResultSet {
        let stats = TraversalStats {
            pages_fetched: self.pages_fetched,
            elapsed: self.started.elapsed(),
        };
        info!(
            pages = stats.pages_fetched,
            items = self.accumulator.len(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "traversal complete"
        );
        ResultSet::new(self.accumulator.into_items(), stats)
    }

    fn fail(self, url: &Url, error: Error) -> TraversalError {
        warn!(
            url = %url,
            pages = self.pages_fetched,
            discarded_items = self.accumulator.len(),
            error = %error,
            "traversal failed"
        );
        TraversalError::new(
            self.correlation_id,
            url.as_str(),
            self.pages_fetched,
            error,
        )
    }

    /// Time left in the elapsed-time budget, if one is set
    fn remaining_budget(&self) -> Result<Option<(Duration, Duration)>> {
        let Some(max) = self.limits.max_elapsed else {
            return Ok(None);
        };

        let remaining = max.saturating_sub(self.started.elapsed());
        if remaining.is_zero() {
            return Err(deadline_exceeded(max));
        }
        Ok(Some((remaining, max)))
    }
}

/// Run `fetch`, failing once the remaining budget runs out
async fn within_budget<F>(budget: Option<(Duration, Duration)>, fetch: F) -> Result<FetchedPage>
where
    F: Future<Output = Result<FetchedPage>>,
{
    match budget {
        Some((remaining, max)) => tokio::time::timeout(remaining, fetch)
            .await
            .unwrap_or_else(|_| Err(deadline_exceeded(max))),
        None => fetch.await,
    }
}

fn deadline_exceeded(max: Duration) -> Error {
    Error::DeadlineExceeded {
        elapsed_ms: max.as_millis() as u64,
    }
}

/// Key used for cycle detection (fragment removed)
fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

#[cfg(test)]
mod tests;
