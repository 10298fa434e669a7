//! Page fetcher with retry
//!
//! Provides the HTTP side of a traversal:
//! - One GET per page with a bounded timeout and redirect following
//! - Automatic retries driven by a [`RetryPolicy`]
//! - JSON body parsing, with empty bodies read as `null`
//! - Error classification for retry decisions

use super::retry::RetryPolicy;
use crate::config::{HttpConfig, IngestConfig};
use crate::error::{Error, Result};
use crate::types::{CorrelationId, JsonValue};
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Header carrying the correlation id on every page request
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Longest error body kept in an `HttpStatus` error
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Fetches one page of a paginated resource
///
/// Implementations issue a single logical request for `url` and return the
/// parsed JSON body along with the URL it was served from. Retrying is the
/// implementation's business; the caller only sees the final outcome.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and parse the page at `url`
    async fn fetch(&self, url: &Url, correlation_id: &CorrelationId) -> Result<FetchedPage>;
}

/// A fetched page body
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// URL the body was served from, after redirects
    pub url: Url,
    /// Parsed body (`null` for an empty body)
    pub body: JsonValue,
}

impl FetchedPage {
    /// Create a fetched page
    pub fn new(url: Url, body: JsonValue) -> Self {
        Self { url, body }
    }
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpPageFetcher {
    client: Client,
    timeout: Duration,
    headers: HashMap<String, String>,
    retry: RetryPolicy,
}

impl HttpPageFetcher {
    /// Create a fetcher from HTTP settings and a retry policy
    pub fn new(config: &HttpConfig, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: Duration::from_millis(config.timeout_ms),
            headers: config.headers.clone(),
            retry,
        })
    }

    /// Create a fetcher from a full ingest config
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(&config.http, RetryPolicy::from_config(&config.retry))
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry policy in effect
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Issue one request without retrying
    async fn fetch_once(&self, url: &Url, correlation_id: &CorrelationId) -> Result<FetchedPage> {
        let mut req = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .header(CORRELATION_HEADER, correlation_id.as_str());

        for (key, value) in &self.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(
                        url = %final_url,
                        status = status.as_u16(),
                        error = %e,
                        "failed to read error body"
                    );
                    String::new()
                }
            };
            return Err(Error::http_status(
                status.as_u16(),
                body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>(),
            ));
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        if text.trim().is_empty() {
            return Ok(FetchedPage::new(final_url, JsonValue::Null));
        }

        let body = serde_json::from_str(&text)
            .map_err(|e| Error::parse(format!("response body is not valid JSON: {e}")))?;
        Ok(FetchedPage::new(final_url, body))
    }

    fn classify(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            Error::Network(error)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url, correlation_id: &CorrelationId) -> Result<FetchedPage> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(url, correlation_id).await {
                Ok(page) => {
                    if page.url == *url {
                        debug!(correlation_id = %correlation_id, %url, "page fetched");
                    } else {
                        debug!(
                            correlation_id = %correlation_id,
                            %url,
                            final_url = %page.url,
                            "page fetched after redirect"
                        );
                    }
                    return Ok(page);
                }
                Err(err) if self.retry.allows(attempt, &err) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        correlation_id = %correlation_id,
                        %url,
                        error = %err,
                        "page fetch failed, attempt {}/{}, retrying in {:?}",
                        attempt + 1,
                        self.retry.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
