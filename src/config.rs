//! Configuration for a pagewalk run
//!
//! All settings live in one [`IngestConfig`] that can be loaded from YAML.
//! Every field has a default, so an empty document is a valid config.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration for fetching a paginated resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry policy for page fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Shape of each page response
    #[serde(default)]
    pub page: PageConfig,

    /// Bounds on a single traversal
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl IngestConfig {
    /// Load a config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document, treat it as all defaults
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Render the config as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_ms == 0 {
            return Err(Error::config("http.timeout_ms must be greater than zero"));
        }

        if self.http.max_redirects > MAX_REDIRECT_LIMIT {
            return Err(Error::config(format!(
                "http.max_redirects cannot exceed {MAX_REDIRECT_LIMIT}"
            )));
        }

        if self.limits.max_pages == 0 {
            return Err(Error::config("limits.max_pages must be greater than zero"));
        }

        if self.retry.backoff.max_ms < self.retry.backoff.initial_ms {
            return Err(Error::config(
                "retry.backoff.max_ms must not be smaller than retry.backoff.initial_ms",
            ));
        }

        match &self.page.pagination {
            PaginationConfigDef::NextLink { path, .. } if path.trim().is_empty() => {
                Err(Error::config("page.pagination.path cannot be empty"))
            }
            PaginationConfigDef::PageNumber { param, .. } if param.trim().is_empty() => {
                Err(Error::config("page.pagination.param cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry configuration
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the JSON path of the item list
    #[must_use]
    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.page.items_path = path.into();
        self
    }

    /// Set the pagination mode
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfigDef) -> Self {
        self.page.pagination = pagination;
        self
    }

    /// Set the maximum number of pages per traversal
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.limits.max_pages = max_pages;
        self
    }

    /// Set the total elapsed-time budget per traversal
    #[must_use]
    pub fn with_max_elapsed_ms(mut self, max_elapsed_ms: u64) -> Self {
        self.limits.max_elapsed_ms = Some(max_elapsed_ms);
        self
    }
}

const MAX_REDIRECT_LIMIT: usize = 50;

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            headers: HashMap::new(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("pagewalk/{}", env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Retry Config
// ============================================================================

/// Retry configuration for a single page fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// HTTP status codes to retry on
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,

    /// Whether connection failures and timeouts are retried
    #[serde(default = "default_true")]
    pub retry_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            retry_statuses: default_retry_statuses(),
            retry_network: default_true(),
        }
    }
}

impl RetryConfig {
    /// A config that never retries
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

fn default_true() -> bool {
    true
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    30_000
}

// ============================================================================
// Page Config
// ============================================================================

/// Where items and navigation live in a page response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Dotted path to the item array (empty = the body itself)
    #[serde(default = "default_items_path")]
    pub items_path: String,

    /// How the next page is found
    #[serde(default)]
    pub pagination: PaginationConfigDef,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            items_path: default_items_path(),
            pagination: PaginationConfigDef::default(),
        }
    }
}

fn default_items_path() -> String {
    "items".to_string()
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfigDef {
    /// Follow a next-page URL embedded in the response body
    NextLink {
        /// Dotted path to the next URL
        #[serde(default = "default_next_path")]
        path: String,
        /// Link values that mean "no more pages"
        #[serde(default)]
        end_markers: Vec<String>,
        /// Resolve relative links against the URL the page was served from
        #[serde(default = "default_true")]
        resolve_relative: bool,
    },

    /// Increment a page-number query parameter until an empty page
    PageNumber {
        /// Query parameter carrying the page number
        #[serde(default = "default_page_param")]
        param: String,
        /// Number of the first page
        #[serde(default = "default_start_page")]
        start_page: u32,
    },
}

impl Default for PaginationConfigDef {
    fn default() -> Self {
        Self::next_link(default_next_path())
    }
}

impl PaginationConfigDef {
    /// Next-link pagination reading the URL from `path`
    pub fn next_link(path: impl Into<String>) -> Self {
        Self::NextLink {
            path: path.into(),
            end_markers: Vec::new(),
            resolve_relative: true,
        }
    }

    /// Page-number pagination on the `page` query parameter
    pub fn page_number(param: impl Into<String>, start_page: u32) -> Self {
        Self::PageNumber {
            param: param.into(),
            start_page,
        }
    }
}

fn default_next_path() -> String {
    "links.next".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    1
}

// ============================================================================
// Limits Config
// ============================================================================

/// Bounds on a single traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum pages fetched per traversal
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Total elapsed-time budget in milliseconds (unbounded when absent)
    #[serde(default)]
    pub max_elapsed_ms: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_elapsed_ms: None,
        }
    }
}

fn default_max_pages() -> usize {
    1000
}
