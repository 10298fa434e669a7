//! Error types for pagewalk
//!
//! Every fallible operation returns `Result<T, Error>`. A failed traversal is
//! reported to callers as a [`TraversalError`], which wraps the original
//! [`Error`] together with the URL that failed and the correlation id of the
//! call.

use crate::types::CorrelationId;
use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Network Errors
    // ============================================================================
    /// Transport failure reported by reqwest
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request exceeded the per-request timeout
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Non-2xx response with its (truncated) body
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    // ============================================================================
    // Parse Errors
    // ============================================================================
    /// Malformed page shape or navigation link
    #[error("Malformed page: {message}")]
    Parse {
        /// What was wrong
        message: String,
    },

    /// JSON syntax error
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Unparseable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Traversal Errors
    // ============================================================================
    /// Next link points at a page already visited in this traversal
    #[error("Pagination cycle: next link {url} was already visited")]
    Cycle {
        /// The revisited URL
        url: String,
    },

    /// Cancellation token fired
    #[error("Traversal cancelled")]
    Cancelled,

    /// More pages than `max_pages` would be fetched
    #[error("Page limit of {max_pages} pages exceeded")]
    PageLimitExceeded {
        /// Configured page limit
        max_pages: usize,
    },

    /// Elapsed-time budget exhausted
    #[error("Traversal deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded {
        /// Configured budget
        elapsed_ms: u64,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// YAML syntax or shape error in a config file
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Local I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
///
/// Callers use this to tell failure modes apart without matching on
/// transport-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connectivity failure or timeout
    Network,
    /// Non-2xx response
    Http,
    /// Malformed JSON, page shape, or navigation link
    Parse,
    /// Next link pointed at an already-visited page
    Cycle,
    /// Caller aborted the traversal
    Cancelled,
    /// Page count or elapsed-time budget exhausted
    Limit,
    /// Invalid configuration or local I/O failure
    Config,
}

impl Error {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a cycle error
    pub fn cycle(url: impl Into<String>) -> Self {
        Self::Cycle { url: url.into() }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(e) if e.is_decode() => ErrorKind::Parse,
            Error::Network(_) | Error::Timeout { .. } => ErrorKind::Network,
            Error::HttpStatus { .. } => ErrorKind::Http,
            Error::Parse { .. } | Error::JsonParse(_) | Error::InvalidUrl(_) => ErrorKind::Parse,
            Error::Cycle { .. } => ErrorKind::Cycle,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::PageLimitExceeded { .. } | Error::DeadlineExceeded { .. } => ErrorKind::Limit,
            Error::Config { .. } | Error::YamlParse(_) | Error::Io(_) => ErrorKind::Config,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;

/// A failed traversal
///
/// Carries the original error, the URL being fetched or interpreted when it
/// happened, and the correlation id of the `fetch_all` call. Items gathered
/// before the failure are not included.
#[derive(Error, Debug)]
#[error("[{correlation_id}] traversal failed at {url} after {pages_fetched} page(s): {source}")]
pub struct TraversalError {
    /// Correlation id of the failed call
    pub correlation_id: CorrelationId,
    /// URL that was being fetched or followed
    pub url: String,
    /// Pages successfully fetched before the failure
    pub pages_fetched: usize,
    /// The original error
    #[source]
    pub source: Error,
}

impl TraversalError {
    /// Wrap an error with traversal context
    pub fn new(
        correlation_id: CorrelationId,
        url: impl Into<String>,
        pages_fetched: usize,
        source: Error,
    ) -> Self {
        Self {
            correlation_id,
            url: url.into(),
            pages_fetched,
            source,
        }
    }

    /// Classify the underlying error
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Borrow the underlying error
    pub fn error(&self) -> &Error {
        &self.source
    }

    /// Unwrap into the underlying error
    pub fn into_error(self) -> Error {
        self.source
    }
}
