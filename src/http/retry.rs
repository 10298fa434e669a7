//! Retry policy for page fetches
//!
//! Decides which failures are worth another attempt and how long to wait
//! before it. Parse errors and non-listed 4xx statuses are never retried.

use crate::config::RetryConfig;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;

/// Retry policy applied around a single page fetch
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// HTTP status codes worth retrying
    pub retry_statuses: Vec<u16>,
    /// Whether connection failures and timeouts are retried
    pub retry_network: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Build a policy from its config section
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_type: config.backoff.backoff_type,
            initial_backoff: Duration::from_millis(config.backoff.initial_ms),
            max_backoff: Duration::from_millis(config.backoff.max_ms),
            retry_statuses: config.retry_statuses.clone(),
            retry_network: config.retry_network,
        }
    }

    /// Set max retries
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Set the retryable status codes
    #[must_use]
    pub fn with_retry_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.retry_statuses = statuses;
        self
    }

    /// Whether `error` qualifies for another attempt under this policy
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::Network(e) => self.retry_network && !e.is_decode() && !e.is_builder(),
            Error::Timeout { .. } => self.retry_network,
            Error::HttpStatus { status, .. } => self.retry_statuses.contains(status),
            _ => false,
        }
    }

    /// Whether another attempt is allowed after `attempt` failed attempts
    pub fn allows(&self, attempt: u32, error: &Error) -> bool {
        attempt < self.max_retries && self.should_retry(error)
    }

    /// Calculate backoff delay for a given attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }
}
