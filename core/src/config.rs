//! Client configuration: base URL, timeout, retry policy, cache windows.

use std::time::Duration;

use crate::error::ApiError;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "TAXONOMY_API_URL";

/// Retry policy for read requests.
///
/// Mutations are never retried (a duplicate POST is worse than a surfaced
/// error), and 4xx responses are never retried regardless of this policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Configuration for [`TaxonomyClient`](crate::TaxonomyClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without the `/api` prefix or a trailing
    /// slash (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for reads.
    pub retry: RetryPolicy,
    /// Window during which a cached entry is served without refetching.
    pub stale_time: Duration,
    /// Window after which a cached entry is evicted entirely.
    pub cache_time: Duration,
    /// Page size used by the full-aggregation list loop. The server caps
    /// `limit` at 100.
    pub max_page_size: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            stale_time: Duration::from_secs(5 * 60),
            cache_time: Duration::from_secs(10 * 60),
            max_page_size: 100,
        }
    }

    /// Build a config from the `TAXONOMY_API_URL` environment variable.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| ApiError::Config(format!("{BASE_URL_ENV} is not set")))?;
        Ok(Self::new(base_url))
    }
}
