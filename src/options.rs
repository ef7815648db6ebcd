// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Query Options
 * Defaults record with chainable setters for the aggregation engine
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::collections::HashMap;
use std::time::Duration;

use crate::sources::Source;
use crate::VERSION;

/// Per-source deadline applied when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single query.
///
/// Starts from sensible defaults; chain `with_*` setters to override.
/// Setters are last-writer-wins per field, so appending an option
/// overrides whatever an earlier one (or a convenience wrapper) chose.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Sources to query. `None` means every registered source.
    pub(crate) sources: Option<Vec<Source>>,

    /// Caller-supplied base HTTP client; `None` builds the default
    /// transport.
    pub(crate) http_client: Option<reqwest::Client>,

    /// How many sources run concurrently. 1 means sequential.
    pub(crate) parallelism: usize,

    /// Requests per second across all sources. 0 means unlimited.
    pub(crate) global_rate_limit: f64,

    /// Per-source request rates, keyed by source name.
    pub(crate) source_rate_limits: HashMap<String, f64>,

    /// Per-source deadline.
    pub(crate) timeout: Duration,

    /// User-Agent header sent with every request.
    pub(crate) user_agent: String,

    /// API keys, keyed by source name. Optional keys improve rate limits
    /// for some sources and unlock others entirely.
    pub(crate) api_keys: HashMap<String, String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sources: None,
            http_client: None,
            parallelism: num_cpus::get() * 2,
            global_rate_limit: 0.0,
            source_rate_limits: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("Mozilla/5.0 (compatible; scout-v{})", VERSION),
            api_keys: HashMap::new(),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sources to query.
    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Override the base HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set how many sources run concurrently. Clamped to at least 1.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Cap requests per second across all sources.
    pub fn with_global_rate_limit(mut self, rps: f64) -> Self {
        self.global_rate_limit = rps;
        self
    }

    /// Cap requests per second for one source.
    pub fn with_source_rate_limit(mut self, source: impl Into<String>, rps: f64) -> Self {
        self.source_rate_limits.insert(source.into(), rps);
        self
    }

    /// Set the per-source deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Attach an API key for one source.
    pub fn with_api_key(mut self, source: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_keys.insert(source.into(), key.into());
        self
    }
}
