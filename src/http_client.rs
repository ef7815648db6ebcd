// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Client Composition
 * Layered request path: user-agent, global rate limit, per-source rate limit
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::redirect;
use tracing::debug;

use crate::rate_limiter::RequestLimiter;

/// Timeout applied to the default base transport.
const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// The client handed to source adapters.
///
/// Wraps a base `reqwest::Client` with the layers the engine configures:
/// an optional `User-Agent` header, an optional global rate limiter shared
/// by every source, and an optional per-source rate limiter. The base
/// transport is never mutated; layering clones the handle and fills in
/// another field, so the engine can derive a per-source client from the
/// shared one without affecting its siblings.
///
/// Request gating acquires the per-source token before the global one, so
/// a request never sits on a scarce global token while waiting for its
/// source's own allowance.
#[derive(Clone)]
pub struct SourceClient {
    inner: reqwest::Client,
    user_agent: Option<String>,
    global_limit: Option<Arc<RequestLimiter>>,
    source_limit: Option<Arc<RequestLimiter>>,
}

impl SourceClient {
    /// Wrap a base transport with no layers attached.
    pub fn new(inner: reqwest::Client) -> Self {
        Self {
            inner,
            user_agent: None,
            global_limit: None,
            source_limit: None,
        }
    }

    /// The default base transport: 30 second timeout, redirects rejected.
    ///
    /// Redirects fail the request outright so an adapter can never be
    /// silently bounced to a host it did not ask for. Callers wanting a
    /// different policy supply their own client through the options.
    ///
    /// The builder only fails when the TLS backend cannot initialize,
    /// which is not a recoverable condition; this mirrors the contract of
    /// `reqwest::Client::new`.
    pub fn default_transport() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(DEFAULT_TRANSPORT_TIMEOUT)
            .redirect(redirect::Policy::custom(|attempt| {
                attempt.error("redirects not allowed")
            }))
            .build()
            .expect("default HTTP transport")
    }

    /// Attach a `User-Agent` header to every request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Attach the cross-source rate limiter.
    pub fn with_global_limit(mut self, limiter: Arc<RequestLimiter>) -> Self {
        self.global_limit = Some(limiter);
        self
    }

    /// Attach a rate limiter for one source, on top of the global layer.
    pub fn with_source_limit(mut self, limiter: Arc<RequestLimiter>) -> Self {
        self.source_limit = Some(limiter);
        self
    }

    /// Start a GET request against the base transport.
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.get(url)
    }

    /// Start a POST request against the base transport.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.post(url)
    }

    /// Send a request through the configured layers.
    ///
    /// Waits on the per-source limiter, then the global limiter, then sets
    /// the configured `User-Agent` and forwards to the transport. The
    /// transport's timeout, cookie, and redirect behavior pass through
    /// untouched.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> reqwest::Result<reqwest::Response> {
        if let Some(limiter) = &self.source_limit {
            limiter.acquire().await;
        }
        if let Some(limiter) = &self.global_limit {
            limiter.acquire().await;
        }

        let request = match &self.user_agent {
            Some(user_agent) => request.header(USER_AGENT, user_agent.as_str()),
            None => request,
        };

        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "request completed");
        Ok(response)
    }
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient")
            .field("user_agent", &self.user_agent)
            .field("global_limit", &self.global_limit)
            .field("source_limit", &self.source_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layering_leaves_base_untouched() {
        let base = SourceClient::new(SourceClient::default_transport());
        let layered = base
            .clone()
            .with_user_agent("scout/test")
            .with_source_limit(Arc::new(RequestLimiter::per_second(5.0)));

        assert!(base.user_agent.is_none());
        assert!(base.source_limit.is_none());
        assert_eq!(layered.user_agent.as_deref(), Some("scout/test"));
        assert!(layered.source_limit.is_some());
    }

    #[test]
    fn test_per_source_layer_composes_on_global() {
        let client = SourceClient::new(SourceClient::default_transport())
            .with_global_limit(Arc::new(RequestLimiter::per_second(10.0)))
            .with_source_limit(Arc::new(RequestLimiter::per_second(2.0)));

        assert!(client.global_limit.is_some());
        assert!(client.source_limit.is_some());
    }
}
