// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Request Rate Limiter
 * Token bucket limiter shared across request paths, burst of one
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use nonzero_ext::*;

/// Token bucket limiter gating outbound requests.
///
/// Holds a burst of one so requests are spaced evenly at the configured
/// rate rather than released in clumps. Waits are cancel-safe: dropping
/// the `acquire` future gives the token back to nobody and takes nothing.
pub struct RequestLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    rps: f64,
}

impl RequestLimiter {
    /// Create a limiter allowing `rps` requests per second.
    ///
    /// Fractional rates are supported (`0.5` means one request every two
    /// seconds). Non-positive rates clamp to one request per second.
    pub fn per_second(rps: f64) -> Self {
        let period = if rps > 0.0 {
            Duration::from_secs_f64(1.0 / rps)
        } else {
            Duration::from_secs(1)
        };

        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(nonzero!(1u32)))
            .allow_burst(nonzero!(1u32));

        Self {
            limiter: GovernorRateLimiter::direct(quota),
            rps,
        }
    }

    /// Wait until the next request is allowed.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// The configured rate in requests per second.
    pub fn rate(&self) -> f64 {
        self.rps
    }
}

impl std::fmt::Debug for RequestLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLimiter").field("rps", &self.rps).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = RequestLimiter::per_second(1.0);

        let start = Instant::now();
        limiter.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_acquires_are_spaced_by_rate() {
        let limiter = RequestLimiter::per_second(20.0);

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Two waits at 20 rps is at least ~100ms total.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_non_positive_rate_is_accepted() {
        let limiter = RequestLimiter::per_second(0.0);
        assert_eq!(limiter.rate(), 0.0);
    }
}
