//! Rate limiting middleware using Governor.
//!
//! Implements per-caller rate limiting with a token bucket algorithm. The
//! facade is unauthenticated, so callers are keyed by forwarded address.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};

/// Upper bound on distinct callers tracked at once. The key comes from a
/// client-supplied header, so without a cap the map grows without bound
/// under spoofed addresses.
const MAX_TRACKED_CALLERS: usize = 10_000;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-caller rate limiters
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    /// Default quota for new callers
    quota: Quota,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state.
    ///
    /// # Arguments
    /// * `requests` - Number of requests allowed per period
    /// * `period` - Time period for the quota
    pub fn new(requests: u32, period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .unwrap()
            .allow_burst(NonZeroU32::new(requests).unwrap());

        Self {
            limiters: DashMap::new(),
            quota,
        }
    }

    /// Checks if a request should be rate limited.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        // At capacity, drop all tracked buckets rather than refuse new
        // callers. Resetting quotas is the lesser harm.
        if self.limiters.len() >= MAX_TRACKED_CALLERS && !self.limiters.contains_key(key) {
            self.limiters.clear();
        }

        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)));

        limiter.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_caller_map_stays_bounded() {
        let state = RateLimiterState::new(5, Duration::from_secs(60));

        for i in 0..(MAX_TRACKED_CALLERS + 100) {
            let key = format!("10.{}.{}.{}", i / 65536, (i / 256) % 256, i % 256);
            assert!(state.check(&key), "first request from {key} should pass");
        }

        assert!(state.limiters.len() <= MAX_TRACKED_CALLERS);
    }

    #[test]
    fn test_known_caller_is_not_evicted_below_capacity() {
        let state = RateLimiterState::new(2, Duration::from_secs(60));

        assert!(state.check("198.51.100.7"));
        assert!(state.check("198.51.100.7"));
        // Bucket exhausted; a third request from the same caller is refused
        assert!(!state.check("198.51.100.7"));
        assert!(state.check("198.51.100.8"));
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    // Key by forwarded address; callers behind the same proxy share a bucket
    let key = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    // Check rate limit
    if !limiter.check(&key) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
