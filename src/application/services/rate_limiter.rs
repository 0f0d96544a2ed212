//! Fixed-window rate limiter over the shared cache.
//!
//! Windows are aligned to the Unix epoch: with a 60 second window every
//! calendar minute is its own bucket, keyed `ratelimit:{identity}:{index}`.
//! A caller can therefore send up to twice its budget across a window
//! boundary. Counters live in the shared cache so every instance of the
//! service sees the same totals.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::infrastructure::cache::{CacheError, CacheService};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    /// Requests counted in the current window, including this one.
    pub count: u64,
    pub remaining: u64,
    /// Epoch seconds at which the current window ends.
    pub reset_at: i64,
    /// Seconds until `reset_at`, at least 1.
    pub retry_after: u64,
}

pub struct RateLimiter {
    cache: Arc<dyn CacheService>,
    window: Duration,
    default_budget: u32,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheService>, window: Duration, default_budget: u32) -> Self {
        Self {
            cache,
            window: window.max(Duration::from_secs(1)),
            default_budget: default_budget.max(1),
            timeout: Duration::from_millis(500),
        }
    }

    /// Bound on how long a counter increment may take before failing open.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Budget applied to unauthenticated callers.
    pub fn default_budget(&self) -> u32 {
        self.default_budget
    }

    /// Counts one request for `identity` against `budget`.
    ///
    /// Returns `None` when the cache is unavailable; the caller must then let
    /// the request through.
    pub async fn check(&self, identity: &str, budget: u32) -> Option<RateLimitDecision> {
        self.check_at(identity, budget, Utc::now()).await
    }

    pub async fn check_at(
        &self,
        identity: &str,
        budget: u32,
        now: DateTime<Utc>,
    ) -> Option<RateLimitDecision> {
        let window_secs = self.window.as_secs() as i64;
        let index = now.timestamp().div_euclid(window_secs);
        let key = format!("ratelimit:{identity}:{index}");

        let count = match tokio::time::timeout(
            self.timeout,
            self.cache.increment_window(&key, self.window),
        )
        .await
        {
            Ok(Ok(count)) => count,
            Ok(Err(CacheError::Disabled)) => {
                debug!("Rate limiting skipped, cache disabled");
                metrics::counter!("rate_limit_fail_open_total").increment(1);
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Rate limiter failing open");
                metrics::counter!("rate_limit_fail_open_total").increment(1);
                return None;
            }
            Err(_) => {
                warn!("Rate limiter failing open, cache timed out");
                metrics::counter!("rate_limit_fail_open_total").increment(1);
                return None;
            }
        };

        let budget = budget.max(1);
        let reset_at = (index + 1) * window_secs;
        let decision = RateLimitDecision {
            allowed: count <= u64::from(budget),
            limit: budget,
            count,
            remaining: u64::from(budget).saturating_sub(count),
            reset_at,
            retry_after: (reset_at - now.timestamp()).max(1) as u64,
        };

        if !decision.allowed {
            metrics::counter!("rate_limit_rejections_total").increment(1);
            debug!(identity, count, budget, "Rate limit exceeded");
        }

        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::{MemoryCache, MockCacheService, NullCache};
    use chrono::TimeZone;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(MemoryCache::new()), Duration::from_secs(60), 60)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_budget_exhausted_on_sixth_request() {
        let limiter = limiter();
        let now = at(1_700_000_010);

        for i in 1..=5 {
            let d = limiter.check_at("10.0.0.1", 5, now).await.unwrap();
            assert!(d.allowed, "request {i}");
            assert_eq!(d.remaining, 5 - i);
        }

        let d = limiter.check_at("10.0.0.1", 5, now).await.unwrap();
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.count, 6);
    }

    #[tokio::test]
    async fn test_other_identity_unaffected() {
        let limiter = limiter();
        let now = at(1_700_000_010);

        for _ in 0..6 {
            limiter.check_at("10.0.0.1", 5, now).await;
        }

        let d = limiter.check_at("10.0.0.2", 5, now).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 4);
    }

    #[tokio::test]
    async fn test_next_window_starts_fresh() {
        let limiter = limiter();

        for _ in 0..6 {
            limiter.check_at("k", 5, at(1_700_000_039)).await;
        }

        let d = limiter.check_at("k", 5, at(1_700_000_040)).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.count, 1);
    }

    #[tokio::test]
    async fn test_reset_is_window_end() {
        let limiter = limiter();
        // 1_699_999_980 is a multiple of 60.
        let d = limiter.check_at("k", 5, at(1_699_999_995)).await.unwrap();

        assert_eq!(d.reset_at, 1_700_000_040);
        assert_eq!(d.retry_after, 45);
        assert_eq!(d.limit, 5);
    }

    #[tokio::test]
    async fn test_window_key_format() {
        let mut cache = MockCacheService::new();
        cache
            .expect_increment_window()
            .withf(|key, window| {
                key == "ratelimit:key-1:28333333" && *window == Duration::from_secs(60)
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let limiter = RateLimiter::new(Arc::new(cache), Duration::from_secs(60), 60);
        let d = limiter.check_at("key-1", 10, at(1_700_000_000)).await.unwrap();

        assert!(d.allowed);
    }

    #[tokio::test]
    async fn test_fails_open_when_cache_disabled() {
        let limiter = RateLimiter::new(Arc::new(NullCache::new()), Duration::from_secs(60), 1);

        for _ in 0..10 {
            assert!(limiter.check("10.0.0.1", 1).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_fails_open_on_cache_error() {
        let mut cache = MockCacheService::new();
        cache
            .expect_increment_window()
            .returning(|_, _| Err(CacheError::Connection("refused".into())));

        let limiter = RateLimiter::new(Arc::new(cache), Duration::from_secs(60), 1);

        assert!(limiter.check("10.0.0.1", 1).await.is_none());
    }
}
