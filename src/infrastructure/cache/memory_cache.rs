//! Process-local cache backed by `DashMap`.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Minimum time between two sweeps of expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// In-memory cache with per-entry expiry.
///
/// An expired entry is dropped on the next read of its key. Writes also
/// sweep both maps at most once per [`SWEEP_INTERVAL`], so windows keyed by
/// their index do not accumulate once they close.
/// Counters are not shared between processes, so a single instance must be
/// deployed if this backend is used for rate limiting.
#[derive(Clone, Default)]
pub struct MemoryCache {
    links: Arc<DashMap<String, (ShortLink, Instant)>>,
    counters: Arc<DashMap<String, (u64, Instant)>>,
    next_sweep: Arc<Mutex<Option<Instant>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired links and closed windows if a sweep is due.
    ///
    /// Must not be called while holding a reference into either map.
    fn evict_expired(&self, now: Instant) {
        {
            let Ok(mut next) = self.next_sweep.lock() else {
                return;
            };
            if next.is_some_and(|at| at > now) {
                return;
            }
            *next = Some(now + SWEEP_INTERVAL);
        }

        self.links.retain(|_, (_, deadline)| *deadline > now);
        self.counters.retain(|_, (_, deadline)| *deadline > now);
    }

    /// Number of live link entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.links.iter().filter(|e| e.value().1 > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<ShortLink>> {
        let now = Instant::now();
        if let Some(entry) = self.links.get(short_code) {
            if entry.1 > now {
                return Ok(Some(entry.0.clone()));
            }
        }
        self.links.remove_if(short_code, |_, (_, deadline)| *deadline <= now);
        Ok(None)
    }

    async fn set_link(&self, link: &ShortLink, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        self.evict_expired(now);
        self.links
            .insert(link.short_code.clone(), (link.clone(), now + ttl));
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.links.remove(short_code);
        Ok(())
    }

    async fn increment_window(&self, key: &str, window: Duration) -> CacheResult<u64> {
        let now = Instant::now();
        self.evict_expired(now);
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert((0, now + window));

        if entry.1 <= now {
            *entry = (0, now + window);
        }
        entry.0 += 1;

        Ok(entry.0)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewShortLink;
    use chrono::Utc;

    fn link(code: &str) -> ShortLink {
        NewShortLink {
            short_code: code.to_string(),
            original_url: "https://example.com/page".to_string(),
            api_key_id: None,
            expires_at: None,
        }
        .into_link(Utc::now())
    }

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let cache = MemoryCache::new();
        let link = link("abc123");

        cache.set_link(&link, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get_link("abc123").await.unwrap(), Some(link));

        cache.invalidate("abc123").await.unwrap();
        assert_eq!(cache.get_link("abc123").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let cache = MemoryCache::new();
        cache
            .set_link(&link("abc123"), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.get_link("abc123").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_resets_after_window() {
        let cache = MemoryCache::new();
        let window = Duration::from_secs(60);

        assert_eq!(cache.increment_window("k", window).await.unwrap(), 1);
        assert_eq!(cache.increment_window("k", window).await.unwrap(), 2);
        assert_eq!(cache.increment_window("other", window).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(cache.increment_window("k", window).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_windows_are_dropped() {
        let cache = MemoryCache::new();
        let window = Duration::from_secs(60);

        for index in 0..1000 {
            let key = format!("ratelimit:203.0.113.7:{index}");
            assert_eq!(cache.increment_window(&key, window).await.unwrap(), 1);
            tokio::time::advance(window).await;
        }

        assert!(cache.counters.len() < 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_links_dropped_without_reads() {
        let cache = MemoryCache::new();

        for n in 0..500 {
            cache
                .set_link(&link(&format!("code{n:04}")), Duration::from_secs(10))
                .await
                .unwrap();
            tokio::time::advance(Duration::from_secs(11)).await;
        }

        assert!(cache.links.len() < 10);
    }
}
