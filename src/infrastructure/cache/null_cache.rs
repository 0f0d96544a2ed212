//! No-op cache used when Redis is unavailable.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache that stores nothing.
///
/// Lookups always miss, so resolution goes straight to the database. Counter
/// increments report [`CacheError::Disabled`], which makes the rate limiter
/// fail open.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _short_code: &str) -> CacheResult<Option<ShortLink>> {
        Ok(None)
    }

    async fn set_link(&self, _link: &ShortLink, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn increment_window(&self, _key: &str, _window: Duration) -> CacheResult<u64> {
        Err(CacheError::Disabled)
    }

    async fn health_check(&self) -> bool {
        false
    }
}
