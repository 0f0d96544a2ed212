//! Cache service trait and error types.

use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
///
/// Callers never surface these to clients: link lookups degrade to the
/// database and the rate limiter fails open.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache operation error: {0}")]
    Operation(String),

    #[error("Cache entry could not be decoded: {0}")]
    Serialization(String),

    #[error("Cache is disabled")]
    Disabled,
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            Self::Connection(e.to_string())
        } else {
            Self::Operation(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache key holding the snapshot of a link.
pub fn link_key(short_code: &str) -> String {
    format!("url:{short_code}")
}

/// Shared cache used by the resolution engine and the rate limiter.
///
/// Implementations report failures instead of hiding them; the services
/// decide how to degrade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached snapshot of a link.
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<ShortLink>>;

    /// Stores a link snapshot for `ttl`.
    async fn set_link(&self, link: &ShortLink, ttl: Duration) -> CacheResult<()>;

    /// Removes a cached link.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Atomically increments the counter at `key` and returns the new value.
    ///
    /// When the counter is created by this call it is given an expiry of
    /// `window`, so stale windows disappear on their own.
    async fn increment_window(&self, key: &str, window: Duration) -> CacheResult<u64>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
