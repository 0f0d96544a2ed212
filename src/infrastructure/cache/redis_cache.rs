//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, link_key};
use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache shared by every instance of the service.
///
/// Uses `ConnectionManager`, which multiplexes one connection and reconnects
/// transparently. Link snapshots are stored as JSON strings.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {e}")))?;

        info!("Connected to Redis");

        Ok(Self { conn: manager })
    }
}

/// Whole seconds for an `EX` argument. Redis rejects zero.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<ShortLink>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(link_key(short_code)).await?;

        match raw {
            Some(json) => {
                debug!(short_code, "Cache hit");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!(short_code, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn set_link(&self, link: &ShortLink, ttl: Duration) -> CacheResult<()> {
        let json = serde_json::to_string(link)?;
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(link_key(&link.short_code), json, ttl_secs(ttl))
            .await?;

        debug!(short_code = %link.short_code, ttl_secs = ttl_secs(ttl), "Cache set");
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(link_key(short_code)).await?;

        if deleted > 0 {
            debug!(short_code, "Cache invalidated");
        }
        Ok(())
    }

    async fn increment_window(&self, key: &str, window: Duration) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(key, 1).await?;

        if count == 1 {
            let secs = i64::try_from(ttl_secs(window)).unwrap_or(i64::MAX);
            conn.expire::<_, ()>(key, secs).await?;
        }

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
