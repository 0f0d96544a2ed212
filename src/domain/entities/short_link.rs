//! Short link entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A short code mapped to a destination URL.
///
/// The same structure is serialized into the cache, so a cached entry carries
/// everything resolution needs, including the expiration instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShortLink {
    pub id: Uuid,
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub api_key_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Returns true if the link has passed its expiration instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Time-to-live for a cache entry of this link.
    ///
    /// The lesser of `default_ttl` and the time remaining until expiration.
    /// Returns `None` when the link is already expired and must not be cached.
    pub fn cache_ttl_at(&self, default_ttl: Duration, now: DateTime<Utc>) -> Option<Duration> {
        match self.expires_at {
            None => Some(default_ttl),
            Some(expires_at) => {
                let remaining = (expires_at - now).to_std().ok()?;
                if remaining.is_zero() {
                    None
                } else {
                    Some(remaining.min(default_ttl))
                }
            }
        }
    }
}

/// Input data for persisting a new short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_code: String,
    pub original_url: String,
    pub api_key_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewShortLink {
    /// Builds the stored record, assigning a fresh identifier.
    pub fn into_link(self, created_at: DateTime<Utc>) -> ShortLink {
        ShortLink {
            id: Uuid::new_v4(),
            short_code: self.short_code,
            original_url: self.original_url,
            clicks: 0,
            api_key_id: self.api_key_id,
            expires_at: self.expires_at,
            created_at,
        }
    }
}
