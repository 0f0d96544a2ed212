//! API key entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An API credential.
///
/// Only the SHA-256 hash of the secret is stored. Keys are deactivated rather
/// than deleted so that links keep a reference to their creator.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub key_hash: String,
    pub name: String,
    /// Requests per rate-limit window allowed for this key.
    pub rate_limit: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Budget as used by the rate limiter. Non-positive values never occur in
    /// storage (check constraint) but are clamped to 1 regardless.
    pub fn budget(&self) -> u32 {
        u32::try_from(self.rate_limit).unwrap_or(0).max(1)
    }
}

/// Input data for provisioning a new key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub key_hash: String,
    pub name: String,
    pub rate_limit: i32,
}
