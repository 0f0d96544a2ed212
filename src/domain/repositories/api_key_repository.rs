//! Repository trait for API key storage.

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Store of hashed API keys.
///
/// Raw keys never reach this layer; every lookup is by SHA-256 hex digest.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgApiKeyRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Finds an active key by the hash of its secret.
    ///
    /// Deactivated keys are treated as absent.
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// Sets `last_used_at` to the current time.
    async fn update_last_used(&self, id: Uuid) -> Result<(), AppError>;

    /// Stores a new key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a key with the same hash exists.
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Lists all keys, newest first.
    async fn list(&self) -> Result<Vec<ApiKey>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError>;

    /// Marks a key inactive. Returns `false` if no such key exists.
    async fn deactivate(&self, id: Uuid) -> Result<bool, AppError>;
}
