//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable store of short links.
///
/// Short codes are unique across all links. Implementations must enforce this
/// atomically at insert time; the existence check performed before insert is
/// only an optimisation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] with reason `code_taken` if the short code
    /// already exists. Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by short code, regardless of expiry.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Returns true if a link with this code exists.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically increments the click counter.
    ///
    /// Returns `false` if no such link exists.
    async fn increment_clicks(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes a link. Returns `false` if no such link exists.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes every link whose expiration instant is before `now`.
    ///
    /// Returns the number of deleted rows.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Verifies that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
