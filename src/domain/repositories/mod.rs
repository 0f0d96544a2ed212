//! Repository trait definitions for the domain layer.
//!
//! These traits abstract persistence so services can be exercised against
//! mocks (`mockall`) or the in-memory implementations used by the HTTP tests.
//! PostgreSQL implementations live in `crate::infrastructure::persistence`.
//!
//! - [`LinkRepository`] - short link storage, click counting, expiry sweeps
//! - [`ApiKeyRepository`] - API key lookup and provisioning

pub mod api_key_repository;
pub mod link_repository;

pub use api_key_repository::ApiKeyRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
