//! Domain layer: entities and repository contracts.
//!
//! The domain layer has no dependency on HTTP, Redis or PostgreSQL. Business
//! rules live in [`crate::application::services`]; storage implementations in
//! [`crate::infrastructure`].
//!
//! - [`entities`] - short links and API keys
//! - [`repositories`] - data access traits

pub mod entities;
pub mod repositories;
