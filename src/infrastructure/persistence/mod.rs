//! PostgreSQL repository implementations.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow`), so the
//! crate builds without a live database.
//!
//! - [`PgLinkRepository`] - short link storage and click counting
//! - [`PgApiKeyRepository`] - API key storage and lookup

pub mod pg_api_key_repository;
pub mod pg_link_repository;

pub use pg_api_key_repository::PgApiKeyRepository;
pub use pg_link_repository::PgLinkRepository;
