//! Core domain entities.
//!
//! Entities are plain data structures; the rules that operate on them live in
//! [`crate::application::services`]. Creation inputs are separate `New*` structs.
//!
//! - [`ShortLink`] - a short code mapped to a destination URL
//! - [`ApiKey`] - a hashed API credential with its own rate-limit budget

pub mod api_key;
pub mod short_link;

pub use api_key::{ApiKey, NewApiKey};
pub use short_link::{NewShortLink, ShortLink};
