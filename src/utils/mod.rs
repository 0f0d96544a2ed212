//! Helpers shared across layers.
//!
//! - [`code_generator`] - short code generation and input validation
//! - [`client_ip`] - caller address resolution for rate limiting
//! - [`db_error`] - PostgreSQL error classification

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
