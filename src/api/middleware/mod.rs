//! HTTP middleware: authentication, rate limiting, response hardening and
//! request tracing.

pub mod auth;
pub mod rate_limit;
pub mod security;
pub mod tracing;
