//! REST API layer.
//!
//! - [`dto`] - request/response bodies
//! - [`handlers`] - HTTP handlers
//! - [`middleware`] - authentication, rate limiting, tracing
//! - [`routes`] - `/api` route composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
