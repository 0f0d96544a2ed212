//! Application layer: business rules and background work.
//!
//! - [`services::LinkService`] - code issuance, resolution, stats, deletion
//! - [`services::AuthService`] - API key authentication and provisioning
//! - [`services::RateLimiter`] - fixed-window request budgets
//! - [`background::BackgroundTasks`] - fire-and-forget dispatcher
//! - [`expiry_sweeper`] - periodic purge of expired links

pub mod background;
pub mod expiry_sweeper;
pub mod services;
