//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::background::BackgroundTasks;
use crate::application::services::{AuthService, LinkService, RateLimiter};
use crate::domain::repositories::{ApiKeyRepository, LinkRepository};
use crate::infrastructure::cache::CacheService;

/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub auth_service: Arc<AuthService<dyn ApiKeyRepository>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cache: Arc<dyn CacheService>,
    pub background: BackgroundTasks,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for caller addresses.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService<dyn LinkRepository>>,
        auth_service: Arc<AuthService<dyn ApiKeyRepository>>,
        rate_limiter: Arc<RateLimiter>,
        cache: Arc<dyn CacheService>,
        background: BackgroundTasks,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            rate_limiter,
            cache,
            background,
            behind_proxy,
        }
    }
}
