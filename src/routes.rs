//! Top-level router.
//!
//! - `GET    /{code}`           - redirect (rate limited by address)
//! - `GET    /health`           - component health
//! - `GET    /ready`, `/live`   - probes
//! - `/api/*`                   - API, key required (see [`crate::api::routes`])

use crate::api;
use crate::api::handlers::{health_handler, live_handler, ready_handler, redirect_handler};
use crate::api::middleware::{rate_limit, security, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with every route and middleware except the request
/// timeout and path normalisation.
pub fn build_router(state: AppState) -> Router {
    routes(state).layer(tracing::layer())
}

/// The application as served: [`build_router`] bounded by `request_timeout`,
/// with trailing slashes trimmed.
pub fn app_router(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    let router = routes(state)
        .layer(security::timeout(request_timeout))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn routes(state: AppState) -> Router {
    let redirect = Router::new()
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/live", get(live_handler))
        .nest("/api", api::routes::protected_routes(state.clone()))
        .merge(redirect)
        .with_state(state);

    security::harden(router)
}
