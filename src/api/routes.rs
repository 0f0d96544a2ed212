//! API route configuration.

use crate::api::handlers::{delete_link_handler, shorten_handler, stats_handler};
use crate::api::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Routes under `/api`, all requiring an API key.
///
/// - `POST   /shorten`       - create a short link
/// - `GET    /stats/{code}`  - link statistics
/// - `DELETE /{code}`        - delete a link
///
/// Middleware runs outermost first: optional key attachment, rate limiting,
/// then the key requirement. Rejected keys are thus counted against the
/// caller's address.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{code}", get(stats_handler))
        .route("/{code}", delete(delete_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_layer,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::optional_layer))
}
