//! Health, readiness and liveness probes.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, ProbeResponse};
use crate::state::AppState;

/// Reports component health.
///
/// # Endpoint
///
/// `GET /health`
///
/// - **200** `healthy`: database and cache reachable
/// - **200** `degraded`: cache unreachable; requests still succeed uncached
/// - **503** `unhealthy`: database unreachable
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": { "database": { "status": "healthy" }, "cache": { "status": "healthy" } }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.link_service.health_check().await {
        Ok(()) => CheckStatus::healthy(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            CheckStatus::unhealthy("Database unreachable")
        }
    };

    let cache = if state.cache.health_check().await {
        CheckStatus::healthy()
    } else {
        CheckStatus::unhealthy("Cache unreachable")
    };

    let (status, code) = match (database.status.as_str(), cache.status.as_str()) {
        ("healthy", "healthy") => ("healthy", StatusCode::OK),
        ("healthy", _) => ("degraded", StatusCode::OK),
        _ => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks { database, cache },
        }),
    )
}

/// `GET /ready`: 200 when the database is reachable, 503 otherwise.
pub async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    match state.link_service.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "ready".to_string(),
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "not_ready".to_string(),
            }),
        ),
    }
}

/// `GET /live`: always 200 while the process serves requests.
pub async fn live_handler() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive".to_string(),
    })
}
