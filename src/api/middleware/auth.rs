//! API key authentication middleware.
//!
//! Keys are read from the `X-API-Key` header, or failing that from
//! `Authorization: Bearer <key>`. Query parameters are never consulted.
//!
//! Two layers are provided so the rate limiter can sit between them:
//! [`optional_layer`] attaches an [`AuthenticatedKey`] when a valid key is
//! presented and otherwise lets the request through; [`require_layer`]
//! rejects requests that still carry no valid key.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::entities::ApiKey;
use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The validated key of the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedKey(pub ApiKey);

/// Marks a request whose presented key was already looked up and refused.
#[derive(Debug, Clone, Copy)]
struct RejectedKey;

fn rejected() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({ "reason": "Invalid or inactive API key" }),
    )
}

/// Returns the raw key presented by the caller, if any.
async fn presented_key(parts: &mut Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(API_KEY_HEADER)
        && let Ok(key) = value.to_str()
        && !key.trim().is_empty()
    {
        return Some(key.trim().to_string());
    }

    AuthBearer::from_request_parts(parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token)
        .filter(|token| !token.trim().is_empty())
}

/// Attaches the caller's key when one is presented and valid.
///
/// Invalid keys and lookup failures are ignored here; the request continues
/// anonymously and is rate limited by address.
pub async fn optional_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    if let Some(raw) = presented_key(&mut parts).await {
        match st.auth_service.authenticate(&raw).await {
            Ok(key) => {
                tracing::debug!(key_name = %key.name, key_id = %key.id, "API key accepted");
                parts.extensions.insert(AuthenticatedKey(key));
            }
            Err(AppError::Unauthorized { .. }) => {
                tracing::debug!("Presented API key rejected");
                parts.extensions.insert(RejectedKey);
            }
            Err(e) => {
                tracing::warn!(error = %e, "API key lookup failed");
            }
        }
    }

    next.run(Request::from_parts(parts, body)).await
}

/// Rejects requests without a valid key.
///
/// Reuses the outcome recorded by [`optional_layer`], so a presented key is
/// looked up at most once per request whether it was accepted or refused.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` when no key is
/// presented or the key is unknown or inactive.
pub async fn require_layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.extensions().get::<AuthenticatedKey>().is_some() {
        return Ok(next.run(req).await);
    }
    if req.extensions().get::<RejectedKey>().is_some() {
        return Err(rejected());
    }

    let (mut parts, body) = req.into_parts();

    let raw = presented_key(&mut parts).await.ok_or_else(|| {
        AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "API key is missing" }),
        )
    })?;

    let key = st.auth_service.authenticate(&raw).await?;
    parts.extensions.insert(AuthenticatedKey(key));

    Ok(next.run(Request::from_parts(parts, body)).await)
}
