//! Handler for the shorten endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use std::time::Duration;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::auth::AuthenticatedKey;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the calling API key.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// ```json
/// { "url": "https://example.com/a/very/long/path", "custom_alias": "promo", "expires_in": 3600 }
/// ```
///
/// # Errors
///
/// - 400 for a malformed body, URL or alias
/// - 409 if the alias is taken
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    // A blank alias means "generate one".
    let alias = payload
        .custom_alias
        .as_deref()
        .filter(|alias| !alias.trim().is_empty());

    let issued = state
        .link_service
        .issue(
            &payload.url,
            alias,
            payload.expires_in.map(Duration::from_secs),
            Some(key.id),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_code: issued.short_code,
            short_url: issued.short_url,
            expires_at: issued.expires_at,
        }),
    ))
}
