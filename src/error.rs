//! Application error type and its HTTP mapping.
//!
//! Every fallible operation on the request path returns [`AppError`]. The
//! boundary converts it 1:1 into a status code and a JSON body:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Short link not found", "details": {} } }
//! ```
//!
//! Internal errors never expose their message or details to the caller; they are
//! logged and replaced by a generic body.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    Expired { message: String, details: Value },

    #[error("{message}")]
    RateLimited {
        message: String,
        details: Value,
        retry_after: u64,
    },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn expired(message: impl Into<String>, details: Value) -> Self {
        Self::Expired {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self::RateLimited {
            message: "Rate limit exceeded".to_string(),
            details: json!({ "retry_after": retry_after }),
            retry_after,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Destination URL is not an acceptable http(s) URL.
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::bad_request(
            "Invalid URL format",
            json!({ "reason": "invalid_url", "hint": reason.into() }),
        )
    }

    /// Custom alias fails the format rules.
    pub fn invalid_code(code: &str, reason: impl Into<String>) -> Self {
        Self::bad_request(
            "Invalid short code format",
            json!({ "reason": "invalid_code", "code": code, "hint": reason.into() }),
        )
    }

    pub fn code_taken(code: &str) -> Self {
        Self::conflict(
            "Short code already taken",
            json!({ "reason": "code_taken", "code": code }),
        )
    }

    pub fn generation_exhausted(attempts: usize) -> Self {
        Self::internal(
            "Failed to generate a unique short code",
            json!({ "reason": "generation_exhausted", "attempts": attempts }),
        )
    }

    /// The `details.reason` tag, if any.
    pub fn reason(&self) -> Option<&str> {
        self.details().get("reason").and_then(Value::as_str)
    }

    pub fn details(&self) -> &Value {
        match self {
            Self::Validation { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::Expired { details, .. }
            | Self::RateLimited { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Expired { .. } => StatusCode::GONE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the payload sent to clients.
    ///
    /// Internal errors are redacted.
    pub fn to_error_info(&self) -> ErrorInfo {
        let code = match self {
            Self::Validation { .. } => "invalid_input",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Expired { .. } => "expired",
            Self::RateLimited { .. } => "rate_limited",
            Self::Internal { .. } => "internal_error",
        };

        match self {
            Self::Internal { .. } => ErrorInfo {
                code,
                message: "Internal server error".to_string(),
                details: json!({}),
            },
            other => ErrorInfo {
                code,
                message: other.to_string(),
                details: other.details().clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, details } = &self {
            tracing::error!(%details, "{}", message);
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };
        let mut response = (status, Json(body)).into_response();

        match &self {
            Self::Unauthorized { .. } => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer"),
                );
            }
            Self::RateLimited { retry_after, .. } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after));
            }
            _ => {}
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Invalid request body",
            serde_json::to_value(&errors).unwrap_or_else(|_| json!({})),
        )
    }
}

/// Classifies a database error.
///
/// Unique violations become [`AppError::Conflict`]; everything else is internal.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    AppError::internal("Database error", json!({ "source": e.to_string() }))
}
