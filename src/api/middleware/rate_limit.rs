//! Fixed-window rate limiting middleware.
//!
//! Callers with an attached [`AuthenticatedKey`] are counted per key against
//! the key's own budget; everyone else per client address against the global
//! budget. Every limited response carries `X-RateLimit-Limit`,
//! `X-RateLimit-Remaining` and `X-RateLimit-Reset`. When the cache is
//! unavailable the request passes without headers.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::api::middleware::auth::AuthenticatedKey;
use crate::application::services::RateLimitDecision;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

pub const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (identity, budget) = match req.extensions().get::<AuthenticatedKey>() {
        Some(AuthenticatedKey(key)) => (format!("key:{}", key.id), key.budget()),
        None => {
            let peer = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            let ip = client_ip(req.headers(), peer, st.behind_proxy);
            (format!("ip:{ip}"), st.rate_limiter.default_budget())
        }
    };

    let Some(decision) = st.rate_limiter.check(&identity, budget).await else {
        return next.run(req).await;
    };

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        AppError::rate_limited(decision.retry_after).into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(decision.reset_at));
}
