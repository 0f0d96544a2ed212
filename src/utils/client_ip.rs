//! Caller address resolution for address-based rate limiting.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Returns the caller's address as used for rate-limit identity.
///
/// When `behind_proxy` is set the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. These headers are trusted as-is, so the service must only be
/// reachable through a proxy that overwrites them. Falls back to the socket
/// peer, then to `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(ip) = header_ip(headers, X_FORWARDED_FOR, |v| v.split(',').next()) {
            return ip.to_string();
        }
        if let Some(ip) = header_ip(headers, X_REAL_IP, |v| Some(v)) {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_ip(
    headers: &HeaderMap,
    name: &str,
    pick: impl Fn(&str) -> Option<&str>,
) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    pick(value)?.trim().parse().ok()
}
