//! Short code generation and validation of user input.
//!
//! Generated codes draw from a fixed 62-character alphabet using the operating
//! system's CSPRNG. Custom aliases and destination URLs are validated here
//! before anything touches the store.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use url::Url;

/// Digits, then uppercase, then lowercase.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const MIN_URL_LENGTH: usize = 10;
pub const MAX_URL_LENGTH: usize = 2083;

pub const MIN_ALIAS_LENGTH: usize = 3;
pub const MAX_ALIAS_LENGTH: usize = 16;

/// Aliases that would shadow a route.
pub const RESERVED_CODES: &[&str] = &["api", "health", "ready", "live"];

static ALIAS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]{3,16}$").unwrap());

/// Generates a random short code of `length` characters.
///
/// Each random byte is mapped onto [`ALPHABET`] modulo 62. The slight bias
/// towards the first eight characters is accepted.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails.
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut buffer = vec![0u8; length];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Random source unavailable",
            json!({ "source": e.to_string() }),
        )
    })?;

    Ok(buffer
        .iter()
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect())
}

/// Validates a destination URL.
///
/// The URL must begin with `http://` or `https://`, be between
/// [`MIN_URL_LENGTH`] and [`MAX_URL_LENGTH`] characters and name a host.
pub fn validate_url(raw: &str) -> Result<(), AppError> {
    let len = raw.chars().count();
    if !(MIN_URL_LENGTH..=MAX_URL_LENGTH).contains(&len) {
        return Err(AppError::invalid_url(format!(
            "URL must be {MIN_URL_LENGTH}-{MAX_URL_LENGTH} characters"
        )));
    }

    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(AppError::invalid_url(
            "URL must start with http:// or https://",
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| AppError::invalid_url(e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_url("URL must include a host"));
    }

    Ok(())
}

/// Normalizes and validates a custom alias.
///
/// The alias is lower-cased, then must be 3-16 ASCII letters or digits and not
/// one of [`RESERVED_CODES`]. Returns the normalized alias.
pub fn validate_custom_alias(alias: &str) -> Result<String, AppError> {
    let normalized = alias.to_lowercase();

    if !ALIAS_PATTERN.is_match(&normalized) {
        return Err(AppError::invalid_code(
            alias,
            format!(
                "Alias must be {MIN_ALIAS_LENGTH}-{MAX_ALIAS_LENGTH} alphanumeric characters"
            ),
        ));
    }

    if RESERVED_CODES.contains(&normalized.as_str()) {
        return Err(AppError::invalid_code(alias, "Alias is reserved"));
    }

    Ok(normalized)
}

/// Cheap shape check applied to path parameters before any lookup.
pub fn is_plausible_code(code: &str) -> bool {
    (1..=MAX_ALIAS_LENGTH).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
