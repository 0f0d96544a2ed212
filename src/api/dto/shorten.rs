//! DTOs for the shorten endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ten years, in seconds.
const MAX_EXPIRES_IN: u64 = 315_360_000;

/// Request to create a short link.
///
/// URL and alias rules are enforced by the link service so that their
/// failures carry the `invalid_url` / `invalid_code` reasons.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    pub url: String,

    pub custom_alias: Option<String>,

    /// Lifetime in seconds from now.
    #[validate(range(min = 1, max = MAX_EXPIRES_IN))]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_in_must_be_positive() {
        let req: ShortenRequest =
            serde_json::from_str(r#"{"url":"https://example.com","expires_in":0}"#).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let req: ShortenRequest = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();

        assert!(req.validate().is_ok());
        assert!(req.custom_alias.is_none());
        assert!(req.expires_in.is_none());
    }

    #[test]
    fn test_response_omits_missing_expiry() {
        let json = serde_json::to_value(ShortenResponse {
            short_code: "abc".to_string(),
            short_url: "http://localhost:8080/abc".to_string(),
            expires_at: None,
        })
        .unwrap();

        assert!(json.get("expires_at").is_none());
    }
}
