//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::ShortenedLink;

/// Custom aliases share the generated-code alphabet.
static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("alias regex is valid"));

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    pub url: String,

    /// Optional caller-chosen short code.
    #[validate(length(min = 4, max = 12, message = "Alias must be 4-12 characters"))]
    #[validate(regex(path = "*CUSTOM_ALIAS_REGEX", message = "Alias may only contain [0-9A-Za-z]"))]
    pub custom_alias: Option<String>,

    /// Lifetime in days; `0` or absent falls back to the service default.
    #[validate(range(max = 3650, message = "Expiry must be at most 3650 days"))]
    pub expiry_days: Option<u32>,
}

/// Response body for a created (or reused) short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ShortenedLink> for ShortenResponse {
    fn from(shortened: ShortenedLink) -> Self {
        Self {
            short_code: shortened.link.code,
            short_url: shortened.short_url,
            original_url: shortened.link.target,
            created_at: shortened.link.created_at,
            expires_at: shortened.link.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, alias: Option<&str>) -> ShortenRequest {
        ShortenRequest {
            url: url.to_string(),
            custom_alias: alias.map(str::to_string),
            expiry_days: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("https://example.com/a", Some("Promo2025")).validate().is_ok());
        assert!(request("https://example.com/a", None).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_alias() {
        assert!(request("https://example.com", Some("abc")).validate().is_err());
        assert!(request("https://example.com", Some("has-dash")).validate().is_err());
        assert!(
            request("https://example.com", Some("thirteenchars"))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_overlong_or_malformed_url() {
        let long = format!("https://example.com/{}", "a".repeat(2048));
        assert!(request(&long, None).validate().is_err());
        assert!(request("not a url", None).validate().is_err());
    }
}
