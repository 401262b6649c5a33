//! DTOs for link lookup endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Link, LinkStatus};

/// Public view of an active link.
#[derive(Debug, Serialize)]
pub struct LinkInfoResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_access_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub is_custom: bool,
    pub status: LinkStatus,
}

impl LinkInfoResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            short_code: link.code,
            short_url,
            original_url: link.target,
            created_at: link.created_at,
            last_access_at: link.last_access_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            is_custom: link.is_custom,
            status: link.status,
        }
    }
}
