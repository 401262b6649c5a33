//! Link entity representing a short code to target URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::expiration;

/// Lifecycle state of a link.
///
/// Links are never physically removed; deactivation flips the status and the
/// row is kept for history. Only `Active` links take part in code or target
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    Inactive,
}

impl LinkStatus {
    /// Maps the persisted `active` column onto the status.
    pub fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// A persisted short link.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub last_access_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub status: LinkStatus,
    pub is_custom: bool,
}

impl Link {
    /// Returns true once `now` has passed the expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expiration::is_expired(self.expires_at, now)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// True when the link is active and not expired at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.is_expired_at(now)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub target: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_custom: bool,
}

/// Statistics view of a link, active or not.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStats {
    pub code: String,
    pub target: String,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_access_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    /// Whole days left before expiry; absent for non-expiring or already expired links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

impl LinkStats {
    pub fn from_link(link: Link, now: DateTime<Utc>) -> Self {
        let days_remaining = link
            .expires_at
            .filter(|expires_at| *expires_at >= now)
            .map(|expires_at| (expires_at - now).num_days());

        Self {
            code: link.code,
            target: link.target,
            total_clicks: link.click_count,
            created_at: link.created_at,
            last_access_at: link.last_access_at,
            expires_at: link.expires_at,
            status: link.status,
            days_remaining,
        }
    }
}
