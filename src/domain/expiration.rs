//! Expiration policy for short links.
//!
//! Expiry is re-evaluated on every store read. Nothing here assumes the
//! background sweep that deactivates expired rows has run.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Cache entries shorter than this are not worth writing.
const MIN_CACHE_TTL: Duration = Duration::from_secs(1);

/// Returns true if `expires_at` is set and `now` is past it.
pub fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|t| now > t)
}

/// Computes the TTL for caching a mapping so that the entry can never
/// outlive the record's expiry.
///
/// Returns `None` when the remaining lifetime is under one second, in which
/// case the mapping must not be cached.
pub fn cache_ttl_for(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    configured: Duration,
) -> Option<Duration> {
    let ttl = match expires_at {
        None => configured,
        Some(t) => {
            let remaining = (t - now).to_std().ok()?;
            configured.min(remaining)
        }
    };

    (ttl >= MIN_CACHE_TTL).then_some(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_never_expires() {
        assert!(!is_expired(None, Utc::now()));
    }

    #[test]
    fn test_expired_strictly_after() {
        let t = Utc::now();

        assert!(!is_expired(Some(t), t));
        assert!(is_expired(Some(t), t + ChronoDuration::milliseconds(1)));
        assert!(!is_expired(Some(t), t - ChronoDuration::seconds(10)));
    }

    #[test]
    fn test_ttl_unbounded_record_uses_configured() {
        let ttl = cache_ttl_for(None, Utc::now(), Duration::from_secs(3600));
        assert_eq!(ttl, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_ttl_capped_by_remaining_lifetime() {
        let now = Utc::now();
        let ttl = cache_ttl_for(
            Some(now + ChronoDuration::seconds(90)),
            now,
            Duration::from_secs(3600),
        );

        assert_eq!(ttl, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_ttl_keeps_configured_when_shorter() {
        let now = Utc::now();
        let ttl = cache_ttl_for(
            Some(now + ChronoDuration::days(30)),
            now,
            Duration::from_secs(600),
        );

        assert_eq!(ttl, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_ttl_none_when_expired_or_nearly() {
        let now = Utc::now();

        assert_eq!(
            cache_ttl_for(
                Some(now - ChronoDuration::seconds(5)),
                now,
                Duration::from_secs(60)
            ),
            None
        );
        assert_eq!(
            cache_ttl_for(
                Some(now + ChronoDuration::milliseconds(400)),
                now,
                Duration::from_secs(60)
            ),
            None
        );
    }
}
