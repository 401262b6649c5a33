//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::domain::entities::{Link, LinkStatus, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link storage.
///
/// Active links are keyed by code in a `DashMap`, so the entry API gives the
/// same "one active row per code" guarantee as the Postgres partial unique
/// index. Counter updates happen under the shard lock of the entry, which
/// makes them atomic per code. Deactivated links move to a history map and
/// are never brought back.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    active: DashMap<String, Link>,
    retired: DashMap<i64, Link>,
    next_id: AtomicI64,
    sequence: AtomicU64,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links, active and inactive.
    pub fn len(&self) -> usize {
        self.active.len() + self.retired.len()
    }

    /// Returns true if no link has ever been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retire(&self, mut link: Link) {
        link.status = LinkStatus::Inactive;
        self.retired.insert(link.id, link);
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.active.entry(new_link.code.clone()) {
            Entry::Occupied(_) => Err(AppError::CodeTaken {
                code: new_link.code,
            }),
            Entry::Vacant(slot) => {
                let link = Link {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    code: new_link.code,
                    target: new_link.target,
                    created_at: Utc::now(),
                    last_access_at: None,
                    expires_at: new_link.expires_at,
                    click_count: 0,
                    status: LinkStatus::Active,
                    is_custom: new_link.is_custom,
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.active.get(code).map(|link| link.clone()))
    }

    async fn find_active_by_target(
        &self,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError> {
        Ok(self
            .active
            .iter()
            .filter(|link| link.target == target && link.is_live_at(now))
            .max_by_key(|link| (link.created_at, link.id))
            .map(|link| link.clone()))
    }

    async fn exists_active_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.active.contains_key(code))
    }

    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        match self.active.get_mut(code) {
            Some(mut link) => {
                link.click_count += 1;
                link.last_access_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, code: &str) -> Result<bool, AppError> {
        match self.active.remove(code) {
            Some((_, link)) => {
                self.retire(link);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let candidates: Vec<String> = self
            .active
            .iter()
            .filter(|link| link.expires_at.is_some_and(|t| t < now))
            .map(|link| link.code.clone())
            .collect();

        let mut deactivated = 0;
        for code in candidates {
            if let Some((_, link)) = self
                .active
                .remove_if(&code, |_, link| link.expires_at.is_some_and(|t| t < now))
            {
                self.retire(link);
                deactivated += 1;
            }
        }

        Ok(deactivated)
    }

    async fn find_latest_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        if let Some(link) = self.active.get(code) {
            return Ok(Some(link.clone()));
        }

        Ok(self
            .retired
            .iter()
            .filter(|link| link.code == code)
            .max_by_key(|link| (link.created_at, link.id))
            .map(|link| link.clone()))
    }

    async fn next_sequence(&self) -> Result<u64, AppError> {
        Ok(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_link(code: &str, target: &str) -> NewLink {
        NewLink {
            code: code.to_string(),
            target: target.to_string(),
            expires_at: None,
            is_custom: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryLinkRepository::new();

        let link = repo
            .create(new_link("abc1234", "https://example.com"))
            .await
            .unwrap();

        assert_eq!(link.click_count, 0);
        assert!(link.is_active());
        assert!(repo.exists_active_code("abc1234").await.unwrap());

        let found = repo.find_active_by_code("abc1234").await.unwrap().unwrap();
        assert_eq!(found.id, link.id);
        assert_eq!(found.target, "https://example.com");
    }

    #[tokio::test]
    async fn test_duplicate_active_code_rejected() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc1234", "https://a.com"))
            .await
            .unwrap();

        let err = repo
            .create(new_link("abc1234", "https://b.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CodeTaken { .. }));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_code_reusable_after_deactivation() {
        let repo = InMemoryLinkRepository::new();
        let first = repo
            .create(new_link("abc1234", "https://a.com"))
            .await
            .unwrap();

        assert!(repo.deactivate("abc1234").await.unwrap());
        assert!(!repo.deactivate("abc1234").await.unwrap());

        let second = repo
            .create(new_link("abc1234", "https://b.com"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.len(), 2);

        let latest = repo.find_latest_by_code("abc1234").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_record_access_skips_inactive() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc1234", "https://a.com"))
            .await
            .unwrap();
        repo.deactivate("abc1234").await.unwrap();

        assert!(!repo.record_access("abc1234", Utc::now()).await.unwrap());
        assert!(repo.find_active_by_code("abc1234").await.unwrap().is_none());

        let history = repo.find_latest_by_code("abc1234").await.unwrap().unwrap();
        assert_eq!(history.status, LinkStatus::Inactive);
        assert_eq!(history.click_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_record_access_loses_nothing() {
        let repo = Arc::new(InMemoryLinkRepository::new());
        repo.create(new_link("abc1234", "https://a.com"))
            .await
            .unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.record_access("abc1234", Utc::now()).await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().unwrap());
        }

        let link = repo.find_active_by_code("abc1234").await.unwrap().unwrap();
        assert_eq!(link.click_count, 64);
        assert!(link.last_access_at.is_some());
    }

    #[tokio::test]
    async fn test_find_by_target_ignores_expired() {
        let repo = InMemoryLinkRepository::new();
        let now = Utc::now();

        repo.create(NewLink {
            expires_at: Some(now - Duration::minutes(1)),
            ..new_link("old12345", "https://a.com")
        })
        .await
        .unwrap();

        assert!(
            repo.find_active_by_target("https://a.com", now)
                .await
                .unwrap()
                .is_none()
        );

        repo.create(new_link("new12345", "https://a.com"))
            .await
            .unwrap();

        let found = repo
            .find_active_by_target("https://a.com", now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.code, "new12345");
    }

    #[tokio::test]
    async fn test_deactivate_expired_sweep() {
        let repo = InMemoryLinkRepository::new();
        let now = Utc::now();

        repo.create(NewLink {
            expires_at: Some(now - Duration::hours(1)),
            ..new_link("expired1", "https://a.com")
        })
        .await
        .unwrap();
        repo.create(NewLink {
            expires_at: Some(now + Duration::hours(1)),
            ..new_link("fresh123", "https://b.com")
        })
        .await
        .unwrap();
        repo.create(new_link("forever1", "https://c.com"))
            .await
            .unwrap();

        assert_eq!(repo.deactivate_expired(now).await.unwrap(), 1);
        assert!(!repo.exists_active_code("expired1").await.unwrap());
        assert!(repo.exists_active_code("fresh123").await.unwrap());
        assert!(repo.exists_active_code("forever1").await.unwrap());
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic() {
        let repo = InMemoryLinkRepository::new();

        assert_eq!(repo.next_sequence().await.unwrap(), 1);
        assert_eq!(repo.next_sequence().await.unwrap(), 2);
    }
}
