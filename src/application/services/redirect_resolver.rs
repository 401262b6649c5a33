//! Hot-path resolution of short codes to targets.

use chrono::Utc;
use metrics::counter;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::application::services::LinkSettings;
use crate::domain::click_accountant::ClickAccountant;
use crate::domain::entities::Link;
use crate::domain::expiration::cache_ttl_for;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::deadline::{cache_call, store_call};

/// Cache-aside resolver for redirects.
///
/// A cache hit returns at once and counts the click on a detached task. A
/// miss, a cache error or a cache timeout falls through to the store, where
/// expiry is checked against the current time before anything is cached
/// again. Expired and unknown codes never reach the cache.
pub struct RedirectResolver<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    accountant: ClickAccountant<L>,
    cache_ttl: Duration,
    store_timeout: Duration,
    cache_timeout: Duration,
}

impl<L: LinkRepository + ?Sized + 'static> RedirectResolver<L> {
    pub fn new(repository: Arc<L>, cache: Arc<dyn CacheService>, settings: &LinkSettings) -> Self {
        Self {
            accountant: ClickAccountant::new(repository.clone(), settings.store_timeout),
            repository,
            cache,
            cache_ttl: settings.cache_ttl,
            store_timeout: settings.store_timeout,
            cache_timeout: settings.cache_timeout,
        }
    }

    /// Resolves a code to its target URL and records the access.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no active link owns the code
    /// - [`AppError::Expired`] if the link is past its expiry
    /// - [`AppError::Internal`] if the store fails or times out
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match cache_call(self.cache_timeout, self.cache.get(code)).await {
            Ok(Some(target)) => {
                counter!("shortlink_cache_lookups_total", "result" => "hit").increment(1);
                counter!("shortlink_resolve_total", "outcome" => "redirect").increment(1);
                self.accountant.spawn_record_access(code);
                return Ok(target);
            }
            Ok(None) => {
                counter!("shortlink_cache_lookups_total", "result" => "miss").increment(1);
            }
            Err(e) => {
                counter!("shortlink_cache_lookups_total", "result" => "error").increment(1);
                warn!(code, error = %e, "Cache lookup failed, falling back to store");
            }
        }

        let link = store_call(
            self.store_timeout,
            "find_active_by_code",
            self.repository.find_active_by_code(code),
        )
        .await
        .inspect_err(|_| {
            counter!("shortlink_resolve_total", "outcome" => "error").increment(1);
        })?;

        let Some(link) = link else {
            debug!(code, "Short code not found");
            counter!("shortlink_resolve_total", "outcome" => "not_found").increment(1);
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        };

        if link.is_expired_at(Utc::now()) {
            info!(code, "Short link expired");
            counter!("shortlink_resolve_total", "outcome" => "expired").increment(1);
            return Err(AppError::Expired { code: link.code });
        }

        self.accountant.record_access(code).await;
        self.repopulate(&link).await;

        counter!("shortlink_resolve_total", "outcome" => "redirect").increment(1);
        Ok(link.target)
    }

    async fn repopulate(&self, link: &Link) {
        let Some(ttl) = cache_ttl_for(link.expires_at, Utc::now(), self.cache_ttl) else {
            debug!(code = %link.code, "Link too close to expiry to cache");
            return;
        };

        if let Err(e) = cache_call(
            self.cache_timeout,
            self.cache.set(&link.code, &link.target, ttl),
        )
        .await
        {
            warn!(code = %link.code, error = %e, "Failed to repopulate cache");
            return;
        }

        self.confirm_cached(link).await;
    }

    /// Re-reads the store after a cache write and evicts the entry unless the
    /// same link is still live.
    async fn confirm_cached(&self, link: &Link) {
        let still_live = match store_call(
            self.store_timeout,
            "find_active_by_code",
            self.repository.find_active_by_code(&link.code),
        )
        .await
        {
            Ok(current) => current
                .is_some_and(|current| current.id == link.id && current.is_live_at(Utc::now())),
            Err(e) => {
                warn!(code = %link.code, error = %e, "Could not confirm cached link");
                false
            }
        };

        if still_live {
            return;
        }

        debug!(code = %link.code, "Link changed while caching, evicting");
        if let Err(e) = cache_call(self.cache_timeout, self.cache.delete(&link.code)).await {
            warn!(code = %link.code, error = %e, "Failed to evict stale cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LinkStatus;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use chrono::{DateTime, Duration as ChronoDuration};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_link(code: &str, expires_at: Option<DateTime<Utc>>) -> Link {
        Link {
            id: 1,
            code: code.to_string(),
            target: "https://example.com/".to_string(),
            created_at: Utc::now(),
            last_access_at: None,
            expires_at,
            click_count: 0,
            status: LinkStatus::Active,
            is_custom: false,
        }
    }

    fn resolver(
        repo: MockLinkRepository,
        cache: MockCacheService,
    ) -> RedirectResolver<MockLinkRepository> {
        RedirectResolver::new(Arc::new(repo), Arc::new(cache), &LinkSettings::default())
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store_and_counts_detached() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut repo = MockLinkRepository::new();
        repo.expect_record_access()
            .withf(|code, _| code == "abc1234")
            .times(1)
            .returning(move |_, _| {
                let _ = tx.send(());
                Ok(true)
            });

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("https://cached.example/".to_string())));

        let target = resolver(repo, cache).resolve("abc1234").await.unwrap();

        assert_eq!(target, "https://cached.example/");
        rx.recv().await.unwrap();
    }

    #[tokio::test]
    async fn test_miss_reads_store_counts_and_repopulates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .times(2)
            .returning(|code| Ok(Some(test_link(code, None))));
        repo.expect_record_access()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut cache = MockCacheService::new();
        cache.expect_get().times(1).returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|key, value, ttl| {
                key == "abc1234"
                    && value == "https://example.com/"
                    && *ttl == Duration::from_secs(3600)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        cache.expect_delete().times(0);

        let target = resolver(repo, cache).resolve("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
    }

    #[tokio::test]
    async fn test_link_deactivated_while_caching_is_evicted() {
        let reads = Arc::new(AtomicUsize::new(0));

        let mut repo = MockLinkRepository::new();
        let counter = reads.clone();
        repo.expect_find_active_by_code().returning(move |code| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Some(test_link(code, None)))
            } else {
                Ok(None)
            }
        });
        repo.expect_record_access().returning(|_, _| Ok(false));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));
        cache
            .expect_delete()
            .withf(|key| key == "race123")
            .times(1)
            .returning(|_| Ok(()));

        let target = resolver(repo, cache).resolve("race123").await.unwrap();

        assert_eq!(target, "https://example.com/");
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_code_reassigned_while_caching_is_evicted() {
        let reads = Arc::new(AtomicUsize::new(0));

        let mut repo = MockLinkRepository::new();
        let counter = reads.clone();
        repo.expect_find_active_by_code().returning(move |code| {
            let id = if counter.fetch_add(1, Ordering::SeqCst) == 0 { 1 } else { 2 };
            Ok(Some(Link {
                id,
                ..test_link(code, None)
            }))
        });
        repo.expect_record_access().returning(|_, _| Ok(true));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().returning(|_, _, _| Ok(()));
        cache.expect_delete().times(1).returning(|_| Ok(()));

        resolver(repo, cache).resolve("swap123").await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_error_degrades_to_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .times(1)
            .returning(|code| Ok(Some(test_link(code, None))));
        repo.expect_record_access().returning(|_, _| Ok(true));

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .returning(|_| Err(CacheError::ConnectionError("down".to_string())));
        cache
            .expect_set()
            .returning(|_, _, _| Err(CacheError::ConnectionError("down".to_string())));

        let target = resolver(repo, cache).resolve("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
    }

    #[tokio::test]
    async fn test_expired_link_is_not_cached_or_counted() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code().returning(|code| {
            Ok(Some(test_link(
                code,
                Some(Utc::now() - ChronoDuration::minutes(5)),
            )))
        });

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));

        let err = resolver(repo, cache).resolve("old1234").await.unwrap_err();
        assert!(matches!(err, AppError::Expired { ref code } if code == "old1234"));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code().returning(|_| Ok(None));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));

        let err = resolver(repo, cache).resolve("nope123").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));

        let err = resolver(repo, cache).resolve("abc1234").await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_accounting_failure_still_redirects() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code()
            .returning(|code| Ok(Some(test_link(code, None))));
        repo.expect_record_access()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().returning(|_, _, _| Ok(()));

        assert!(resolver(repo, cache).resolve("abc1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_ttl_bounded_by_expiry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_active_by_code().returning(|code| {
            Ok(Some(test_link(
                code,
                Some(Utc::now() + ChronoDuration::seconds(120)),
            )))
        });
        repo.expect_record_access().returning(|_, _| Ok(true));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|_, _, ttl| *ttl <= Duration::from_secs(120) && *ttl >= Duration::from_secs(110))
            .times(1)
            .returning(|_, _, _| Ok(()));

        resolver(repo, cache).resolve("soon123").await.unwrap();
    }
}
