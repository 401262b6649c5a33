//! Click accounting against the link store.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::utils::deadline::store_call;

/// Records redirects as blind increments keyed by code.
///
/// Each access is one `record_access` call on the store; nothing is read
/// first, so concurrent clicks never overwrite each other. Failures are
/// logged and swallowed: a lost click never fails a redirect.
pub struct ClickAccountant<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    store_timeout: Duration,
}

impl<L: LinkRepository + ?Sized> Clone for ClickAccountant<L> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            store_timeout: self.store_timeout,
        }
    }
}

impl<L: LinkRepository + ?Sized + 'static> ClickAccountant<L> {
    pub fn new(repository: Arc<L>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Increments the click counter and stamps the access time.
    ///
    /// Returns `true` if an active link was updated. An inactive or unknown
    /// code is a no-op and is never reactivated.
    pub async fn record_access(&self, code: &str) -> bool {
        let at = Utc::now();

        match store_call(
            self.store_timeout,
            "record_access",
            self.repository.record_access(code, at),
        )
        .await
        {
            Ok(true) => true,
            Ok(false) => {
                debug!(code, "Click dropped: no active link for code");
                false
            }
            Err(e) => {
                warn!(code, error = %e, "Failed to record click");
                false
            }
        }
    }

    /// Runs [`record_access`](Self::record_access) on a detached task.
    ///
    /// The task outlives the request that spawned it. The handle may be
    /// dropped.
    pub fn spawn_record_access(&self, code: &str) -> JoinHandle<bool> {
        let accountant = self.clone();
        let code = code.to_string();

        tokio::spawn(async move { accountant.record_access(&code).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_access_updates_active_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_access()
            .withf(|code, _| code == "abc1234")
            .times(1)
            .returning(|_, _| Ok(true));

        let accountant = ClickAccountant::new(Arc::new(repo), Duration::from_secs(1));

        assert!(accountant.record_access("abc1234").await);
    }

    #[tokio::test]
    async fn test_record_access_swallows_store_errors() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_access()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let accountant = ClickAccountant::new(Arc::new(repo), Duration::from_secs(1));

        assert!(!accountant.record_access("abc1234").await);
    }

    #[tokio::test]
    async fn test_spawned_access_runs_to_completion() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_access()
            .times(1)
            .returning(|_, _| Ok(false));

        let accountant = ClickAccountant::new(Arc::new(repo), Duration::from_secs(1));

        let handle = accountant.spawn_record_access("gone123");
        assert!(!handle.await.unwrap());
    }
}
