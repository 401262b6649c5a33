//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for short links.
///
/// Every lookup except [`find_latest_by_code`](Self::find_latest_by_code)
/// considers active rows only. Mutations are single-row, single-statement
/// operations; no method reads a row and writes it back.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new active link.
    ///
    /// The store's uniqueness rule on active codes is the final arbiter of
    /// code ownership, regardless of any earlier existence check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeTaken`] if another active link already owns the code.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds the active link for a code.
    ///
    /// The result may be past its expiry; callers apply the expiration policy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds an active link for an exact target that has not expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_active_by_target(
        &self,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError>;

    /// Checks whether an active link owns `code` without loading it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn exists_active_code(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically increments the click counter and stamps `last_access_at`.
    ///
    /// Returns `Ok(false)` when no active link owns the code; the click is
    /// dropped and nothing is reactivated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError>;

    /// Marks the active link for `code` inactive.
    ///
    /// Returns `Ok(false)` if there was no active link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn deactivate(&self, code: &str) -> Result<bool, AppError>;

    /// Marks every active link whose expiry is before `now` inactive.
    ///
    /// Returns the number of links deactivated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Finds the most recently created link for a code, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_latest_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Draws the next value of the store-wide sequence used for sequential codes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn next_sequence(&self) -> Result<u64, AppError>;

    /// Verifies the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
