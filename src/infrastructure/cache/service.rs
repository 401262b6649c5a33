//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
///
/// These never cross the service boundary: callers treat any cache error as
/// a miss and fall back to the store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching `code -> target` mappings.
///
/// The cache is a performance shadow of the store, never a source of truth.
/// Implementations report failures as [`CacheError`]; deciding that a failure
/// is harmless is the caller's job.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache shared between instances
/// - [`crate::infrastructure::cache::MokaCache`] - In-process cache with per-entry TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on cache hit
    /// - `Ok(None)` when the key is absent (absence is not an error)
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks whether a live entry exists for the key.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;

    /// Short backend name used in logs and health reports.
    fn backend(&self) -> &'static str;
}
