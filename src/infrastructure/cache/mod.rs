//! Caching layer for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MokaCache`] - In-process cache for single-node deployments
//! - [`NullCache`] - No-op implementation for disabled caching

mod moka_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use moka_cache::MokaCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
