//! Infrastructure layer for external integrations.
//!
//! Implements the store and cache contracts used by the services.
//!
//! # Modules
//!
//! - [`cache`] - Redis, in-process (Moka) and no-op caches
//! - [`persistence`] - PostgreSQL and in-memory link repositories

pub mod cache;
pub mod persistence;
