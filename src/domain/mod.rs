//! Domain layer containing business entities and logic.
//!
//! Nothing here depends on HTTP or on a concrete store or cache.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`expiration`] - Expiry predicate and cache TTL bound
//! - [`click_accountant`] - Blind click increments, inline or detached
//!
//! # Design Principles
//!
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])

pub mod click_accountant;
pub mod entities;
pub mod expiration;
pub mod repositories;
