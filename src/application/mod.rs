//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits and give HTTP handlers and
//! the admin CLI one entry point per operation.
//!
//! # Available Services
//!
//! - [`services::LinkService`] - Shorten, info, stats and deactivation
//! - [`services::RedirectResolver`] - Cache-aside redirect resolution

pub mod services;
