//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A short code mapped to a target URL
//! - [`LinkStats`] - Read-only statistics view of a link
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! [`NewLink`] carries only what the caller decides, the store assigns the rest.

pub mod link;

pub use link::{Link, LinkStats, LinkStatus, NewLink};
