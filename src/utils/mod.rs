//! Helpers shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`deadline`] - Timeouts around store and cache calls
//! - [`url_normalizer`] - Target URL normalization

pub mod code_generator;
pub mod deadline;
pub mod url_normalizer;
