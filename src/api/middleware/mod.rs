//! HTTP middleware for request processing.
//!
//! Authentication and per-client rate limiting are expected in front of the
//! service; only request tracing runs in-process.

pub mod tracing;
