//! HTTP layer for Parley.
//!
//! Axum router exposing the ask endpoint, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
