//! Business logic and port definitions for Parley.
//!
//! This crate defines the "ports" (gateway and provider traits) that the
//! infrastructure layer implements, plus the assistant thread lifecycle built
//! on top of them. It depends only on `parley-types` -- never on
//! `parley-infra` or any HTTP client crate.

pub mod ask;
pub mod gateway;
pub mod llm;
pub mod rewrite;
pub mod session;

#[cfg(test)]
mod testing;
