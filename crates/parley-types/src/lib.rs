//! Shared domain types for Parley.
//!
//! This crate contains the types shared by every layer of the assistant
//! orchestration service: threads, runs, tool calls, completion requests,
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod ask;
pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
