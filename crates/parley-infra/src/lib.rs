//! Infrastructure adapters for Parley.
//!
//! Implements the ports defined in `parley-core` against the OpenAI HTTP
//! APIs, and loads `parley.toml` configuration.

pub mod config;
pub mod openai;
