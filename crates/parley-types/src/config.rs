//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `parley.toml` that controls the
//! assistant identity, gateway location, polling cadence, and the rewrite call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Parley service.
///
/// All fields have defaults, so an empty file (or no file) is valid. The
/// assistant identity has no default and must be supplied before serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// Pre-provisioned assistant identifier runs are created against.
    #[serde(default)]
    pub assistant_id: Option<String>,

    /// Base URL of the assistant and completion APIs.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Interval between run status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ceiling on how long run-and-wait may poll. `None` polls until terminal.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    #[serde(default)]
    pub rewrite: RewriteConfig,
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl ParleyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            assistant_id: None,
            api_base_url: default_api_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: None,
            rewrite: RewriteConfig::default(),
        }
    }
}

/// Settings for the completion call that rewrites raw answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    #[serde(default = "default_rewrite_model")]
    pub model: String,

    #[serde(default = "default_rewrite_max_tokens")]
    pub max_tokens: u32,

    /// Generation stops at the first citation marker by default.
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,
}

fn default_rewrite_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_rewrite_max_tokens() -> u32 {
    150
}

fn default_stop_sequences() -> Vec<String> {
    vec!["【".to_string()]
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            model: default_rewrite_model(),
            max_tokens: default_rewrite_max_tokens(),
            stop_sequences: default_stop_sequences(),
        }
    }
}
