//! Configuration loader for Parley.
//!
//! Reads `parley.toml` into [`ParleyConfig`], falling back to defaults when
//! the file is missing or malformed, then layers `PARLEY_*` environment
//! overrides on top. The API key never lives in the file; it is read from
//! `OPENAI_API_KEY`.

use std::path::Path;

use secrecy::SecretString;

use parley_types::config::ParleyConfig;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("no assistant id configured (set `assistant_id` in the config file or PARLEY_ASSISTANT_ID)")]
    MissingAssistantId,
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`ParleyConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> ParleyConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ParleyConfig::default()
        }
    }
}

/// Load `path` and apply environment overrides from the process environment.
pub async fn load_config_with_env(path: &Path) -> ParleyConfig {
    let mut config = load_config(path).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply `PARLEY_*` overrides read through `lookup`.
///
/// Unparseable numeric values are logged and ignored.
pub fn apply_env_overrides(config: &mut ParleyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(id) = lookup("PARLEY_ASSISTANT_ID").filter(|v| !v.trim().is_empty()) {
        config.assistant_id = Some(id.trim().to_string());
    }

    if let Some(url) = lookup("PARLEY_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }

    if let Some(raw) = lookup("PARLEY_POLL_INTERVAL_MS") {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => config.poll_interval_ms = ms,
            _ => tracing::warn!(value = %raw, "Ignoring invalid PARLEY_POLL_INTERVAL_MS"),
        }
    }

    if let Some(raw) = lookup("PARLEY_RUN_TIMEOUT_SECS") {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.run_timeout_secs = Some(secs),
            Err(_) => tracing::warn!(value = %raw, "Ignoring invalid PARLEY_RUN_TIMEOUT_SECS"),
        }
    }
}

/// Resolve the API key from `OPENAI_API_KEY`.
pub fn resolve_api_key() -> Result<SecretString, ConfigError> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<SecretString, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.trim().to_string()))
        .ok_or(ConfigError::MissingApiKey)
}

/// The configured assistant id, or an error explaining how to set one.
pub fn require_assistant_id(config: &ParleyConfig) -> Result<&str, ConfigError> {
    config
        .assistant_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(ConfigError::MissingAssistantId)
}
