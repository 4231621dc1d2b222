//! Application state wiring the ask service to its concrete adapters.

use std::sync::Arc;

use parley_core::ask::AskService;
use parley_core::gateway::BoxAssistantGateway;
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::rewrite::ResponseRewriter;
use parley_core::session::PollSettings;
use parley_infra::config::{require_assistant_id, resolve_api_key};
use parley_infra::openai::{OpenAiAssistantGateway, OpenAiCompletionProvider};
use parley_types::config::ParleyConfig;

/// Shared application state, used by both the CLI and the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub ask: Arc<AskService>,
}

impl AppState {
    pub fn new(ask: AskService) -> Self {
        Self { ask: Arc::new(ask) }
    }

    /// Build the OpenAI-backed ask service from configuration.
    ///
    /// Fails when no assistant id is configured or `OPENAI_API_KEY` is unset.
    pub fn init(config: &ParleyConfig) -> anyhow::Result<Self> {
        let assistant_id = require_assistant_id(config)?;
        let api_key = resolve_api_key()?;

        let provider =
            OpenAiCompletionProvider::new(&api_key, &config.api_base_url, &config.rewrite.model);
        let rewriter = ResponseRewriter::new(
            Arc::new(BoxLlmProvider::new(provider)),
            config.rewrite.clone(),
        );

        let gateway = OpenAiAssistantGateway::new(api_key).with_base_url(&config.api_base_url);

        let ask = AskService::new(
            Arc::new(BoxAssistantGateway::new(gateway)),
            rewriter,
            assistant_id,
        )
        .with_poll_settings(PollSettings {
            interval: config.poll_interval(),
            timeout: config.run_timeout(),
        });

        tracing::debug!(
            assistant_id,
            base_url = %config.api_base_url,
            poll_interval_ms = config.poll_interval_ms,
            run_timeout_secs = ?config.run_timeout_secs,
            "Ask service ready"
        );

        Ok(Self::new(ask))
    }
}
