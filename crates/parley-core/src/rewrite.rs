//! Response rewriting.
//!
//! A raw assistant answer often carries Markdown, HTML, and citation markers.
//! [`ResponseRewriter`] sends it through one completion call that turns it
//! into a plain paragraph in the answer's own language.

use std::sync::Arc;

use tracing::{debug, warn};

use parley_types::config::RewriteConfig;
use parley_types::llm::{CompletionRequest, Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;

const REWRITE_INSTRUCTIONS: &str = "You are a writing assistant. Rewrite the information below \
into a single readable paragraph. Remove all HTML and Markdown formatting. Keep the language the \
information is written in and state explicitly which language that is. Write clearly and \
coherently, without formatting tags.";

/// Build the system prompt sent for `raw`.
pub fn build_prompt(raw: &str) -> String {
    format!("{REWRITE_INSTRUCTIONS} : \n\n {raw}")
}

/// Normalizes raw assistant answers with a single completion call.
#[derive(Debug, Clone)]
pub struct ResponseRewriter {
    provider: Arc<BoxLlmProvider>,
    config: RewriteConfig,
}

impl ResponseRewriter {
    pub fn new(provider: Arc<BoxLlmProvider>, config: RewriteConfig) -> Self {
        Self { provider, config }
    }

    fn request_for(&self, raw: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: MessageRole::System,
                content: build_prompt(raw),
            }],
            max_tokens: self.config.max_tokens,
            temperature: None,
            stop_sequences: if self.config.stop_sequences.is_empty() {
                None
            } else {
                Some(self.config.stop_sequences.clone())
            },
        }
    }

    /// Rewrite `raw`, or return `None` if the rewrite is unavailable.
    ///
    /// Provider failures and blank completions are logged and reported as
    /// `None`; callers fall back to the raw text.
    #[tracing::instrument(skip(self, raw), fields(provider = %self.provider.name(), model = %self.config.model))]
    pub async fn rewrite(&self, raw: &str) -> Option<String> {
        let request = self.request_for(raw);

        match self.provider.complete(&request).await {
            Ok(response) => {
                debug!(
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    stop_reason = %response.stop_reason,
                    "Rewrite completed"
                );
                let text = response.content.trim();
                if text.is_empty() {
                    warn!("Rewrite returned no text");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Err(e) => {
                warn!(error = %e, "Rewrite unavailable");
                None
            }
        }
    }
}
