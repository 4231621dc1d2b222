//! LlmProvider trait definition.
//!
//! The completion-side port used by the response rewriter. Uses RPITIT for
//! `complete`; [`super::box_provider::BoxLlmProvider`] erases the type for
//! runtime wiring.

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for single-shot completion backends.
///
/// Implementations live in parley-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
