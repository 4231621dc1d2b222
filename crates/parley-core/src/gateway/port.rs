//! AssistantGateway trait definition.
//!
//! The remote assistant is an opaque capability with network-call semantics:
//! every method may be slow and may fail transiently. Implementations report
//! failures as [`GatewayError`]; retry policy belongs to callers.

use std::future::Future;

use parley_types::assistant::{Run, Thread, ThreadMessage, ToolOutput};
use parley_types::error::GatewayError;
use parley_types::llm::MessageRole;

/// Port for the remote assistant thread/run API.
///
/// Implementations live in parley-infra (e.g., `OpenAiAssistantGateway`).
pub trait AssistantGateway: Send + Sync {
    /// Create a new, empty conversation thread.
    fn create_thread(&self) -> impl Future<Output = Result<Thread, GatewayError>> + Send;

    /// Append a message to a thread.
    fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> impl Future<Output = Result<ThreadMessage, GatewayError>> + Send;

    /// Start a run of `assistant_id` over the thread's history.
    ///
    /// `instructions`, when present, override the assistant's own instructions
    /// for this run only.
    fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        instructions: Option<&str>,
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send;

    /// Fetch the current snapshot of a run.
    fn retrieve_run(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send;

    /// Submit tool outputs for a run in the `requires_action` state.
    fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send;

    /// List the thread's messages, most recent first.
    fn list_messages(
        &self,
        thread_id: &str,
    ) -> impl Future<Output = Result<Vec<ThreadMessage>, GatewayError>> + Send;
}
