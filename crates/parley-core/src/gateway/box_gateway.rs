//! BoxAssistantGateway -- object-safe dynamic dispatch wrapper for AssistantGateway.
//!
//! Same blanket-impl pattern as `BoxLlmProvider`: an object-safe
//! `AssistantGatewayDyn` with boxed futures, implemented for every
//! `T: AssistantGateway`, wrapped by a concrete delegating struct.

use std::future::Future;
use std::pin::Pin;

use parley_types::assistant::{Run, Thread, ThreadMessage, ToolOutput};
use parley_types::error::GatewayError;
use parley_types::llm::MessageRole;

use super::port::AssistantGateway;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Object-safe version of [`AssistantGateway`] with boxed futures.
pub trait AssistantGatewayDyn: Send + Sync {
    fn create_thread_boxed(&self) -> BoxFuture<'_, Thread>;

    fn create_message_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        role: MessageRole,
        content: &'a str,
    ) -> BoxFuture<'a, ThreadMessage>;

    fn create_run_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        assistant_id: &'a str,
        instructions: Option<&'a str>,
    ) -> BoxFuture<'a, Run>;

    fn retrieve_run_boxed<'a>(&'a self, thread_id: &'a str, run_id: &'a str)
    -> BoxFuture<'a, Run>;

    fn submit_tool_outputs_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        run_id: &'a str,
        outputs: &'a [ToolOutput],
    ) -> BoxFuture<'a, Run>;

    fn list_messages_boxed<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, Vec<ThreadMessage>>;
}

impl<T: AssistantGateway> AssistantGatewayDyn for T {
    fn create_thread_boxed(&self) -> BoxFuture<'_, Thread> {
        Box::pin(self.create_thread())
    }

    fn create_message_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        role: MessageRole,
        content: &'a str,
    ) -> BoxFuture<'a, ThreadMessage> {
        Box::pin(self.create_message(thread_id, role, content))
    }

    fn create_run_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        assistant_id: &'a str,
        instructions: Option<&'a str>,
    ) -> BoxFuture<'a, Run> {
        Box::pin(self.create_run(thread_id, assistant_id, instructions))
    }

    fn retrieve_run_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        run_id: &'a str,
    ) -> BoxFuture<'a, Run> {
        Box::pin(self.retrieve_run(thread_id, run_id))
    }

    fn submit_tool_outputs_boxed<'a>(
        &'a self,
        thread_id: &'a str,
        run_id: &'a str,
        outputs: &'a [ToolOutput],
    ) -> BoxFuture<'a, Run> {
        Box::pin(self.submit_tool_outputs(thread_id, run_id, outputs))
    }

    fn list_messages_boxed<'a>(&'a self, thread_id: &'a str) -> BoxFuture<'a, Vec<ThreadMessage>> {
        Box::pin(self.list_messages(thread_id))
    }
}

/// Type-erased assistant gateway.
///
/// Sessions hold this behind an `Arc` so the background poll task and
/// completion watchers can share one client.
pub struct BoxAssistantGateway {
    inner: Box<dyn AssistantGatewayDyn + Send + Sync>,
}

impl BoxAssistantGateway {
    /// Wrap a concrete `AssistantGateway` in a type-erased box.
    pub fn new<T: AssistantGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }

    pub async fn create_thread(&self) -> Result<Thread, GatewayError> {
        self.inner.create_thread_boxed().await
    }

    pub async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, GatewayError> {
        self.inner
            .create_message_boxed(thread_id, role, content)
            .await
    }

    pub async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        instructions: Option<&str>,
    ) -> Result<Run, GatewayError> {
        self.inner
            .create_run_boxed(thread_id, assistant_id, instructions)
            .await
    }

    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        self.inner.retrieve_run_boxed(thread_id, run_id).await
    }

    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, GatewayError> {
        self.inner
            .submit_tool_outputs_boxed(thread_id, run_id, outputs)
            .await
    }

    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, GatewayError> {
        self.inner.list_messages_boxed(thread_id).await
    }
}

impl std::fmt::Debug for BoxAssistantGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAssistantGateway").finish_non_exhaustive()
    }
}
