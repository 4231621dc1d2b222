//! "Ask the assistant": one question in, original and rewritten answer out.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use parley_types::ask::AskResult;
use parley_types::assistant::RunStatus;
use parley_types::error::AskError;

use crate::gateway::BoxAssistantGateway;
use crate::rewrite::ResponseRewriter;
use crate::session::{PollSettings, ThreadSession};

/// Runs a fresh thread per question against a fixed assistant.
#[derive(Debug, Clone)]
pub struct AskService {
    gateway: Arc<BoxAssistantGateway>,
    rewriter: ResponseRewriter,
    assistant_id: String,
    poll: PollSettings,
    instructions: Option<String>,
}

impl AskService {
    pub fn new(
        gateway: Arc<BoxAssistantGateway>,
        rewriter: ResponseRewriter,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            rewriter,
            assistant_id: assistant_id.into(),
            poll: PollSettings::default(),
            instructions: None,
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Per-run instructions applied to every question asked through this service.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Ask `question` on a new thread and rewrite the answer.
    ///
    /// The answer is captured by a completed-status watcher. A run that ends
    /// in any other terminal status, or completes without a text message,
    /// fails with [`AskError::MissingResult`]. A failed rewrite still returns
    /// the original text with `rewritten` unset.
    #[tracing::instrument(skip(self, question), fields(assistant_id = %self.assistant_id))]
    pub async fn ask(&self, question: &str) -> Result<AskResult, AskError> {
        let mut session = ThreadSession::new(Arc::clone(&self.gateway), &self.assistant_id)
            .with_poll_settings(self.poll.clone());

        let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        {
            let captured = Arc::clone(&captured);
            let reader = session.reader();
            session.register_event(RunStatus::Completed, move |run| {
                let captured = Arc::clone(&captured);
                let reader = reader.clone();
                async move {
                    match reader.latest_message().await {
                        Ok(Some(message)) => {
                            if let Some(text) = message.text() {
                                *captured.lock().await = Some(text);
                            } else {
                                warn!(run_id = %run.id, message_id = %message.id, "Latest message has no text content");
                            }
                        }
                        Ok(None) => warn!(run_id = %run.id, "Run completed with no messages"),
                        Err(e) => error!(run_id = %run.id, error = %e, "Failed to fetch response"),
                    }
                }
            });
        }
        session.register_event(RunStatus::Failed, |run| async move {
            error!(
                run_id = %run.id,
                last_error = ?run.last_error,
                "Assistant run failed"
            );
        });

        session.create_thread().await?;
        session.create_user_message(question).await?;
        let run = session.run_and_wait(self.instructions.as_deref()).await?;
        info!(run_id = %run.id, status = %run.status, "Run finished");

        let Some(original) = captured.lock().await.take() else {
            return Err(AskError::MissingResult);
        };

        let rewritten = self.rewriter.rewrite(&original).await;
        Ok(AskResult {
            original,
            rewritten,
        })
    }
}
