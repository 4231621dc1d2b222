//! Assistant thread sessions.
//!
//! A [`ThreadSession`] owns one conversation's lifecycle: the thread identity,
//! the registered status watchers and tool functions, and the runs started on
//! the thread. Registries are per-session values, never process-wide state.
//!
//! Typical flow:
//!
//! ```text
//! register watchers/functions -> create_thread -> create_user_message
//!     -> run_and_wait (create run, poll once, poll on interval until terminal)
//! ```

pub mod functions;
pub mod poller;
pub mod watchers;

use std::future::Future;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use parley_types::assistant::{Run, RunStatus, Thread, ThreadMessage};
use parley_types::error::SessionError;
use parley_types::llm::MessageRole;

use crate::gateway::BoxAssistantGateway;

pub use self::functions::{FunctionRegistry, ToolHandler};
pub use self::poller::{PollSettings, RunHandle};
pub use self::watchers::EventWatchers;

use self::poller::RunPoller;

fn thread_not_created() -> SessionError {
    SessionError::Precondition("thread not created".to_string())
}

/// Read-only access to a session's thread messages.
///
/// Cheap to clone into watcher callbacks. Bound to the session's thread slot,
/// so it can be taken before the thread exists and used once it does.
#[derive(Clone, Debug)]
pub struct ThreadReader {
    gateway: Arc<BoxAssistantGateway>,
    thread: Arc<OnceLock<Thread>>,
}

impl ThreadReader {
    fn thread_id(&self) -> Result<&str, SessionError> {
        self.thread
            .get()
            .map(|t| t.id.as_str())
            .ok_or_else(thread_not_created)
    }

    /// The most recent message on the thread, if any.
    pub async fn latest_message(&self) -> Result<Option<ThreadMessage>, SessionError> {
        Ok(self.messages().await?.into_iter().next())
    }

    /// All messages on the thread, most recent first.
    pub async fn messages(&self) -> Result<Vec<ThreadMessage>, SessionError> {
        let thread_id = self.thread_id()?;
        self.gateway
            .list_messages(thread_id)
            .await
            .map_err(|e| {
                error!(thread_id = %thread_id, error = %e, "Failed to list messages");
                e.into()
            })
    }
}

/// One conversation with the remote assistant.
#[derive(Debug)]
pub struct ThreadSession {
    gateway: Arc<BoxAssistantGateway>,
    assistant_id: String,
    settings: PollSettings,
    thread: Arc<OnceLock<Thread>>,
    watchers: EventWatchers,
    functions: FunctionRegistry,
}

impl ThreadSession {
    /// Create a session that runs `assistant_id` through `gateway`.
    pub fn new(gateway: Arc<BoxAssistantGateway>, assistant_id: impl Into<String>) -> Self {
        Self {
            gateway,
            assistant_id: assistant_id.into(),
            settings: PollSettings::default(),
            thread: Arc::new(OnceLock::new()),
            watchers: EventWatchers::new(),
            functions: FunctionRegistry::new(),
        }
    }

    /// Override the default one-second poll interval and unbounded wait.
    pub fn with_poll_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// The thread, once created.
    pub fn thread(&self) -> Option<&Thread> {
        self.thread.get()
    }

    pub fn reader(&self) -> ThreadReader {
        ThreadReader {
            gateway: Arc::clone(&self.gateway),
            thread: Arc::clone(&self.thread),
        }
    }

    fn thread_id(&self) -> Result<&str, SessionError> {
        self.thread()
            .map(|t| t.id.as_str())
            .ok_or_else(thread_not_created)
    }

    /// Append a watcher for `status`. All matching watchers fire, in
    /// registration order, on every poll that observes the status.
    pub fn register_event<F, Fut>(&mut self, status: RunStatus, callback: F)
    where
        F: Fn(Run) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.watchers.register(status, callback);
    }

    /// Register (or replace) the handler for tool calls named `name`.
    pub fn register_function<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.functions.register(name, handler);
    }

    /// Create the session's thread. A session owns exactly one thread.
    #[tracing::instrument(skip(self), fields(assistant_id = %self.assistant_id))]
    pub async fn create_thread(&self) -> Result<&Thread, SessionError> {
        if self.thread.get().is_some() {
            return Err(SessionError::Precondition(
                "thread already created".to_string(),
            ));
        }

        let thread = self.gateway.create_thread().await.map_err(|e| {
            error!(error = %e, "Failed to create thread");
            SessionError::from(e)
        })?;

        info!(thread_id = %thread.id, "Created thread");
        // A concurrent create may have won the slot; the first thread is kept.
        Ok(self.thread.get_or_init(|| thread))
    }

    /// Append a user-authored message to the thread.
    pub async fn create_user_message(&self, content: &str) -> Result<ThreadMessage, SessionError> {
        let thread_id = self.thread_id()?;
        self.gateway
            .create_message(thread_id, MessageRole::User, content)
            .await
            .map_err(|e| {
                error!(thread_id = %thread_id, error = %e, "Failed to create user message");
                e.into()
            })
    }

    /// Create a run, poll it once, and start the periodic poll loop.
    ///
    /// If the first poll already observes a terminal status, no loop is
    /// started and the handle resolves immediately.
    #[tracing::instrument(skip(self, instructions), fields(thread_id))]
    pub async fn start_run(&self, instructions: Option<&str>) -> Result<RunHandle, SessionError> {
        let thread_id = self.thread_id()?;
        tracing::Span::current().record("thread_id", thread_id);

        let created = self
            .gateway
            .create_run(thread_id, &self.assistant_id, instructions)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create run");
                SessionError::from(e)
            })?;
        info!(run_id = %created.id, status = %created.status, "Created run");

        let poller = RunPoller::new(
            Arc::clone(&self.gateway),
            &created,
            self.watchers.clone(),
            self.functions.clone(),
        );

        let first = poller.poll_once().await?;
        if first.status.is_terminal() {
            return Ok(RunHandle::finished(created, first));
        }

        let cancel = CancellationToken::new();
        let task = poller.spawn(self.settings.clone(), cancel.clone());
        Ok(RunHandle::polling(created, cancel, task))
    }

    /// Create a run and wait until it reaches a terminal status.
    ///
    /// Returns the terminal snapshot observed by the poller, not the
    /// snapshot from run creation.
    pub async fn run_and_wait(&self, instructions: Option<&str>) -> Result<Run, SessionError> {
        self.start_run(instructions).await?.wait().await
    }

    /// The most recent message on the thread.
    pub async fn get_response(&self) -> Result<Option<ThreadMessage>, SessionError> {
        self.thread_id()?;
        self.reader().latest_message().await
    }

    /// Every message on the thread, most recent first.
    pub async fn get_messages(&self) -> Result<Vec<ThreadMessage>, SessionError> {
        self.thread_id()?;
        self.reader().messages().await
    }
}
