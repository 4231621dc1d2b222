//! Run poller and tool-call dispatcher.
//!
//! [`RunPoller::poll_once`] is the single state-machine step: fetch the run,
//! answer any pending tool calls, fire matching watchers, and hand back the
//! snapshot. [`RunPoller::spawn`] repeats that step on a fixed interval in a
//! background task until a terminal status, an error, cancellation, or the
//! optional deadline, and resolves the returned [`RunHandle`] exactly once.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, warn};

use parley_types::assistant::{Run, RunStatus, ToolCall, ToolOutput};
use parley_types::error::{GatewayError, SessionError};

use super::functions::FunctionRegistry;
use super::watchers::EventWatchers;
use crate::gateway::BoxAssistantGateway;

/// Polling cadence and optional ceiling for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` polls until the run reaches a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

/// Drives one run to a terminal status.
///
/// Owns snapshots of the session's watchers and functions taken when the run
/// started, so registrations made afterwards do not affect an in-flight run.
pub(crate) struct RunPoller {
    gateway: Arc<BoxAssistantGateway>,
    thread_id: String,
    run_id: String,
    watchers: EventWatchers,
    functions: FunctionRegistry,
}

impl RunPoller {
    pub(crate) fn new(
        gateway: Arc<BoxAssistantGateway>,
        run: &Run,
        watchers: EventWatchers,
        functions: FunctionRegistry,
    ) -> Self {
        Self {
            gateway,
            thread_id: run.thread_id.clone(),
            run_id: run.id.clone(),
            watchers,
            functions,
        }
    }

    /// Fetch the run, dispatch pending tool calls, fire watchers.
    ///
    /// Only a failure to fetch the run is returned; tool and submission
    /// failures are logged and absorbed.
    pub(crate) async fn poll_once(&self) -> Result<Run, GatewayError> {
        let run = self
            .gateway
            .retrieve_run(&self.thread_id, &self.run_id)
            .await
            .inspect_err(|e| {
                error!(thread_id = %self.thread_id, run_id = %self.run_id, error = %e, "Failed to poll run status");
            })?;

        debug!(run_id = %run.id, status = %run.status, "Polled run");

        if run.status == RunStatus::RequiresAction && !run.tool_calls().is_empty() {
            self.dispatch_tool_calls(&run).await;
        }

        self.watchers.fire(&run).await;

        Ok(run)
    }

    /// Execute every requested tool call concurrently and submit the outputs
    /// that were produced as one batch.
    async fn dispatch_tool_calls(&self, run: &Run) {
        let calls = run.tool_calls();
        let outputs: Vec<ToolOutput> = join_all(calls.iter().map(|call| self.execute_call(call)))
            .await
            .into_iter()
            .flatten()
            .collect();

        debug!(
            run_id = %run.id,
            requested = calls.len(),
            produced = outputs.len(),
            "Dispatched tool calls"
        );

        if outputs.is_empty() {
            return;
        }

        if let Err(e) = self
            .gateway
            .submit_tool_outputs(&self.thread_id, &self.run_id, &outputs)
            .await
        {
            error!(run_id = %run.id, error = %e, "Failed to submit tool outputs");
        }
    }

    /// Resolve and run a single tool call. `None` means the call is skipped.
    async fn execute_call(&self, call: &ToolCall) -> Option<ToolOutput> {
        let Some(function) = call.as_function() else {
            warn!(tool_call_id = %call.id, call_type = %call.call_type, "Tool call type not supported, skipping");
            return None;
        };

        let Some(handler) = self.functions.get(&function.name) else {
            warn!(
                tool_call_id = %call.id,
                function = %function.name,
                "Function not registered, skipping tool call"
            );
            return None;
        };

        match handler.call(function).await {
            Ok(output) => Some(ToolOutput {
                tool_call_id: call.id.clone(),
                output,
            }),
            Err(e) => {
                error!(tool_call_id = %call.id, error = %e, "Tool function failed");
                None
            }
        }
    }

    /// Poll on a fixed cadence until a terminal status or cancellation.
    ///
    /// Polls never overlap: a slow poll delays the next tick instead of
    /// stacking requests.
    async fn poll_until_terminal(
        &self,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<Run, SessionError> {
        // A zero period would make `interval` panic.
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the caller already polled once.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SessionError::Cancelled),
                _ = ticker.tick() => {}
            }

            let run = self.poll_once().await?;
            if run.status.is_terminal() {
                return Ok(run);
            }
        }
    }

    /// Run the periodic poll loop in a background task.
    pub(crate) fn spawn(
        self,
        settings: PollSettings,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<Run, SessionError>> {
        tokio::spawn(async move {
            let polling = self.poll_until_terminal(settings.interval, &cancel);
            let outcome = match settings.timeout {
                Some(limit) => tokio::time::timeout(limit, polling)
                    .await
                    .unwrap_or(Err(SessionError::Timeout(limit))),
                None => polling.await,
            };

            match &outcome {
                Ok(run) => debug!(run_id = %run.id, status = %run.status, "Run reached terminal status"),
                Err(SessionError::Cancelled) => debug!(run_id = %self.run_id, "Run polling cancelled"),
                Err(e) => warn!(run_id = %self.run_id, error = %e, "Run polling stopped"),
            }

            outcome
        }
        .in_current_span())
    }
}

enum Outcome {
    Finished(Run),
    Polling(JoinHandle<Result<Run, SessionError>>),
}

/// Handle to a started run.
///
/// Dropping the handle without waiting leaves the poll loop running until the
/// run terminates; call [`RunHandle::cancel`] to stop it early.
pub struct RunHandle {
    created: Run,
    cancel: CancellationToken,
    outcome: Outcome,
}

impl RunHandle {
    pub(crate) fn finished(created: Run, terminal: Run) -> Self {
        Self {
            created,
            cancel: CancellationToken::new(),
            outcome: Outcome::Finished(terminal),
        }
    }

    pub(crate) fn polling(
        created: Run,
        cancel: CancellationToken,
        task: JoinHandle<Result<Run, SessionError>>,
    ) -> Self {
        Self {
            created,
            cancel,
            outcome: Outcome::Polling(task),
        }
    }

    /// The snapshot returned when the run was created.
    pub fn created(&self) -> &Run {
        &self.created
    }

    /// Stop polling before the next tick. The remote run itself is not cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        match &self.outcome {
            Outcome::Finished(_) => true,
            Outcome::Polling(task) => task.is_finished(),
        }
    }

    /// Wait for the poll loop to resolve and return the terminal snapshot.
    pub async fn wait(self) -> Result<Run, SessionError> {
        match self.outcome {
            Outcome::Finished(run) => Ok(run),
            Outcome::Polling(task) => task
                .await
                .map_err(|e| SessionError::PollTask(e.to_string()))?,
        }
    }
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("run_id", &self.created.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}
