//! Test doubles shared by the session, rewrite, and ask tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use parley_types::assistant::{
    FunctionCall, MessageContent, RequiredAction, Run, RunStatus, SubmitToolOutputs, TextContent,
    Thread, ThreadMessage, ToolCall, ToolOutput,
};
use parley_types::error::GatewayError;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use crate::gateway::AssistantGateway;
use crate::llm::provider::LlmProvider;

/// One scripted `retrieve_run` response.
#[derive(Debug, Clone)]
pub enum Step {
    Status(RunStatus),
    Action(Vec<ToolCall>),
    Fail,
}

pub fn function_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: Some(FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }),
    }
}

pub fn other_call(id: &str, call_type: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: call_type.to_string(),
        function: None,
    }
}

pub fn text_message(id: &str, role: MessageRole, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
                annotations: Vec::new(),
            },
        }],
        run_id: None,
    }
}

/// Calls observed by a [`ScriptedGateway`].
#[derive(Debug, Default)]
pub struct GatewayLog {
    retrieve_calls: Mutex<usize>,
    runs_created: Mutex<Vec<Option<String>>>,
    submissions: Mutex<Vec<Vec<ToolOutput>>>,
}

impl GatewayLog {
    pub fn retrieve_calls(&self) -> usize {
        *self.retrieve_calls.lock().unwrap()
    }

    /// Instructions passed to each `create_run`.
    pub fn runs_created(&self) -> Vec<Option<String>> {
        self.runs_created.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.submissions.lock().unwrap().clone()
    }
}

/// In-memory gateway that replays a fixed sequence of run statuses.
///
/// The last step repeats once the script is exhausted. When a completed
/// status is served, the configured assistant reply is appended to the thread.
pub struct ScriptedGateway {
    steps: Mutex<VecDeque<Step>>,
    messages: Mutex<Vec<ThreadMessage>>,
    reply: Option<String>,
    fail_thread: bool,
    fail_submissions: bool,
    log: Arc<GatewayLog>,
}

impl ScriptedGateway {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            messages: Mutex::new(Vec::new()),
            reply: None,
            fail_thread: false,
            fail_submissions: false,
            log: Arc::new(GatewayLog::default()),
        }
    }

    pub fn with_reply(mut self, text: &str) -> Self {
        self.reply = Some(text.to_string());
        self
    }

    pub fn failing_thread_creation(mut self) -> Self {
        self.fail_thread = true;
        self
    }

    pub fn failing_submissions(mut self) -> Self {
        self.fail_submissions = true;
        self
    }

    pub fn log(&self) -> Arc<GatewayLog> {
        Arc::clone(&self.log)
    }

    fn next_step(&self) -> Option<Step> {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        }
    }

    fn run(thread_id: &str, run_id: &str, status: RunStatus) -> Run {
        Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: "asst_1".to_string(),
            status,
            required_action: None,
            last_error: None,
        }
    }

    fn retrieve(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        *self.log.retrieve_calls.lock().unwrap() += 1;

        match self.next_step() {
            None => Err(GatewayError::NotFound(run_id.to_string())),
            Some(Step::Fail) => Err(GatewayError::Provider {
                message: "connection reset".to_string(),
            }),
            Some(Step::Action(calls)) => {
                let mut run = Self::run(thread_id, run_id, RunStatus::RequiresAction);
                run.required_action = Some(RequiredAction {
                    action_type: "submit_tool_outputs".to_string(),
                    submit_tool_outputs: Some(SubmitToolOutputs { tool_calls: calls }),
                });
                Ok(run)
            }
            Some(Step::Status(status)) => {
                if status == RunStatus::Completed {
                    if let Some(reply) = &self.reply {
                        let mut messages = self.messages.lock().unwrap();
                        let id = format!("msg_{}", messages.len() + 1);
                        let mut message = text_message(&id, MessageRole::Assistant, reply);
                        message.run_id = Some(run_id.to_string());
                        messages.push(message);
                    }
                }
                Ok(Self::run(thread_id, run_id, status))
            }
        }
    }
}

impl AssistantGateway for ScriptedGateway {
    fn create_thread(&self) -> impl Future<Output = Result<Thread, GatewayError>> + Send {
        let result = if self.fail_thread {
            Err(GatewayError::AuthenticationFailed)
        } else {
            Ok(Thread {
                id: "thread_1".to_string(),
                created_at: Some(1_700_000_000),
            })
        };
        async move { result }
    }

    fn create_message(
        &self,
        _thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> impl Future<Output = Result<ThreadMessage, GatewayError>> + Send {
        let mut messages = self.messages.lock().unwrap();
        let id = format!("msg_{}", messages.len() + 1);
        let message = text_message(&id, role, content);
        messages.push(message.clone());
        async move { Ok(message) }
    }

    fn create_run(
        &self,
        thread_id: &str,
        _assistant_id: &str,
        instructions: Option<&str>,
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send {
        self.log
            .runs_created
            .lock()
            .unwrap()
            .push(instructions.map(str::to_string));
        let run = Self::run(thread_id, "run_1", RunStatus::Queued);
        async move { Ok(run) }
    }

    fn retrieve_run(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send {
        let result = self.retrieve(thread_id, run_id);
        async move { result }
    }

    fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> impl Future<Output = Result<Run, GatewayError>> + Send {
        self.log.submissions.lock().unwrap().push(outputs.to_vec());
        let result = if self.fail_submissions {
            Err(GatewayError::InvalidRequest("run is not awaiting outputs".to_string()))
        } else {
            Ok(Self::run(thread_id, run_id, RunStatus::Queued))
        };
        async move { result }
    }

    fn list_messages(
        &self,
        _thread_id: &str,
    ) -> impl Future<Output = Result<Vec<ThreadMessage>, GatewayError>> + Send {
        let messages: Vec<ThreadMessage> =
            self.messages.lock().unwrap().iter().rev().cloned().collect();
        async move { Ok(messages) }
    }
}

/// What a [`MockProvider`] answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    RateLimited,
}

/// LLM provider that returns a canned reply and records every request.
pub struct MockProvider {
    reply: MockReply,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.reply.clone();
        let model = request.model.clone();
        async move {
            match reply {
                MockReply::Text(content) => Ok(CompletionResponse {
                    id: "chatcmpl_1".to_string(),
                    content,
                    model,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 12,
                        output_tokens: 8,
                    },
                }),
                MockReply::RateLimited => Err(LlmError::RateLimited {
                    retry_after_ms: Some(1000),
                }),
            }
        }
    }
}
