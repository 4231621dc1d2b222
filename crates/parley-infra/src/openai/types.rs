//! Assistants v2 request and list-envelope types.
//!
//! Response objects (threads, runs, messages) deserialize straight into the
//! shared types in `parley_types::assistant`; only the request bodies and the
//! list envelope are specific to this wire format.

use serde::{Deserialize, Serialize};

use parley_types::assistant::ToolOutput;

/// Body for `POST /threads`. The thread starts empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateThreadRequest {}

/// Body for `POST /threads/{thread_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Body for `POST /threads/{thread_id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<&'a str>,
}

/// Body for `POST /threads/{thread_id}/runs/{run_id}/submit_tool_outputs`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitToolOutputsRequest<'a> {
    pub tool_outputs: &'a [ToolOutput],
}

/// Paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
