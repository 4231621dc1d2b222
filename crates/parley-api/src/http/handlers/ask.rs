//! POST /api/openai -- ask the assistant the last message of a chat transcript.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use parley_types::ask::AskResult;

use crate::http::error::AppError;
use crate::state::AppState;

/// Chat-style request body. Only the last message is sent to the assistant.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub content: String,
}

impl AskRequest {
    /// The question: the content of the last message.
    fn question(&self) -> Result<&str, AppError> {
        let last = self
            .messages
            .last()
            .ok_or_else(|| AppError::Validation("messages must not be empty".to_string()))?;

        let question = last.content.trim();
        if question.is_empty() {
            return Err(AppError::Validation(
                "last message content must not be blank".to_string(),
            ));
        }
        Ok(question)
    }
}

/// POST /api/openai
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResult>, AppError> {
    let question = request.question()?;
    tracing::debug!(
        messages = request.messages.len(),
        role = ?request.messages.last().and_then(|m| m.role.as_deref()),
        "Ask request"
    );

    let result = state.ask.ask(question).await?;
    Ok(Json(result))
}
