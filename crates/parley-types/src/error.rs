use std::time::Duration;

use thiserror::Error;

/// Errors from the remote assistant gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors raised by thread session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An operation was invoked before the state it needs exists.
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("run did not reach a terminal status within {0:?}")]
    Timeout(Duration),

    #[error("run polling was cancelled")]
    Cancelled,

    #[error("poll task failed: {0}")]
    PollTask(String),
}

/// Failure of a single tool call. Contained to that call; never fails the run.
#[derive(Debug, Error)]
pub enum ToolExecutionError {
    #[error("invalid arguments for '{function}': {message}")]
    InvalidArguments { function: String, message: String },

    #[error("handler '{function}' failed: {message}")]
    Handler { function: String, message: String },
}

/// Errors surfaced by the top-level ask operation.
#[derive(Debug, Error)]
pub enum AskError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The run ended without the completion watcher capturing any content.
    #[error("assistant run produced no result")]
    MissingResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_error_display() {
        let err = SessionError::Precondition("thread not created".to_string());
        assert_eq!(err.to_string(), "precondition failed: thread not created");
    }

    #[test]
    fn test_gateway_error_is_transparent_in_session_error() {
        let err: SessionError = GatewayError::NotFound("run_1".to_string()).into();
        assert_eq!(err.to_string(), "not found: run_1");
    }

    #[test]
    fn test_tool_execution_error_display() {
        let err = ToolExecutionError::InvalidArguments {
            function: "lookup_price".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };
        assert!(err.to_string().contains("lookup_price"));
    }

    #[test]
    fn test_ask_error_from_session_error() {
        let err: AskError = SessionError::Timeout(Duration::from_secs(30)).into();
        assert!(matches!(err, AskError::Session(SessionError::Timeout(_))));
        assert!(err.to_string().contains("30s"));
    }
}
