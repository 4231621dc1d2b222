//! Application error type mapping to HTTP status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::{AskError, GatewayError, SessionError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure of the ask pipeline.
    Ask(AskError),
    /// Request body validation failure.
    Validation(String),
}

impl From<AskError> for AppError {
    fn from(e: AskError) -> Self {
        AppError::Ask(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Ask(AskError::MissingResult) => (
                StatusCode::BAD_GATEWAY,
                "MISSING_RESULT",
                "The assistant run finished without producing an answer".to_string(),
            ),
            AppError::Ask(AskError::Session(SessionError::Timeout(limit))) => (
                StatusCode::GATEWAY_TIMEOUT,
                "RUN_TIMEOUT",
                format!("The assistant run did not finish within {limit:?}"),
            ),
            AppError::Ask(AskError::Session(SessionError::Gateway(
                GatewayError::RateLimited { .. },
            ))) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "GATEWAY_RATE_LIMITED",
                "The assistant service is rate limiting requests".to_string(),
            ),
            AppError::Ask(AskError::Session(SessionError::Gateway(e))) => {
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", e.to_string())
            }
            AppError::Ask(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = json!({
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
