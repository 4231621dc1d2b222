//! OpenAiAssistantGateway -- [`AssistantGateway`] over the OpenAI Assistants v2 API.
//!
//! Every call is a single HTTP round trip; there is no retry here. Non-success
//! statuses are mapped onto [`GatewayError`] variants so callers can tell
//! authentication, rate limiting, and missing objects apart.
//!
//! The API key is held as a [`SecretString`] and only exposed when building
//! the `Authorization` header.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use parley_core::gateway::AssistantGateway;
use parley_types::assistant::{Run, Thread, ThreadMessage, ToolOutput};
use parley_types::error::GatewayError;
use parley_types::llm::MessageRole;

use super::types::{
    ApiErrorResponse, CreateMessageRequest, CreateRunRequest, CreateThreadRequest, ListResponse,
    SubmitToolOutputsRequest,
};

/// Remote assistant gateway backed by the OpenAI Assistants v2 REST API.
///
/// Does NOT derive Debug: it holds the API key.
pub struct OpenAiAssistantGateway {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiAssistantGateway {
    const BETA_HEADER: &'static str = "assistants=v2";

    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Override the base URL (proxies, compatible servers, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticate, send, and decode one request.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", Self::BETA_HEADER)
            .send()
            .await
            .map_err(|e| GatewayError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), &error_body, retry_after_ms));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Deserialization(format!("failed to parse response: {e}")))
    }
}

impl AssistantGateway for OpenAiAssistantGateway {
    async fn create_thread(&self) -> Result<Thread, GatewayError> {
        let request = self
            .client
            .post(self.url("/threads"))
            .json(&CreateThreadRequest::default());
        let thread: Thread = self.send(request).await?;
        debug!(thread_id = %thread.id, "Thread created");
        Ok(thread)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, GatewayError> {
        let role = match role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => {
                return Err(GatewayError::InvalidRequest(
                    "thread messages must be authored by the user or the assistant".to_string(),
                ));
            }
        };

        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/messages")))
            .json(&CreateMessageRequest { role, content });
        let message: ThreadMessage = self.send(request).await?;
        debug!(thread_id, message_id = %message.id, "Message created");
        Ok(message)
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        instructions: Option<&str>,
    ) -> Result<Run, GatewayError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/runs")))
            .json(&CreateRunRequest {
                assistant_id,
                instructions,
            });
        let run: Run = self.send(request).await?;
        debug!(thread_id, run_id = %run.id, status = %run.status, "Run created");
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{thread_id}/runs/{run_id}")));
        self.send(request).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, GatewayError> {
        let request = self
            .client
            .post(self.url(&format!(
                "/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"
            )))
            .json(&SubmitToolOutputsRequest {
                tool_outputs: outputs,
            });
        let run: Run = self.send(request).await?;
        debug!(thread_id, run_id, submitted = outputs.len(), "Tool outputs submitted");
        Ok(run)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, GatewayError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{thread_id}/messages")))
            .query(&[("order", "desc")]);
        let list: ListResponse<ThreadMessage> = self.send(request).await?;
        Ok(list.data)
    }
}

/// Parse a `Retry-After` header given in seconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
}

/// Map a non-success HTTP status and its body to a [`GatewayError`].
fn map_status(status: u16, body: &str, retry_after_ms: Option<u64>) -> GatewayError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => GatewayError::AuthenticationFailed,
        404 => GatewayError::NotFound(message),
        429 => GatewayError::RateLimited { retry_after_ms },
        400 | 422 => GatewayError::InvalidRequest(message),
        _ => GatewayError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn one_shot_server(
        status: &'static str,
        extra_headers: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}/v1"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn gateway(base_url: &str) -> OpenAiAssistantGateway {
        OpenAiAssistantGateway::new(SecretString::from("sk-test")).with_base_url(base_url)
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = gateway("http://localhost:8080/v1/");
        assert_eq!(gateway.base_url(), "http://localhost:8080/v1");
        assert_eq!(gateway.url("/threads"), "http://localhost:8080/v1/threads");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status(401, "", None),
            GatewayError::AuthenticationFailed
        ));
        assert!(matches!(
            map_status(429, "", Some(2000)),
            GatewayError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
        match map_status(
            404,
            r#"{"error":{"message":"No thread found with id 'thread_x'.","type":"invalid_request_error"}}"#,
            None,
        ) {
            GatewayError::NotFound(message) => {
                assert_eq!(message, "No thread found with id 'thread_x'.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        match map_status(500, "upstream exploded", None) {
            GatewayError::Provider { message } => assert_eq!(message, "HTTP 500: upstream exploded"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn retrieve_run_sends_auth_and_beta_headers() {
        let (base_url, server) = one_shot_server(
            "200 OK",
            "",
            r#"{"id":"run_1","object":"thread.run","thread_id":"thread_1","assistant_id":"asst_1","status":"in_progress"}"#,
        )
        .await;

        let run = gateway(&base_url)
            .retrieve_run("thread_1", "run_1")
            .await
            .unwrap();
        assert_eq!(run.id, "run_1");
        assert_eq!(run.status, parley_types::assistant::RunStatus::InProgress);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /v1/threads/thread_1/runs/run_1 "));
        assert!(request.contains("authorization: bearer sk-test"));
        assert!(request.contains("openai-beta: assistants=v2"));
    }

    #[tokio::test]
    async fn create_run_omits_missing_instructions() {
        let (base_url, server) = one_shot_server(
            "200 OK",
            "",
            r#"{"id":"run_1","thread_id":"thread_1","assistant_id":"asst_1","status":"queued"}"#,
        )
        .await;

        let run = gateway(&base_url)
            .create_run("thread_1", "asst_1", None)
            .await
            .unwrap();
        assert_eq!(run.status, parley_types::assistant::RunStatus::Queued);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/threads/thread_1/runs "));
        assert!(request.ends_with(r#"{"assistant_id":"asst_1"}"#));
    }

    #[tokio::test]
    async fn list_messages_requests_newest_first() {
        let (base_url, server) = one_shot_server(
            "200 OK",
            "",
            r#"{"object":"list","data":[{"id":"msg_1","role":"assistant","content":[{"type":"text","text":{"value":"hi","annotations":[]}}]}],"has_more":false}"#,
        )
        .await;

        let messages = gateway(&base_url).list_messages("thread_1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text().as_deref(), Some("hi"));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1/threads/thread_1/messages?order=desc "));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let (base_url, _server) = one_shot_server(
            "429 Too Many Requests",
            "Retry-After: 2\r\n",
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        )
        .await;

        let err = gateway(&base_url).create_thread().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_deserialization_error() {
        let (base_url, _server) = one_shot_server("200 OK", "", r#"{"unexpected":true}"#).await;

        let err = gateway(&base_url).create_thread().await.unwrap_err();
        assert!(matches!(err, GatewayError::Deserialization(_)));
    }

    #[tokio::test]
    async fn system_messages_are_rejected_locally() {
        let err = gateway("http://127.0.0.1:9")
            .create_message("thread_1", MessageRole::System, "be nice")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }
}
