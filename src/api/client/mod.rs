//! API client for OpenAI-compatible chat backends.
//!
//! - HTTP client construction is delegated to `transport`.
//! - retry classification is delegated to `retry`.

mod retry;
mod transport;

use super::completions;
use super::ModelClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

pub use retry::{RetryDecision, RetryPolicy};

/// Client for OpenAI-compatible model APIs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved API configuration.
    pub fn new(config: &ApiConfig, retry_policy: RetryPolicy) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self::with_timeout(config, timeout, retry_policy)
    }

    fn with_timeout(config: &ApiConfig, timeout: Duration, retry_policy: RetryPolicy) -> Self {
        Self {
            http: transport::build_http_client(timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            retry_policy,
        }
    }

    /// Send a request, retrying transient failures per the retry policy.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match completions::request(&self.http, &self.base_url, request, &self.api_key).await
            {
                Ok(response) => return Ok(response),
                Err(err) => match self.retry_policy.decide(&err, attempt) {
                    RetryDecision::Retry(delay) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry_policy.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "transient backend failure, retrying"
                        );
                        attempt = attempt.saturating_add(1);
                        sleep(delay).await;
                    }
                    RetryDecision::Abort => {
                        tracing::debug!(attempts = attempt + 1, error = %err, "giving up on backend call");
                        return Err(err);
                    }
                },
            }
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        ApiClient::chat(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn probe_request() -> ChatRequest {
        ChatRequest {
            model: "dummy-model".to_string(),
            messages: vec![Message::user("hello")],
            tools: None,
            tool_choice: None,
            temperature: None,
            max_tokens: None,
        }
    }

    fn api_for(addr: std::net::SocketAddr) -> ApiConfig {
        ApiConfig {
            base_url: format!("http://{addr}/"),
            api_key: "test-key".to_string(),
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn api_client_respects_timeout_policy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Keep the connection open without answering so the client times out.
        let _accept = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let policy = RetryPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
        };
        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_millis(50), policy);
        let err = client.chat(&probe_request()).await.expect_err("timeout expected");
        match err {
            ApiError::Http(inner) => assert!(inner.is_timeout(), "unexpected error: {inner}"),
            other => panic!("expected timeout Http error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn api_client_retries_transient_503() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            for attempt in 0..2 {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut request_buf = [0u8; 4096];
                let _ = stream.read(&mut request_buf).await;
                let response = if attempt == 0 {
                    concat!(
                        "HTTP/1.1 503 Service Unavailable\r\n",
                        "Content-Type: application/json\r\n",
                        "Content-Length: 2\r\n",
                        "Connection: close\r\n",
                        "\r\n",
                        "{}"
                    )
                    .to_string()
                } else {
                    let body = r#"{"id":"ok","choices":[{"index":0,"message":{"role":"assistant","content":"done"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#;
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                };
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        let policy = RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(1),
        };
        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_secs(3), policy);
        let response = client.chat(&probe_request()).await.expect("retry should recover");
        assert_eq!(response.choices[0].message.content.as_deref(), Some("done"));
        assert_eq!(response.usage.unwrap().prompt_tokens, 3);
    }

    #[tokio::test]
    async fn api_client_does_not_retry_unauthorized() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut request_buf = [0u8; 4096];
            let _ = stream.read(&mut request_buf).await;
            let response = concat!(
                "HTTP/1.1 401 Unauthorized\r\n",
                "Content-Length: 9\r\n",
                "Connection: close\r\n",
                "\r\n",
                "bad token"
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });

        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        };
        let client = ApiClient::with_timeout(&api_for(addr), Duration::from_secs(3), policy);
        let err = client.chat(&probe_request()).await.expect_err("401 expected");
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("bad token"));
    }
}
