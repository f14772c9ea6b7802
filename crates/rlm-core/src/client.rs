//! Chat-completion client.
//!
//! One non-streaming `POST {base_url}/chat/completions` request per call,
//! using [`reqwest`]. No retry, timeout, or cancellation logic: failures
//! propagate to the caller.

use async_trait::async_trait;
use rlm_proto::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::config::RlmConfig;

/// Errors from the chat-completion client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("chat API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The server returned a well-formed response with no choices.
    #[error("chat API returned no choices")]
    EmptyChoices,
}

/// A source of chat completions.
///
/// The HTTP client implements this for live runs; the scripted backend in
/// [`crate::testing`] implements it for deterministic tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend identifier recorded in trajectory metadata.
    fn name(&self) -> &str;

    /// Model name recorded in trajectory metadata.
    fn model(&self) -> &str;

    /// Requests one completion for the given conversation.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible chat-completions server.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Creates a client from resolved configuration.
    pub fn new(config: &RlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ClientError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ClientError::EmptyChoices)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
