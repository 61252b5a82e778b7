//! OpenAI-compatible chat completions client
//!
//! A small client for any endpoint that speaks the `/chat/completions`
//! protocol (DeepSeek, OpenAI, vLLM, local gateways). No domain logic lives
//! here; callers decide what a failed call means for them.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_client::{ChatClient, ChatRequest, Message};
//!
//! let client = ChatClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new(client.model())
//!         .message(Message::system("You are a helpful assistant."))
//!         .message(Message::user("What is Rust in one sentence?")),
//! ).await?;
//! ```
//!
//! Every request is bounded by a timeout (30 seconds unless configured).

pub mod error;
pub mod types;

pub use error::{ChatClientError, Result};
pub use types::*;

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::Client;
use secrecy::{ExposeSecret, SecretBox};
use tracing::{debug, warn};

/// Default endpoint when `LLM_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An API key that never shows up in logs or debug output.
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the key for use in a request header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Chat completions client.
#[derive(Clone, Debug)]
pub struct ChatClient {
    http_client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    /// Create a new client with the given API key and default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: ApiKey::new(api_key),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create from environment variables.
    ///
    /// - `LLM_API_KEY` (or `DEEPSEEK_API_KEY`), required
    /// - `LLM_BASE_URL`, default [`DEFAULT_BASE_URL`]
    /// - `LLM_MODEL`, default [`DEFAULT_MODEL`]
    /// - `LLM_TIMEOUT_SECS`, default [`DEFAULT_TIMEOUT_SECS`]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("DEEPSEEK_API_KEY"))
            .map_err(|_| ChatClientError::Config("LLM_API_KEY not set".into()))?;

        let mut client = Self::new(api_key);

        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            client = client.with_base_url(url);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            client = client.with_model(model);
        }
        if let Ok(secs) = std::env::var("LLM_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ChatClientError::Config(format!("LLM_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            client = client.with_timeout(Duration::from_secs(secs));
        }

        Ok(client)
    }

    /// Set a custom base URL (proxies, self-hosted gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model used by [`ChatClient::complete`].
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the default model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat completion request failed");
                if e.is_timeout() {
                    ChatClientError::Timeout(self.timeout.as_secs())
                } else {
                    ChatClientError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "chat completion API error");
            return Err(ChatClientError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: types::ChatResponseRaw = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ChatClientError::Timeout(self.timeout.as_secs())
            } else {
                ChatClientError::Parse(e.to_string())
            }
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ChatClientError::Parse("response contained no choices".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            content_len = content.len(),
            "chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }

    /// Complete a conversation with the default model.
    pub async fn complete(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest::new(self.model.clone()).messages(messages);
        self.chat_completion(request).await.map(|r| r.content)
    }
}
