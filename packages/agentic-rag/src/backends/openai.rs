//! Generator backed by an OpenAI-compatible chat completions endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use agentic_rag::backends::ChatGenerator;
//!
//! let generator = ChatGenerator::new(ChatClient::from_env()?);
//! let orchestrator = Orchestrator::new(backend, generator);
//! ```

use async_trait::async_trait;
use chat_client::{ChatClient, ChatRequest};
use tracing::warn;

use crate::traits::generator::Generator;
use crate::types::message::Message;

/// [`Generator`] over a [`ChatClient`].
///
/// Every client error becomes `None`, as do blank replies.
#[derive(Debug, Clone)]
pub struct ChatGenerator {
    client: ChatClient,
    temperature: Option<f32>,
}

impl ChatGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            temperature: None,
        }
    }

    /// Set the sampling temperature sent with every request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn complete(&self, messages: &[Message]) -> Option<String> {
        let mut request = ChatRequest::new(self.client.model()).messages(
            messages
                .iter()
                .map(|m| chat_client::Message::new(m.role.as_str(), m.content.clone())),
        );
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }

        match self.client.chat_completion(request).await {
            Ok(response) if !response.content.trim().is_empty() => Some(response.content),
            Ok(_) => {
                warn!("chat completion returned blank content");
                None
            }
            Err(e) => {
                warn!(error = %e, "chat completion failed");
                None
            }
        }
    }
}
