//! Generation backend trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::message::Message;

/// A text-generation backend.
///
/// Implementations swallow their own failures: network errors, non-success
/// statuses, malformed payloads and timeouts all come back as `None`. Blank
/// replies should also be reported as `None`.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a conversation.
    async fn complete(&self, messages: &[Message]) -> Option<String>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn complete(&self, messages: &[Message]) -> Option<String> {
        (**self).complete(messages).await
    }
}
