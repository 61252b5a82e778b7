//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the RAG library
//! without a real search service or LLM endpoint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{RagError, Result};
use crate::pipeline::prompts::PromptKind;
use crate::traits::{generator::Generator, search::SearchBackend};
use crate::types::{
    message::Message,
    result::RetrievalResult,
    search::{SearchRequest, SearchStrategy},
};

type Handler = Arc<dyn Fn(&[Message]) -> Option<String> + Send + Sync>;

/// A mock generation backend.
///
/// Replies are scripted per [`PromptKind`]. A kind with no script behaves
/// like an unreachable backend and returns `None`.
#[derive(Default, Clone)]
pub struct MockGenerator {
    handlers: Arc<RwLock<HashMap<PromptKind, Handler>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    pub kind: PromptKind,
    pub messages: Vec<Message>,
}

impl MockGenerator {
    /// A generator that never answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always reply `text` to `kind`.
    pub fn with_reply(self, kind: PromptKind, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_handler(kind, move |_| Some(text.clone()))
    }

    /// Never reply to `kind`.
    pub fn without_reply(self, kind: PromptKind) -> Self {
        self.with_handler(kind, |_| None)
    }

    /// Reply to `kind` with the given sequence; the last entry repeats.
    pub fn with_replies(self, kind: PromptKind, replies: Vec<Option<String>>) -> Self {
        let cursor = Arc::new(RwLock::new(0usize));
        self.with_handler(kind, move |_| {
            let mut position = cursor.write().unwrap();
            let reply = replies
                .get(*position)
                .or_else(|| replies.last())
                .cloned()
                .flatten();
            *position += 1;
            reply
        })
    }

    /// Compute the reply to `kind` from the conversation.
    pub fn with_handler(
        self,
        kind: PromptKind,
        handler: impl Fn(&[Message]) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.handlers
            .write()
            .unwrap()
            .insert(kind, Arc::new(handler));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls of one kind.
    pub fn call_count(&self, kind: PromptKind) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn complete(&self, messages: &[Message]) -> Option<String> {
        let kind = PromptKind::of(messages);
        self.calls.write().unwrap().push(MockGeneratorCall {
            kind,
            messages: messages.to_vec(),
        });

        let handler = self.handlers.read().unwrap().get(&kind).cloned();
        handler.and_then(|h| h(messages))
    }
}

/// Scripted behaviour of one strategy.
#[derive(Debug, Clone)]
enum StrategyScript {
    Results(Vec<RetrievalResult>),
    Failure(String),
}

/// A mock search backend.
///
/// Strategies with no script return no results.
#[derive(Default, Clone)]
pub struct MockSearchBackend {
    scripts: Arc<RwLock<HashMap<SearchStrategy, StrategyScript>>>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<SearchRequest>>>,
}

impl MockSearchBackend {
    /// A backend whose strategies all return nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `results` for every call to `strategy`.
    pub fn with_results(self, strategy: SearchStrategy, results: Vec<RetrievalResult>) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(strategy, StrategyScript::Results(results));
        self
    }

    /// Fail every call to `strategy`.
    pub fn with_failure(self, strategy: SearchStrategy, message: impl Into<String>) -> Self {
        self.scripts
            .write()
            .unwrap()
            .insert(strategy, StrategyScript::Failure(message.into()));
        self
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Number of calls made to `strategy`.
    pub fn call_count(&self, strategy: SearchStrategy) -> usize {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.strategy == strategy)
            .count()
    }

    /// Clear call history.
    pub fn clear_requests(&self) {
        self.requests.write().unwrap().clear();
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RetrievalResult>> {
        self.requests.write().unwrap().push(request.clone());

        let script = self.scripts.read().unwrap().get(&request.strategy).cloned();
        match script {
            Some(StrategyScript::Results(results)) => {
                Ok(results.into_iter().take(request.top_k).collect())
            }
            Some(StrategyScript::Failure(message)) => {
                Err(RagError::retrieval(request.strategy, message))
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompts::{judge_messages, rewrite_messages};

    #[tokio::test]
    async fn test_mock_generator_scripts_by_kind() {
        let generator = MockGenerator::new().with_reply(PromptKind::Judge, "sufficient");

        assert_eq!(
            generator.complete(&judge_messages("q", "e")).await.as_deref(),
            Some("sufficient")
        );
        assert_eq!(generator.complete(&rewrite_messages("q", None)).await, None);
        assert_eq!(generator.call_count(PromptKind::Judge), 1);
        assert_eq!(generator.call_count(PromptKind::Rewrite), 1);
    }

    #[tokio::test]
    async fn test_mock_generator_sequence_repeats_last() {
        let generator = MockGenerator::new().with_replies(
            PromptKind::Judge,
            vec![None, Some("insufficient".to_string())],
        );
        let messages = judge_messages("q", "e");

        assert_eq!(generator.complete(&messages).await, None);
        assert_eq!(generator.complete(&messages).await.as_deref(), Some("insufficient"));
        assert_eq!(generator.complete(&messages).await.as_deref(), Some("insufficient"));
    }

    #[tokio::test]
    async fn test_mock_search_respects_top_k_and_failures() {
        let backend = MockSearchBackend::new()
            .with_results(
                SearchStrategy::Hybrid,
                vec![RetrievalResult::new("1", "a"), RetrievalResult::new("2", "b")],
            )
            .with_failure(SearchStrategy::Keyword, "offline");

        let hybrid = backend
            .search(&SearchRequest::new(SearchStrategy::Hybrid, "q", 1))
            .await
            .unwrap();
        assert_eq!(hybrid.len(), 1);

        let keyword = backend
            .search(&SearchRequest::new(SearchStrategy::Keyword, "q", 5))
            .await;
        assert!(matches!(keyword, Err(RagError::Retrieval { .. })));

        let semantic = backend
            .search(&SearchRequest::new(SearchStrategy::Semantic, "q", 5))
            .await
            .unwrap();
        assert!(semantic.is_empty());
        assert_eq!(backend.requests().len(), 3);
    }
}
