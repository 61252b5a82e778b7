//! HTTP retrieval backend.
//!
//! Every strategy is a `POST {base_url}/{strategy}` with a JSON body:
//!
//! ```json
//! { "query": "...", "top_k": 20, "collection_name": "papers_chunks_collection",
//!   "filter_expression": "authors like \"%Smith%\"", "rerank_enabled": true }
//! ```
//!
//! and answers `{"results": [ { "chunk_id": ..., "content": ..., "score": ... } ]}`.
//! Items that do not decode are logged and dropped; the rest are kept.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::traits::search::SearchBackend;
use crate::types::{
    result::RetrievalResult,
    search::{SearchOptions, SearchRequest},
};

/// Default retrieval service address.
pub const DEFAULT_RETRIEVAL_URL: &str = "http://localhost:8000/api/v1/retrieval";

/// Default collection searched.
pub const DEFAULT_COLLECTION: &str = "papers_chunks_collection";

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    top_k: usize,
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_expression: Option<&'a str>,
    #[serde(flatten)]
    options: &'a SearchOptions,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<serde_json::Value>,
}

/// Search backend for the retrieval service's REST API.
///
/// # Example
///
/// ```rust,ignore
/// use agentic_rag::backends::HttpSearchBackend;
///
/// let backend = HttpSearchBackend::new("http://localhost:8000/api/v1/retrieval")
///     .with_collection("papers_chunks_collection");
/// let orchestrator = Orchestrator::new(backend, generator);
/// ```
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
    collection_name: String,
    timeout: Duration,
}

impl Default for HttpSearchBackend {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIEVAL_URL)
    }
}

impl HttpSearchBackend {
    /// Create a backend for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection_name: DEFAULT_COLLECTION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the collection searched.
    pub fn with_collection(mut self, collection_name: impl Into<String>) -> Self {
        self.collection_name = collection_name.into();
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn post(&self, request: &SearchRequest) -> Result<Vec<RetrievalResult>> {
        let url = format!("{}/{}", self.base_url, request.strategy);
        let body = SearchBody {
            query: &request.query,
            top_k: request.top_k,
            collection_name: &self.collection_name,
            filter_expression: request.filter_expression.as_deref(),
            options: &request.options,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| RagError::Decode(e.to_string()))?;

        let total = parsed.results.len();
        let results: Vec<RetrievalResult> = parsed
            .results
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(strategy = %request.strategy, error = %e, "skipping undecodable result");
                    None
                }
            })
            .collect();

        debug!(
            strategy = %request.strategy,
            returned = total,
            kept = results.len(),
            duration_ms = start.elapsed().as_millis(),
            "search completed"
        );

        Ok(results)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RetrievalResult>> {
        self.post(request)
            .await
            .map_err(|e| RagError::retrieval(request.strategy, e))
    }
}
