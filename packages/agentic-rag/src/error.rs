//! Typed errors for the RAG library.
//!
//! Errors only travel across the collaborator seams (search backends,
//! configuration). The orchestration loop converts every one of them into
//! its documented fallback, so [`crate::Orchestrator::run`] has no error
//! channel at all.

use thiserror::Error;

use crate::types::search::SearchStrategy;

/// Errors that can occur at the edges of the RAG pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A retrieval strategy failed
    #[error("{strategy} search failed: {source}")]
    Retrieval {
        strategy: SearchStrategy,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP transport failed (connection, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Retrieval service answered with a non-success status
    #[error("retrieval service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl RagError {
    /// Wrap any error as a failure of one retrieval strategy.
    pub fn retrieval(
        strategy: SearchStrategy,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Retrieval {
            strategy,
            source: source.into(),
        }
    }
}

/// Result type alias for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
