//! Search requests understood by retrieval backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RagError;

/// Retrieval strategy offered by the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Dense vector similarity combined with lexical matching
    Hybrid,
    /// Dense vector similarity only
    Semantic,
    /// Keyword matching
    Keyword,
    /// Full-text search
    Fulltext,
    /// Exact or fuzzy text match
    TextMatch,
    /// Phrase match
    PhraseMatch,
}

impl SearchStrategy {
    /// All strategies, cheapest-to-best cascade order first.
    pub const ALL: [SearchStrategy; 6] = [
        Self::Hybrid,
        Self::Semantic,
        Self::Keyword,
        Self::Fulltext,
        Self::TextMatch,
        Self::PhraseMatch,
    ];

    /// Stable snake_case name, also the endpoint path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Fulltext => "fulltext",
            Self::TextMatch => "text_match",
            Self::PhraseMatch => "phrase_match",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| RagError::Config(format!("unknown search strategy: {}", s)))
    }
}

/// Strategy-specific knobs. Unset values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Re-rank candidates (semantic, hybrid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_enabled: Option<bool>,

    /// Minimum similarity in `[0, 1]` (semantic, hybrid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,

    /// Weight of the vector side (hybrid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_weight: Option<f32>,

    /// Weight of the lexical side (hybrid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_weight: Option<f32>,

    /// Fewer matched keywords than this scores zero (keyword, fulltext)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_match_count: Option<u32>,

    /// `or` (any term) / `and` (all terms) (fulltext)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<String>,

    /// `exact` / `fuzzy` (text match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,

    /// Case-sensitive matching (text match, phrase match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Allow partial phrase matches (phrase match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_partial: Option<bool>,

    /// Return the full source text with each chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_original_text: Option<bool>,

    /// Return the parent chunk with each child chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_parent_chunk: Option<bool>,
}

/// A single call to one retrieval strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub strategy: SearchStrategy,
    pub query: String,
    pub top_k: usize,

    /// Backend filter expression, passed through verbatim
    pub filter_expression: Option<String>,

    pub options: SearchOptions,
}

impl SearchRequest {
    /// Create a request with no filter and default options.
    pub fn new(strategy: SearchStrategy, query: impl Into<String>, top_k: usize) -> Self {
        Self {
            strategy,
            query: query.into(),
            top_k,
            filter_expression: None,
            options: SearchOptions::default(),
        }
    }

    /// Attach a filter expression.
    pub fn with_filter(mut self, filter_expression: Option<String>) -> Self {
        self.filter_expression = filter_expression;
        self
    }

    /// Attach strategy options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }
}
