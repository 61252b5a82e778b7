//! Retrieval results as produced by the search backends.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier for chunks and documents.
///
/// Retrieval services disagree on whether ids are strings or integers,
/// so both deserialize into the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A single retrieved chunk.
///
/// Absent fields take documented defaults: `score` is `0.0`, `content` is
/// empty and `metadata` is an empty map. Results are never mutated after
/// retrieval, only filtered, reordered and deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Unique within one retrieval call
    pub chunk_id: Identifier,

    /// Source document, if the backend reports one
    #[serde(default, alias = "doc_id", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Identifier>,

    /// Chunk text
    #[serde(default)]
    pub content: String,

    /// Relevance score reported by the backend
    #[serde(default)]
    pub score: f64,

    /// Backend-specific metadata (title, authors, page, ...)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RetrievalResult {
    /// Create a result with content and default score.
    pub fn new(chunk_id: impl Into<Identifier>, content: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            document_id: None,
            content: content.into(),
            score: 0.0,
            metadata: HashMap::new(),
        }
    }

    /// Set the score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Set the document id.
    pub fn with_document(mut self, document_id: impl Into<Identifier>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether the chunk carries any text.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}
