//! Aggregated evidence handed to the judge and the answer generator.

use super::result::RetrievalResult;

/// Returned when the retrieval set is empty.
pub const NO_RESULTS_TEXT: &str = "No relevant information was retrieved.";

/// Returned when every retrieved result has empty content.
pub const EMPTY_CONTENT_TEXT: &str = "The retrieved results contain no content.";

/// Appended after the character budget is exhausted.
pub const TRUNCATION_MARKER: &str = "...\n[content truncated]";

/// Ranked, rendered and possibly truncated retrieval results.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedContext {
    /// Results in rank order, at most the configured maximum
    pub ranked_results: Vec<RetrievalResult>,

    /// Rendered text, truncated to the character budget plus marker
    pub text_blob: String,

    /// Whether `text_blob` was cut
    pub truncated: bool,
}

/// Outcome of ranking: either usable context or one of two sentinels.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Nothing was retrieved
    NoResults,

    /// Results exist but all of them are empty
    EmptyContent,

    /// Usable context
    Context(AggregatedContext),
}

impl Aggregation {
    /// The literal text for the sentinel variants.
    pub fn sentinel_text(&self) -> Option<&'static str> {
        match self {
            Self::NoResults => Some(NO_RESULTS_TEXT),
            Self::EmptyContent => Some(EMPTY_CONTENT_TEXT),
            Self::Context(_) => None,
        }
    }

    /// The context, if any.
    pub fn context(&self) -> Option<&AggregatedContext> {
        match self {
            Self::Context(ctx) => Some(ctx),
            _ => None,
        }
    }
}
