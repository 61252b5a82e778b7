//! The query as it evolves across iterations.

use serde::Serialize;

/// One iteration's view of the user's question.
///
/// A fresh value is produced every iteration from the original text plus
/// whatever context the previous iteration carried forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// What the user asked
    pub original: String,

    /// The reformulation used for retrieval and judgment
    pub rewritten: String,

    /// Context carried in from the previous iteration
    pub iteration_context: Option<String>,
}
