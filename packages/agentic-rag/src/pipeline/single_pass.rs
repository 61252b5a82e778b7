//! One-shot answering over a single hybrid search.
//!
//! No rewriting, judging or iteration: the non-empty contents of one hybrid
//! search become the knowledge base of a single grounded-answer prompt. The
//! prompt itself tells the model how to handle partially relevant or
//! unrelated knowledge.

use tracing::{info, warn};

use super::{prompts::single_pass_messages, respond::APOLOGY_TEXT};
use crate::traits::{generator::Generator, search::SearchBackend};
use crate::types::{
    config::RagConfig,
    search::{SearchRequest, SearchStrategy},
};

/// Answer `query` in one retrieval and one completion. Never empty.
///
/// `filter_expression` restricts the search the same way it does in the
/// iterative loop.
pub async fn answer_single_pass<S, G>(
    backend: &S,
    generator: &G,
    query: &str,
    filter_expression: Option<&str>,
    config: &RagConfig,
) -> String
where
    S: SearchBackend + ?Sized,
    G: Generator + ?Sized,
{
    let request = SearchRequest::new(SearchStrategy::Hybrid, query, config.single_pass_top_k)
        .with_filter(filter_expression.map(str::to_string));
    let results = match backend.search(&request).await {
        Ok(results) => results,
        Err(e) => {
            warn!(error = %e, "single-pass search failed, answering without knowledge");
            Vec::new()
        }
    };

    let knowledge: Vec<&str> = results
        .iter()
        .filter(|r| r.has_content())
        .map(|r| r.content.as_str())
        .collect();
    info!(passages = knowledge.len(), "single-pass knowledge assembled");

    match generator
        .complete(&single_pass_messages(query, &knowledge))
        .await
    {
        Some(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
        _ => {
            warn!("single-pass completion failed, returning apology");
            APOLOGY_TEXT.to_string()
        }
    }
}
