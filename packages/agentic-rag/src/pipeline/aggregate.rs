//! Ranking, rendering and fusion of retrieved evidence.
//!
//! [`ResultAggregator::rank`] is the pure half: sort, cap, render and
//! truncate. [`ResultAggregator::aggregate`] adds the fusion call and the
//! local fallbacks, and always yields non-empty text.

use tracing::{debug, info, warn};

use super::prompts::fusion_messages;
use crate::traits::generator::Generator;
use crate::types::{
    config::RagConfig,
    context::{AggregatedContext, Aggregation, TRUNCATION_MARKER},
    result::RetrievalResult,
};

/// Returned when even the local digest comes out empty.
pub const DIAGNOSTIC_TEXT: &str = "Retrieval returned results but no usable content could be \
assembled from them. Possible causes: the collection is empty, the indexed data is malformed, \
or the retrieval service is misconfigured.";

/// Turns a retrieval set into evidence text.
pub struct ResultAggregator<'a, G: Generator + ?Sized> {
    generator: &'a G,
    config: &'a RagConfig,
}

impl<'a, G: Generator + ?Sized> ResultAggregator<'a, G> {
    pub fn new(generator: &'a G, config: &'a RagConfig) -> Self {
        Self { generator, config }
    }

    /// Sort, cap and render results without calling the generator.
    pub fn rank(&self, results: &[RetrievalResult]) -> Aggregation {
        if results.is_empty() {
            return Aggregation::NoResults;
        }

        let mut ranked = results.to_vec();
        // sort_by is stable, so equal scores keep their retrieval order
        ranked.sort_by(|a, b| rank_score(b).total_cmp(&rank_score(a)));
        ranked.truncate(self.config.max_ranked_results);

        let mut text = String::new();
        let mut rank = 0;
        for result in ranked.iter().filter(|r| r.has_content()) {
            rank += 1;
            text.push_str(&format!(
                "[result {} relevance {:.3}]\n{}\n",
                rank, result.score, result.content
            ));
        }

        if text.is_empty() {
            return Aggregation::EmptyContent;
        }

        let (text_blob, truncated) = truncate_chars(text, self.config.context_char_budget);
        if truncated {
            debug!(
                budget = self.config.context_char_budget,
                "aggregated context truncated"
            );
        }

        Aggregation::Context(AggregatedContext {
            ranked_results: ranked,
            text_blob,
            truncated,
        })
    }

    /// Produce evidence text for `query`. Never empty.
    pub async fn aggregate(&self, query: &str, results: &[RetrievalResult]) -> String {
        let context = match self.rank(results) {
            Aggregation::Context(context) => context,
            sentinel => {
                info!(?sentinel, "nothing to fuse");
                return sentinel.sentinel_text().unwrap_or(DIAGNOSTIC_TEXT).to_string();
            }
        };

        let reply = self
            .generator
            .complete(&fusion_messages(query, &context.text_blob))
            .await;

        match reply.as_deref().map(str::trim) {
            Some(fused) if !fused.is_empty() && !self.config.is_no_relevant_reply(fused) => {
                info!(chars = fused.chars().count(), "evidence fused");
                fused.to_string()
            }
            other => {
                warn!(
                    reply = ?other,
                    "fusion produced nothing usable, falling back to local digest"
                );
                self.digest(&context)
            }
        }
    }

    /// Numbered raw contents of the first few ranked results.
    fn digest(&self, context: &AggregatedContext) -> String {
        let digest = context
            .ranked_results
            .iter()
            .take(self.config.digest_results)
            .filter(|r| r.has_content())
            .enumerate()
            .map(|(i, r)| format!("{}. {}", i + 1, r.content))
            .collect::<Vec<_>>()
            .join("\n");

        if digest.trim().is_empty() {
            DIAGNOSTIC_TEXT.to_string()
        } else {
            digest
        }
    }
}

/// Score used for ordering; NaN sorts like an absent score.
fn rank_score(result: &RetrievalResult) -> f64 {
    if result.score.is_nan() {
        0.0
    } else {
        result.score
    }
}

/// Keep the first `budget` characters, appending the marker when cut.
fn truncate_chars(text: String, budget: usize) -> (String, bool) {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => {
            let mut kept = text[..cut].to_string();
            kept.push_str(TRUNCATION_MARKER);
            (kept, true)
        }
        None => (text, false),
    }
}
