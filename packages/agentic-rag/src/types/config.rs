//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

/// Tunables for retrieval, aggregation and the iteration loop.
///
/// Defaults reproduce the production behaviour; every field can be
/// overridden from a config file or with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Upper bound on orchestration iterations. Default: 3.
    pub max_iterations: usize,

    /// top-k for the hybrid strategy. Default: 20.
    pub hybrid_top_k: usize,

    /// top-k for the semantic and keyword fallbacks. Default: 15.
    pub fallback_top_k: usize,

    /// Unique results needed to stop the cascade early. Default: 5.
    pub min_unique_results: usize,

    /// Results kept after ranking. Default: 20.
    pub max_ranked_results: usize,

    /// Characters of rendered context sent to fusion. Default: 8000.
    pub context_char_budget: usize,

    /// Results in the local digest used when fusion fails. Default: 5.
    pub digest_results: usize,

    /// Characters of evidence quoted in the carried context. Default: 100.
    pub evidence_preview_chars: usize,

    /// top-k for single-pass answering. Default: 10.
    pub single_pass_top_k: usize,

    /// Words the judge looks for in the backend's verdict.
    pub markers: JudgeMarkers,

    /// Replies that mean fusion found nothing relevant.
    pub no_relevant_markers: Vec<String>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            hybrid_top_k: 20,
            fallback_top_k: 15,
            min_unique_results: 5,
            max_ranked_results: 20,
            context_char_budget: 8000,
            digest_results: 5,
            evidence_preview_chars: 100,
            single_pass_top_k: 10,
            markers: JudgeMarkers::default(),
            no_relevant_markers: vec![
                "no relevant information".to_string(),
                "未找到相关信息".to_string(),
            ],
        }
    }
}

impl RagConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap (at least one iteration always runs).
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the cascade threshold.
    pub fn with_min_unique_results(mut self, min: usize) -> Self {
        self.min_unique_results = min;
        self
    }

    /// Set the top-k values for the cascade.
    pub fn with_top_k(mut self, hybrid: usize, fallback: usize) -> Self {
        self.hybrid_top_k = hybrid;
        self.fallback_top_k = fallback;
        self
    }

    /// Set the context character budget.
    pub fn with_context_char_budget(mut self, budget: usize) -> Self {
        self.context_char_budget = budget;
        self
    }

    /// Replace the judge markers.
    pub fn with_markers(mut self, markers: JudgeMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Whether a fusion reply is exactly one of the "nothing relevant" sentinels.
    pub fn is_no_relevant_reply(&self, reply: &str) -> bool {
        let reply = reply.trim().trim_end_matches(['.', '。']).to_lowercase();
        self.no_relevant_markers
            .iter()
            .any(|m| m.to_lowercase() == reply)
    }
}

/// Verdict words, in every language the backend may answer in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeMarkers {
    pub sufficient: Vec<String>,
    pub insufficient: Vec<String>,
}

impl Default for JudgeMarkers {
    fn default() -> Self {
        Self {
            sufficient: vec!["sufficient".to_string(), "足够".to_string()],
            insufficient: vec!["insufficient".to_string(), "不足".to_string()],
        }
    }
}
