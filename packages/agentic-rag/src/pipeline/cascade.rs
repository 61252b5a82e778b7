//! Cascading multi-strategy retrieval.
//!
//! Strategies run in priority order (hybrid, then semantic, then keyword).
//! Each later strategy only runs while the accumulator holds fewer unique
//! chunks than the configured threshold, which bounds the number of calls
//! made to the search service. A failing strategy counts as returning
//! nothing; nothing is retried.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::traits::search::SearchBackend;
use crate::types::{
    config::RagConfig,
    result::{Identifier, RetrievalResult},
    search::{SearchRequest, SearchStrategy},
};

/// What happened to one strategy during a cascade.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The strategy ran; `added` of its `returned` results were new.
    Returned { returned: usize, added: usize },

    /// The strategy errored and contributed nothing.
    Failed(String),

    /// The threshold was already met.
    Skipped,
}

/// One row of a [`CascadeReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAttempt {
    pub strategy: SearchStrategy,
    pub outcome: AttemptOutcome,
}

/// Per-strategy account of a cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    pub attempts: Vec<StrategyAttempt>,
}

impl CascadeReport {
    /// Strategies that were actually called.
    pub fn invoked(&self) -> impl Iterator<Item = SearchStrategy> + '_ {
        self.attempts
            .iter()
            .filter(|a| a.outcome != AttemptOutcome::Skipped)
            .map(|a| a.strategy)
    }

    /// Strategies that failed.
    pub fn failures(&self) -> impl Iterator<Item = (SearchStrategy, &str)> + '_ {
        self.attempts.iter().filter_map(|a| match &a.outcome {
            AttemptOutcome::Failed(e) => Some((a.strategy, e.as_str())),
            _ => None,
        })
    }
}

/// Runs the strategy cascade against a search backend.
pub struct CascadingRetriever<'a, S: SearchBackend + ?Sized> {
    backend: &'a S,
    config: &'a RagConfig,
    filter_expression: Option<&'a str>,
}

impl<'a, S: SearchBackend + ?Sized> CascadingRetriever<'a, S> {
    /// Create a retriever with no metadata filter.
    pub fn new(backend: &'a S, config: &'a RagConfig) -> Self {
        Self {
            backend,
            config,
            filter_expression: None,
        }
    }

    /// Restrict every strategy with a filter expression.
    pub fn with_filter(mut self, filter_expression: Option<&'a str>) -> Self {
        self.filter_expression = filter_expression;
        self
    }

    /// The strategies in cascade order with their top-k.
    fn plan(&self) -> [(SearchStrategy, usize); 3] {
        [
            (SearchStrategy::Hybrid, self.config.hybrid_top_k),
            (SearchStrategy::Semantic, self.config.fallback_top_k),
            (SearchStrategy::Keyword, self.config.fallback_top_k),
        ]
    }

    /// Retrieve a deduplicated working set in first-seen order.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievalResult> {
        self.retrieve_with_report(query).await.0
    }

    /// Like [`retrieve`](Self::retrieve), also reporting what each strategy did.
    pub async fn retrieve_with_report(
        &self,
        query: &str,
    ) -> (Vec<RetrievalResult>, CascadeReport) {
        let mut accumulated: Vec<RetrievalResult> = Vec::new();
        let mut seen: HashSet<Identifier> = HashSet::new();
        let mut report = CascadeReport::default();

        for (position, (strategy, top_k)) in self.plan().into_iter().enumerate() {
            if position > 0 && accumulated.len() >= self.config.min_unique_results {
                debug!(%strategy, unique = accumulated.len(), "threshold met, skipping strategy");
                report.attempts.push(StrategyAttempt {
                    strategy,
                    outcome: AttemptOutcome::Skipped,
                });
                continue;
            }

            let request = SearchRequest::new(strategy, query, top_k)
                .with_filter(self.filter_expression.map(str::to_string));

            let outcome = match self.backend.search(&request).await {
                Ok(results) => {
                    let returned = results.len();
                    let added = merge_unique(&mut accumulated, &mut seen, results);
                    debug!(%strategy, returned, added, unique = accumulated.len(), "strategy completed");
                    AttemptOutcome::Returned { returned, added }
                }
                Err(e) => {
                    warn!(%strategy, error = %e, "search strategy failed, continuing cascade");
                    AttemptOutcome::Failed(e.to_string())
                }
            };

            report.attempts.push(StrategyAttempt { strategy, outcome });
        }

        info!(unique = accumulated.len(), "retrieval cascade finished");
        (accumulated, report)
    }
}

/// Append results whose chunk id has not been seen yet. Returns how many
/// were added.
fn merge_unique(
    accumulated: &mut Vec<RetrievalResult>,
    seen: &mut HashSet<Identifier>,
    results: Vec<RetrievalResult>,
) -> usize {
    let before = accumulated.len();
    for result in results {
        if seen.insert(result.chunk_id.clone()) {
            accumulated.push(result);
        }
    }
    accumulated.len() - before
}
