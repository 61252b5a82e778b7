//! The iterative retrieval loop.
//!
//! Each iteration walks `REWRITE -> RETRIEVE -> AGGREGATE -> JUDGE` and then
//! either answers and stops, or carries a note forward and starts again. The
//! loop runs at most `max_iterations` times; the last iteration always
//! produces an answer. Every collaborator failure is absorbed by the
//! component that hit it, so a run always ends with non-empty text.
//!
//! Human-readable narration is optional: pass a channel to
//! [`Orchestrator::with_events`] to receive [`FlowEvent`]s. Nothing in the
//! loop depends on anyone listening.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    aggregate::ResultAggregator, cascade::CascadingRetriever, judge::SufficiencyJudge,
    respond::ResponseGenerator, rewrite::QueryRewriter, single_pass::answer_single_pass,
};
use crate::filter::MetadataFilter;
use crate::traits::{generator::Generator, search::SearchBackend};
use crate::types::{config::RagConfig, query::Query};

/// Final answer when the last iteration still retrieves nothing.
pub const INDEX_UNAVAILABLE_TEXT: &str =
    "Sorry, the document index could not be reached or contains no relevant data.";

/// Final answer when no path produced one.
pub const FALLBACK_TEXT: &str = "Sorry, after several rounds of retrieval there is still not \
enough information to answer your query.";

/// Final answer when the caller cancels before an answer exists.
pub const CANCELLED_TEXT: &str = "The query was cancelled before an answer was produced.";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The judge accepted the evidence and an answer was generated
    Sufficient,

    /// Iterations ran out; an answer was generated from what was found
    BestEffort,

    /// The last iteration retrieved nothing
    IndexUnavailable,

    /// The caller cancelled between iterations
    Cancelled,

    /// No path set a response
    Fallback,
}

/// Narration of a run, for verbose front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    IterationStarted {
        iteration: usize,
        max_iterations: usize,
    },
    QueryRewritten {
        original: String,
        rewritten: String,
    },
    Retrieved {
        count: usize,
        failed_strategies: usize,
    },
    NothingRetrieved {
        iteration: usize,
    },
    EvidenceReady {
        evidence: String,
    },
    Judged {
        sufficient: bool,
    },
    Finished {
        termination: Termination,
        iterations: usize,
    },
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,

    /// The answer, never empty
    pub response: String,

    /// Iterations started
    pub iterations: usize,

    pub termination: Termination,

    /// The query as seen by each iteration
    pub queries: Vec<Query>,
}

/// State that crosses iteration boundaries.
#[derive(Debug)]
struct IterationState {
    iteration_index: usize,
    carried_context: Option<String>,
    final_response: Option<(String, Termination)>,
}

impl IterationState {
    fn new() -> Self {
        Self {
            iteration_index: 1,
            carried_context: None,
            final_response: None,
        }
    }

    /// Carry `note` into the next iteration.
    fn advance(&mut self, note: String) {
        self.carried_context = Some(note);
        self.iteration_index += 1;
    }

    fn finish(&mut self, response: String, termination: Termination) {
        self.final_response = Some((response, termination));
    }
}

/// The RAG loop over a search backend and a generation backend.
///
/// # Example
///
/// ```rust,ignore
/// let orchestrator = Orchestrator::new(backend, generator)
///     .with_filter(&MetadataFilter::new().with_author("Smith"));
///
/// let answer = orchestrator.run("What did Smith find about retrieval?").await;
/// ```
pub struct Orchestrator<S: SearchBackend, G: Generator> {
    backend: S,
    generator: G,
    config: RagConfig,
    filter_expression: Option<String>,
    events: Option<UnboundedSender<FlowEvent>>,
}

impl<S: SearchBackend, G: Generator> Orchestrator<S, G> {
    /// Create an orchestrator with default configuration.
    pub fn new(backend: S, generator: G) -> Self {
        Self {
            backend,
            generator,
            config: RagConfig::default(),
            filter_expression: None,
            events: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// Restrict retrieval with metadata criteria.
    pub fn with_filter(mut self, filter: &MetadataFilter) -> Self {
        self.filter_expression = filter.build();
        self
    }

    /// Send narration to `events`.
    pub fn with_events(mut self, events: UnboundedSender<FlowEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The compiled metadata filter, if any.
    pub fn filter_expression(&self) -> Option<&str> {
        self.filter_expression.as_deref()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Answer `query`. Always returns non-empty text.
    pub async fn run(&self, query: &str) -> String {
        self.run_with_cancel(query, &CancellationToken::new())
            .await
            .response
    }

    /// Answer `query` with one filtered hybrid search and one completion.
    pub async fn run_single_pass(&self, query: &str) -> String {
        answer_single_pass(
            &self.backend,
            &self.generator,
            query,
            self.filter_expression.as_deref(),
            &self.config,
        )
        .await
    }

    /// Answer `query`, checking `cancel` before every iteration.
    pub async fn run_with_cancel(&self, query: &str, cancel: &CancellationToken) -> RunReport {
        let run_id = Uuid::now_v7();
        self.drive(run_id, query, cancel).await
    }

    #[instrument(skip_all, fields(run_id = %run_id))]
    async fn drive(&self, run_id: Uuid, query: &str, cancel: &CancellationToken) -> RunReport {
        let max_iterations = self.config.max_iterations.max(1);
        let mut state = IterationState::new();
        let mut queries = Vec::new();

        info!(query, max_iterations, "RAG run started");

        while state.iteration_index <= max_iterations {
            if cancel.is_cancelled() {
                info!(iteration = state.iteration_index, "run cancelled");
                state.finish(CANCELLED_TEXT.to_string(), Termination::Cancelled);
                break;
            }

            let iteration = state.iteration_index;
            let is_last = iteration == max_iterations;
            self.emit(FlowEvent::IterationStarted {
                iteration,
                max_iterations,
            });

            // REWRITE
            let carried = state.carried_context.take();
            let rewritten = QueryRewriter::new(&self.generator)
                .rewrite(query, carried.as_deref())
                .await;
            let current = Query {
                original: query.to_string(),
                rewritten,
                iteration_context: carried,
            };
            self.emit(FlowEvent::QueryRewritten {
                original: current.original.clone(),
                rewritten: current.rewritten.clone(),
            });

            // RETRIEVE
            let (results, report) = CascadingRetriever::new(&self.backend, &self.config)
                .with_filter(self.filter_expression.as_deref())
                .retrieve_with_report(&current.rewritten)
                .await;
            self.emit(FlowEvent::Retrieved {
                count: results.len(),
                failed_strategies: report.failures().count(),
            });

            if results.is_empty() {
                warn!(iteration, "no documents retrieved");
                self.emit(FlowEvent::NothingRetrieved { iteration });
                let rewritten = current.rewritten.clone();
                queries.push(current);

                if is_last {
                    state.finish(
                        INDEX_UNAVAILABLE_TEXT.to_string(),
                        Termination::IndexUnavailable,
                    );
                    break;
                }
                state.advance(no_documents_note(&rewritten));
                continue;
            }

            // AGGREGATE
            let evidence = ResultAggregator::new(&self.generator, &self.config)
                .aggregate(&current.rewritten, &results)
                .await;
            self.emit(FlowEvent::EvidenceReady {
                evidence: evidence.clone(),
            });

            // JUDGE
            let sufficient = SufficiencyJudge::new(&self.generator, &self.config.markers)
                .is_sufficient(&current.rewritten, &evidence)
                .await;
            self.emit(FlowEvent::Judged { sufficient });

            if sufficient || is_last {
                let termination = if sufficient {
                    Termination::Sufficient
                } else {
                    info!(iteration, "iterations exhausted, answering from available evidence");
                    Termination::BestEffort
                };
                let answer = ResponseGenerator::new(&self.generator)
                    .generate(&current.rewritten, &evidence)
                    .await;
                queries.push(current);
                state.finish(answer, termination);
                break;
            }

            debug!(iteration, "evidence insufficient, iterating");
            let note = insufficient_note(
                &current.rewritten,
                &evidence,
                self.config.evidence_preview_chars,
            );
            queries.push(current);
            state.advance(note);
        }

        let iterations = queries.len();
        let (response, termination) = match state.final_response.take() {
            Some((response, termination)) if !response.trim().is_empty() => {
                (response, termination)
            }
            _ => (FALLBACK_TEXT.to_string(), Termination::Fallback),
        };

        info!(?termination, iterations, "RAG run finished");
        self.emit(FlowEvent::Finished {
            termination,
            iterations,
        });

        RunReport {
            run_id,
            response,
            iterations,
            termination,
            queries,
        }
    }

    fn emit(&self, event: FlowEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only silences narration
            let _ = events.send(event);
        }
    }
}

/// Carried context after an iteration that found nothing.
fn no_documents_note(rewritten: &str) -> String {
    format!(
        "Current query: {}\nRetrieval result: no relevant documents were found. \
         Try a more general query or check the database connection.",
        rewritten
    )
}

/// Carried context after an iteration whose evidence fell short.
fn insufficient_note(rewritten: &str, evidence: &str, preview_chars: usize) -> String {
    let preview: String = evidence.chars().take(preview_chars).collect();
    format!(
        "Current query: {}\nRetrieved information: {}...\n\
         The information is not enough to fully answer the question. \
         Refine the query to retrieve more relevant information.",
        rewritten, preview
    )
}
