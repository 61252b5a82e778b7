//! The RAG pipeline.
//!
//! The pipeline orchestrates:
//! - Query rewriting informed by earlier iterations
//! - Cascading retrieval (hybrid, then semantic, then keyword)
//! - Ranking, truncation and fusion of evidence
//! - Sufficiency judgment
//! - Grounded answer generation
//! - Single-pass answering for callers that skip the loop

pub mod aggregate;
pub mod cascade;
pub mod judge;
pub mod orchestrator;
pub mod prompts;
pub mod respond;
pub mod rewrite;
pub mod single_pass;

pub use aggregate::{ResultAggregator, DIAGNOSTIC_TEXT};
pub use cascade::{AttemptOutcome, CascadeReport, CascadingRetriever, StrategyAttempt};
pub use judge::SufficiencyJudge;
pub use orchestrator::{
    FlowEvent, Orchestrator, RunReport, Termination, CANCELLED_TEXT, FALLBACK_TEXT,
    INDEX_UNAVAILABLE_TEXT,
};
pub use prompts::PromptKind;
pub use respond::{ResponseGenerator, APOLOGY_TEXT};
pub use rewrite::QueryRewriter;
pub use single_pass::answer_single_pass;
