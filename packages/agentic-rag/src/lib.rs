//! Iterative Retrieval-Augmented Answering
//!
//! Answers a natural-language question by repeatedly rewriting it, running a
//! cascade of retrieval strategies against a document index, ranking and
//! fusing the evidence, and asking a language model whether that evidence is
//! enough. When it is, a grounded answer is generated; when it is not, the
//! loop carries what it learned into the next iteration, up to a fixed cap.
//!
//! # Design Philosophy
//!
//! - The loop never fails: every collaborator failure has a documented
//!   fallback and the caller always receives text
//! - Collaborators are injected, nothing is a hidden global
//! - The iteration bound is explicit and observable
//! - Library handles mechanics, the front end handles presentation
//!
//! # Usage
//!
//! ```rust,ignore
//! use agentic_rag::{Orchestrator, MetadataFilter};
//! use agentic_rag::testing::{MockGenerator, MockSearchBackend};
//!
//! let orchestrator = Orchestrator::new(MockSearchBackend::new(), MockGenerator::new())
//!     .with_filter(&MetadataFilter::new().with_title("retrieval"));
//!
//! let answer = orchestrator.run("What is hybrid search?").await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (Generator, SearchBackend)
//! - [`types`] - Data types (RetrievalResult, Query, RagConfig, ...)
//! - [`pipeline`] - Retrieval cascade, aggregation, judgment and the loop
//! - [`filter`] - Metadata filter expressions
//! - [`backends`] - HTTP search backend and chat-completions generator
//! - [`testing`] - Mock implementations for testing

pub mod backends;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{RagError, Result};
pub use filter::MetadataFilter;
pub use traits::{generator::Generator, search::SearchBackend};
pub use types::{
    config::{JudgeMarkers, RagConfig},
    context::{AggregatedContext, Aggregation, EMPTY_CONTENT_TEXT, NO_RESULTS_TEXT},
    message::{Message, Role},
    query::Query,
    result::{Identifier, RetrievalResult},
    search::{SearchOptions, SearchRequest, SearchStrategy},
};

// Re-export pipeline components
pub use pipeline::{
    // The loop
    FlowEvent, Orchestrator, RunReport, Termination,
    // Components
    CascadeReport, CascadingRetriever, QueryRewriter, ResponseGenerator, ResultAggregator,
    SufficiencyJudge,
    // Single pass
    answer_single_pass,
    // Fixed replies
    APOLOGY_TEXT, CANCELLED_TEXT, FALLBACK_TEXT, INDEX_UNAVAILABLE_TEXT,
};

// Re-export backends
pub use backends::HttpSearchBackend;
#[cfg(feature = "openai")]
pub use backends::ChatGenerator;
