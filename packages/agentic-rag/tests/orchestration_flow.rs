//! Integration tests for the orchestration loop.
//!
//! These tests drive the full loop against scripted collaborators:
//! 1. Rewrite the query
//! 2. Retrieve through the strategy cascade
//! 3. Aggregate and fuse evidence
//! 4. Judge sufficiency
//! 5. Answer, or carry context into the next iteration

use agentic_rag::{
    pipeline::PromptKind,
    testing::{MockGenerator, MockSearchBackend},
    CascadingRetriever, FlowEvent, MetadataFilter, Orchestrator, RagConfig, RetrievalResult,
    SearchBackend, SearchRequest, SearchStrategy, Termination, CANCELLED_TEXT,
    INDEX_UNAVAILABLE_TEXT,
};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

const PARIS: &str = "Paris is the capital of France.";

/// Helper to create a backend whose hybrid strategy returns one chunk.
fn paris_backend() -> MockSearchBackend {
    MockSearchBackend::new().with_results(
        SearchStrategy::Hybrid,
        vec![RetrievalResult::new("1", PARIS).with_score(0.9)],
    )
}

/// Helper to create `n` distinct scored results.
fn results(n: usize) -> Vec<RetrievalResult> {
    (0..n)
        .map(|i| RetrievalResult::new(i.to_string(), format!("passage {}", i)).with_score(0.5))
        .collect()
}

#[tokio::test]
async fn test_end_to_end_answer_contains_fact() {
    let generator = MockGenerator::new()
        .with_reply(PromptKind::Fusion, PARIS)
        .with_reply(PromptKind::Judge, "sufficient")
        .with_handler(PromptKind::Answer, |messages| {
            let evidence = &messages[1].content;
            Some(if evidence.contains(PARIS) {
                "The capital of France is Paris.".to_string()
            } else {
                "I cannot tell.".to_string()
            })
        });
    let orchestrator = Orchestrator::new(paris_backend(), generator);

    let report = orchestrator
        .run_with_cancel("What is the capital of France?", &CancellationToken::new())
        .await;

    assert!(report.response.contains("Paris"));
    assert_eq!(report.termination, Termination::Sufficient);
    assert_eq!(report.iterations, 1);
}

#[tokio::test]
async fn test_hybrid_meeting_threshold_skips_fallbacks() {
    let backend = MockSearchBackend::new().with_results(SearchStrategy::Hybrid, results(5));
    let generator = MockGenerator::new().with_reply(PromptKind::Judge, "sufficient");
    let orchestrator = Orchestrator::new(backend, generator);

    orchestrator.run("anything").await;

    let backend = orchestrator.backend();
    assert_eq!(backend.call_count(SearchStrategy::Hybrid), 1);
    assert_eq!(backend.call_count(SearchStrategy::Semantic), 0);
    assert_eq!(backend.call_count(SearchStrategy::Keyword), 0);
}

#[tokio::test]
async fn test_cascade_deduplicates_first_seen() {
    let backend = MockSearchBackend::new()
        .with_results(
            SearchStrategy::Hybrid,
            vec![RetrievalResult::new("1", "a").with_score(0.9)],
        )
        .with_results(
            SearchStrategy::Semantic,
            vec![
                RetrievalResult::new("1", "a").with_score(0.5),
                RetrievalResult::new("2", "b").with_score(0.7),
            ],
        );
    let config = RagConfig::default();

    let merged = CascadingRetriever::new(&backend, &config).retrieve("q").await;

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].score, 0.9);
    assert_eq!(merged[1].chunk_id.as_str(), "2");
}

#[tokio::test]
async fn test_always_insufficient_stops_after_max_iterations() {
    let generator = MockGenerator::new()
        .with_reply(PromptKind::Judge, "insufficient")
        .with_reply(PromptKind::Answer, "Best guess: Paris.");
    let orchestrator = Orchestrator::new(paris_backend(), generator);

    let report = orchestrator
        .run_with_cancel("capital?", &CancellationToken::new())
        .await;

    assert_eq!(report.iterations, 3);
    assert_eq!(report.termination, Termination::BestEffort);
    assert_eq!(report.response, "Best guess: Paris.");

    let generator = orchestrator.generator();
    assert_eq!(generator.call_count(PromptKind::Rewrite), 3);
    assert_eq!(generator.call_count(PromptKind::Judge), 3);
    assert_eq!(generator.call_count(PromptKind::Answer), 1);
}

#[tokio::test]
async fn test_insufficient_evidence_is_carried_forward() {
    let generator = MockGenerator::new()
        .with_reply(PromptKind::Rewrite, "capital city of France")
        .with_reply(PromptKind::Fusion, "x".repeat(300))
        .with_replies(
            PromptKind::Judge,
            vec![Some("insufficient".to_string()), Some("sufficient".to_string())],
        )
        .with_reply(PromptKind::Answer, "Paris.");
    let orchestrator = Orchestrator::new(paris_backend(), generator);

    let report = orchestrator
        .run_with_cancel("capital?", &CancellationToken::new())
        .await;

    assert_eq!(report.iterations, 2);
    assert_eq!(report.termination, Termination::Sufficient);
    assert!(report.queries[0].iteration_context.is_none());

    let carried = report.queries[1].iteration_context.as_deref().unwrap();
    assert!(carried.contains("Current query: capital city of France"));
    assert!(carried.contains(&format!("{}...", "x".repeat(100))));
    assert!(!carried.contains(&"x".repeat(101)));

    // The second rewrite saw the carried note
    let rewrites: Vec<_> = orchestrator
        .generator()
        .calls()
        .into_iter()
        .filter(|c| c.kind == PromptKind::Rewrite)
        .collect();
    assert!(rewrites[1].messages[1].content.contains("Context: Current query:"));
}

#[tokio::test]
async fn test_empty_index_returns_fixed_message() {
    let generator = MockGenerator::new()
        .with_reply(PromptKind::Judge, "sufficient")
        .with_reply(PromptKind::Answer, "should not be used");
    let orchestrator = Orchestrator::new(MockSearchBackend::new(), generator);

    let report = orchestrator
        .run_with_cancel("anything", &CancellationToken::new())
        .await;

    assert_eq!(report.response, INDEX_UNAVAILABLE_TEXT);
    assert_eq!(report.termination, Termination::IndexUnavailable);
    assert_eq!(report.iterations, 3);
    assert!(report.queries[1]
        .iteration_context
        .as_deref()
        .unwrap()
        .contains("no relevant documents"));

    let backend = orchestrator.backend();
    for strategy in [SearchStrategy::Hybrid, SearchStrategy::Semantic, SearchStrategy::Keyword] {
        assert_eq!(backend.call_count(strategy), 3);
    }
    assert_eq!(orchestrator.generator().call_count(PromptKind::Judge), 0);
}

#[tokio::test]
async fn test_recovers_when_later_iteration_finds_documents() {
    let generator = MockGenerator::new()
        .with_replies(
            PromptKind::Rewrite,
            vec![Some("too narrow".to_string()), Some("broader".to_string())],
        )
        .with_reply(PromptKind::Judge, "sufficient")
        .with_reply(PromptKind::Answer, "Found it.");

    #[derive(Clone)]
    struct OnlyBroad(MockSearchBackend);

    #[async_trait::async_trait]
    impl SearchBackend for OnlyBroad {
        async fn search(&self, request: &SearchRequest) -> agentic_rag::Result<Vec<RetrievalResult>> {
            if request.query == "broader" {
                self.0.search(request).await
            } else {
                Ok(Vec::new())
            }
        }
    }

    let orchestrator = Orchestrator::new(OnlyBroad(paris_backend()), generator);
    let report = orchestrator
        .run_with_cancel("q", &CancellationToken::new())
        .await;

    assert_eq!(report.response, "Found it.");
    assert_eq!(report.iterations, 2);
    assert_eq!(report.queries[1].rewritten, "broader");
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let orchestrator = Orchestrator::new(paris_backend(), MockGenerator::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = orchestrator.run_with_cancel("q", &cancel).await;

    assert_eq!(report.response, CANCELLED_TEXT);
    assert_eq!(report.termination, Termination::Cancelled);
    assert_eq!(report.iterations, 0);
    assert!(orchestrator.backend().requests().is_empty());
}

#[tokio::test]
async fn test_cancelled_between_iterations() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let generator = MockGenerator::new().with_handler(PromptKind::Judge, move |_| {
        trigger.cancel();
        Some("insufficient".to_string())
    });
    let orchestrator = Orchestrator::new(paris_backend(), generator);

    let report = orchestrator.run_with_cancel("q", &cancel).await;

    assert_eq!(report.termination, Termination::Cancelled);
    assert_eq!(report.iterations, 1);
    assert_eq!(orchestrator.generator().call_count(PromptKind::Answer), 0);
}

#[tokio::test]
async fn test_filter_reaches_every_strategy() {
    let orchestrator = Orchestrator::new(MockSearchBackend::new(), MockGenerator::new())
        .with_config(RagConfig::default().with_max_iterations(1))
        .with_filter(&MetadataFilter::new().with_author("Smith"));

    let response = orchestrator.run("q").await;

    assert_eq!(response, INDEX_UNAVAILABLE_TEXT);
    let requests = orchestrator.backend().requests();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.filter_expression.as_deref() == Some(r#"authors like "%Smith%""#)));
}

#[tokio::test]
async fn test_single_pass_honors_filter() {
    let generator = MockGenerator::new().with_reply(PromptKind::SinglePass, "Paris.");
    let orchestrator = Orchestrator::new(paris_backend(), generator)
        .with_filter(&MetadataFilter::new().with_title("France"));

    let response = orchestrator.run_single_pass("capital?").await;

    assert_eq!(response, "Paris.");
    let requests = orchestrator.backend().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].strategy, SearchStrategy::Hybrid);
    assert_eq!(
        requests[0].filter_expression.as_deref(),
        Some(r#"title like "%France%""#)
    );
}

#[tokio::test]
async fn test_events_narrate_run() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let generator = MockGenerator::new().with_reply(PromptKind::Judge, "sufficient");
    let orchestrator = Orchestrator::new(paris_backend(), generator).with_events(tx);

    orchestrator.run("q").await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(
        events.first(),
        Some(&FlowEvent::IterationStarted {
            iteration: 1,
            max_iterations: 3
        })
    );
    assert!(events.contains(&FlowEvent::Judged { sufficient: true }));
    assert_eq!(
        events.last(),
        Some(&FlowEvent::Finished {
            termination: Termination::Sufficient,
            iterations: 1
        })
    );
}

#[tokio::test]
async fn test_dropped_event_receiver_is_harmless() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);
    let orchestrator = Orchestrator::new(paris_backend(), MockGenerator::new()).with_events(tx);

    assert!(!orchestrator.run("q").await.is_empty());
}

#[tokio::test]
async fn test_non_empty_under_failure_combinations() {
    let backends = [
        MockSearchBackend::new(),
        paris_backend(),
        MockSearchBackend::new()
            .with_failure(SearchStrategy::Hybrid, "down")
            .with_failure(SearchStrategy::Semantic, "down")
            .with_failure(SearchStrategy::Keyword, "down"),
        MockSearchBackend::new().with_results(
            SearchStrategy::Keyword,
            vec![RetrievalResult::new("e", "")],
        ),
    ];
    let generators = [
        MockGenerator::new(),
        MockGenerator::new().with_reply(PromptKind::Judge, "insufficient"),
        MockGenerator::new()
            .with_reply(PromptKind::Fusion, "No relevant information")
            .with_reply(PromptKind::Judge, "unclear")
            .with_reply(PromptKind::Answer, "   "),
    ];

    for backend in &backends {
        for generator in &generators {
            let orchestrator = Orchestrator::new(backend.clone(), generator.clone());
            let response = orchestrator.run("What is the capital of France?").await;
            assert!(!response.trim().is_empty());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_run_never_returns_empty(query in "\\PC{1,40}", hybrid_fails in any::<bool>()) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let backend = if hybrid_fails {
            MockSearchBackend::new().with_failure(SearchStrategy::Hybrid, "down")
        } else {
            paris_backend()
        };
        let orchestrator = Orchestrator::new(backend, MockGenerator::new());

        let response = runtime.block_on(orchestrator.run(&query));
        prop_assert!(!response.is_empty());
    }
}
