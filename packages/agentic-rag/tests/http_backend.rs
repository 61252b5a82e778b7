//! HTTP-level tests against an in-process fake retrieval service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use agentic_rag::{
    HttpSearchBackend, RagError, SearchBackend, SearchOptions, SearchRequest, SearchStrategy,
};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A fake service that records request bodies and answers with fixed results.
fn recording_service(seen: Arc<Mutex<Vec<(String, Value)>>>) -> Router {
    Router::new().route(
        "/api/:strategy",
        post(move |Path(strategy): Path<String>, Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push((strategy, body));
                Json(json!({
                    "results": [
                        {"chunk_id": "c1", "doc_id": 7, "content": "Paris is the capital of France.", "score": 0.91,
                         "metadata": {"title": "Geography"}},
                        {"chunk_id": 42, "content": "France is in Europe."},
                        {"content": "missing id"}
                    ]
                }))
            }
        }),
    )
}

#[tokio::test]
async fn test_search_posts_to_strategy_path() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn(recording_service(seen.clone())).await;
    let backend = HttpSearchBackend::new(format!("http://{}/api", addr)).with_collection("papers");

    let request = SearchRequest::new(SearchStrategy::TextMatch, "capital", 15)
        .with_filter(Some(r#"title like "%Geo%""#.to_string()))
        .with_options(SearchOptions {
            case_sensitive: Some(false),
            ..Default::default()
        });
    let results = backend.search(&request).await.unwrap();

    // The item without a chunk id is dropped
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk_id.as_str(), "c1");
    assert_eq!(results[0].document_id.as_ref().unwrap().as_str(), "7");
    assert_eq!(results[0].score, 0.91);
    assert_eq!(results[0].metadata["title"], "Geography");
    assert_eq!(results[1].chunk_id.as_str(), "42");
    assert_eq!(results[1].score, 0.0);

    let seen = seen.lock().unwrap();
    let (strategy, body) = &seen[0];
    assert_eq!(strategy, "text_match");
    assert_eq!(body["query"], "capital");
    assert_eq!(body["top_k"], 15);
    assert_eq!(body["collection_name"], "papers");
    assert_eq!(body["filter_expression"], r#"title like "%Geo%""#);
    assert_eq!(body["case_sensitive"], false);
    assert!(body.get("rerank_enabled").is_none());
}

#[tokio::test]
async fn test_non_success_status_is_retrieval_error() {
    let app = Router::new().route(
        "/api/hybrid",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "collection not loaded") }),
    );
    let addr = spawn(app).await;
    let backend = HttpSearchBackend::new(format!("http://{}/api", addr));

    let err = backend
        .search(&SearchRequest::new(SearchStrategy::Hybrid, "q", 20))
        .await
        .unwrap_err();

    match err {
        RagError::Retrieval { strategy, source } => {
            assert_eq!(strategy, SearchStrategy::Hybrid);
            assert!(source.to_string().contains("500"));
            assert!(source.to_string().contains("collection not loaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_is_retrieval_error() {
    let app = Router::new().route(
        "/api/semantic",
        post(|| async { Json(json!({"hits": []})) }),
    );
    let addr = spawn(app).await;
    let backend = HttpSearchBackend::new(format!("http://{}/api", addr));

    let err = backend
        .search(&SearchRequest::new(SearchStrategy::Semantic, "q", 15))
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::Retrieval { .. }));
    assert!(err.to_string().starts_with("semantic search failed"));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let app = Router::new().route(
        "/api/keyword",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"results": []}))
        }),
    );
    let addr = spawn(app).await;
    let backend = HttpSearchBackend::new(format!("http://{}/api", addr))
        .with_timeout(Duration::from_millis(200));

    let result = backend
        .search(&SearchRequest::new(SearchStrategy::Keyword, "q", 15))
        .await;

    assert!(matches!(result, Err(RagError::Retrieval { .. })));
}
