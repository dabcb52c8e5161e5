//! Shared helpers for e2e tests (grounded on `serve/tests/e2e/common.rs`'s spawn-and-send
//! shape, adapted from a live socket connection to an in-process `tower::Service` call).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use qa_core::llm::mock::{MockLlmGenerator, MockLlmSummarizer};
use qa_core::provider::mock::MockProvider;
use qa_serve::app::{router, AppState};
use qa_serve::auth::AllowAllAuthorizer;
use qa_store::Store;
use tower::ServiceExt;

pub fn test_state() -> Arc<AppState> {
    let store = Arc::new(Store::open_in_memory(&[1u8; 32]).unwrap());
    Arc::new(AppState::new(
        store,
        Arc::new(MockProvider::new(true)),
        Arc::new(MockLlmGenerator::single("Generated test", "Do the thing")),
        Arc::new(MockLlmSummarizer { success: true }),
        Arc::new(AllowAllAuthorizer),
    ))
}

pub async fn post_json(
    state: Arc<AppState>,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-caller")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

pub async fn get(state: Arc<AppState>, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("authorization", "Bearer test-caller")
        .body(Body::empty())
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
