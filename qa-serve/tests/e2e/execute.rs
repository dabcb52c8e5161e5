use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::common::test_state;
use qa_serve::app::router;

#[tokio::test]
async fn execute_stream_runs_no_account_test_to_all_complete() {
    let state = test_state();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/execute")
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-caller")
        .body(Body::from(
            serde_json::json!({
                "test_cases": [{
                    "id": "tc-1",
                    "project_id": "proj-1",
                    "title": "Visits home page",
                    "description": "Load the home page and check the header.",
                    "account_requirement": "none"
                }],
                "website_url": "https://example.com",
                "ai_model": "mock-model"
            })
            .to_string(),
        ))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body_bytes = tokio::time::timeout(
        Duration::from_secs(5),
        response.into_body().collect(),
    )
    .await
    .expect("stream did not finish in time")
    .unwrap()
    .to_bytes();

    let text = String::from_utf8(body_bytes.to_vec()).unwrap();
    assert!(text.contains("\"type\":\"test_start\""), "missing test_start: {text}");
    assert!(text.contains("\"type\":\"test_complete\""), "missing test_complete: {text}");
    assert!(text.contains("\"type\":\"all_complete\""), "missing all_complete: {text}");
}
