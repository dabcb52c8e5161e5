use super::common::{post_json, test_state};

#[tokio::test]
async fn stop_unknown_run_returns_false() {
    let state = test_state();
    let (status, body) = post_json(
        state,
        "/v1/stop",
        serde_json::json!({ "run_id": "run-does-not-exist" }),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["stopped"], false);
}

#[tokio::test]
async fn stop_rejects_empty_run_id() {
    let state = test_state();
    let (status, _body) = post_json(state, "/v1/stop", serde_json::json!({ "run_id": "" })).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
}
