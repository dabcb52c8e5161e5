use std::time::Duration;

use super::common::{get, post_json, test_state};

#[tokio::test]
async fn generate_then_status_reports_completed_job_with_drafts() {
    let state = test_state();
    let (status, body) = post_json(
        state.clone(),
        "/v1/generate",
        serde_json::json!({
            "project_id": "proj-1",
            "raw_text": "Users can sign up and check out with a saved card.",
            "website_url": "https://example.com",
            "ai_model": "mock-model"
        }),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    let job_id = body["job_id"].as_str().unwrap().to_string();

    // The background worker races with this poll; the generate/status endpoint's own
    // opportunistic drain guarantees progress even if the spawned task hasn't run yet.
    let mut jobs = serde_json::Value::Null;
    for _ in 0..20 {
        let (_status, status_body) = get(state.clone(), "/v1/generate/status?project_id=proj-1").await;
        jobs = status_body["jobs"].clone();
        let done = jobs
            .as_array()
            .map(|arr| arr.iter().any(|j| j["status"] == "completed"))
            .unwrap_or(false);
        if done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let jobs = jobs.as_array().expect("jobs array");
    let job = jobs.iter().find(|j| j["id"] == job_id).expect("job present");
    assert_eq!(job["status"], "completed");
    assert_eq!(job["accepted_count"], 1);
}

#[tokio::test]
async fn generate_rejects_empty_raw_text() {
    let state = test_state();
    let (status, _body) = post_json(
        state,
        "/v1/generate",
        serde_json::json!({
            "project_id": "proj-1",
            "raw_text": "   ",
            "website_url": "https://example.com",
            "ai_model": "mock-model"
        }),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
}
