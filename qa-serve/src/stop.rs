//! `POST /v1/stop {run_id}`: signal cancellation only, no state mutation — the scheduler
//! owns the terminal transition.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qa_protocol::{StopRequest, StopResponse};

use crate::app::AppState;
use crate::response::{bad_request, rate_limited, unauthorized};

pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<StopRequest>,
) -> Response {
    let caller = match state.authorizer.authorize(&headers).await {
        Ok(c) => c,
        Err(_) => return unauthorized(),
    };
    if !state.stop_limiter.check(&caller.0) {
        return rate_limited();
    }
    if request.run_id.is_empty() {
        return bad_request("run_id must not be empty");
    }

    let stopped = state.active_runs.stop(&request.run_id);
    Json(StopResponse { stopped }).into_response()
}
