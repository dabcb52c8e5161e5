//! Shared JSON error response helper (grounded on `serve::response::send_response`'s
//! single point-of-failure write wrapper, adapted to axum's request/response model
//! instead of a persistent socket).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qa_protocol::ErrorResponse;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

pub fn rate_limited() -> Response {
    error_response(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
}

pub fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "missing or invalid credentials")
}

pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}
