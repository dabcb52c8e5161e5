//! Axum app: shared state and the router wiring it to the four HTTP endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use qa_core::llm::{LlmGenerator, LlmSummarizer};
use qa_core::provider::BrowserProvider;
use qa_core::{AccountLockRegistry, ActiveRunRegistry};
use qa_store::Store;

use crate::auth::Authorizer;
use crate::ratelimit::RateLimiter;
use crate::{execute, generate, stop};

pub struct AppState {
    pub store: Arc<Store>,
    pub active_runs: ActiveRunRegistry,
    pub account_locks: AccountLockRegistry,
    pub provider: Arc<dyn BrowserProvider>,
    pub generator: Arc<dyn LlmGenerator>,
    pub summarizer: Arc<dyn LlmSummarizer>,
    pub authorizer: Arc<dyn Authorizer>,
    pub execute_limiter: RateLimiter,
    pub stop_limiter: RateLimiter,
    pub generate_limiter: RateLimiter,
    pub generate_status_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        provider: Arc<dyn BrowserProvider>,
        generator: Arc<dyn LlmGenerator>,
        summarizer: Arc<dyn LlmSummarizer>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            store,
            active_runs: ActiveRunRegistry::new(),
            account_locks: AccountLockRegistry::new(),
            provider,
            generator,
            summarizer,
            authorizer,
            execute_limiter: RateLimiter::new(qa_config::constants::RATE_LIMIT_EXECUTE_PER_MINUTE),
            stop_limiter: RateLimiter::new(qa_config::constants::RATE_LIMIT_STOP_PER_MINUTE),
            generate_limiter: RateLimiter::new(qa_config::constants::RATE_LIMIT_GENERATE_PER_MINUTE),
            generate_status_limiter: RateLimiter::new(
                qa_config::constants::RATE_LIMIT_GENERATE_STATUS_PER_MINUTE,
            ),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/execute", post(execute::execute_handler))
        .route("/v1/stop", post(stop::stop_handler))
        .route("/v1/generate", post(generate::generate_handler))
        .route("/v1/generate/status", get(generate::generate_status_handler))
        .with_state(state)
}
