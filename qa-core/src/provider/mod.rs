//! Browser provider abstraction: one trait, total implementations.
//!
//! Every implementation answers every operation; unsupported combinations return a typed
//! `ProviderError::Unsupported` rather than the caller branching on provider identity.

pub mod browser_use_cloud;
pub mod hyperbrowser;
pub mod mock;
pub mod verdict;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::model::ProviderKey;

/// Inputs to run a single test case against a live browser session.
pub struct ExecuteTestInput {
    pub test_case_id: String,
    pub title: String,
    pub description: String,
    pub expected_outcome: Option<String>,
    pub website_url: String,
    pub account_email: Option<String>,
    pub account_password: Option<String>,
    pub profile_id: Option<String>,
    /// Free-form key/value account attributes, surfaced to the agent as a plain
    /// "Account info: k=v, k=v" line when non-empty.
    pub metadata: serde_json::Map<String, Value>,
}

/// Callbacks a provider invokes as a test progresses, so the caller can forward them onto
/// the event stream without the provider knowing anything about SSE or run ids.
#[async_trait]
pub trait ProviderCallbacks: Send + Sync {
    async fn on_streaming_url(&self, streaming_url: &str, recording_url: Option<&str>);
    /// Fired once the provider has actually created a remote task/session, before it starts
    /// stepping through the test — the caller's event stream needs this to report a task id
    /// independent of (and usually earlier than) the first streaming URL.
    async fn on_task_created(&self, task_id: &str, session_id: &str);
    async fn on_step(&self, current_step: u32, total_steps: u32, description: &str);
}

pub struct ExecuteTestOutcome {
    pub success: bool,
    pub reason: String,
    pub extracted_data: Value,
    pub recording_url: Option<String>,
    /// Opaque provider-side diagnostics (task metadata, raw tool calls, etc.), merged under
    /// `extracted_data.provider` by the caller rather than interpreted here.
    pub raw_provider_data: Option<Value>,
}

pub struct LoginInput {
    pub account_email: String,
    pub account_password: String,
    pub website_url: String,
}

pub struct LoginOutcome {
    pub profile_id: String,
}

pub struct DeleteProfileOutcome {
    pub deleted: bool,
}

#[async_trait]
pub trait BrowserProvider: Send + Sync {
    fn key(&self) -> ProviderKey;

    async fn execute_test(
        &self,
        input: ExecuteTestInput,
        callbacks: &(dyn ProviderCallbacks + Send + Sync),
    ) -> Result<ExecuteTestOutcome, ProviderError>;

    async fn login_with_profile(&self, input: LoginInput) -> Result<LoginOutcome, ProviderError>;

    async fn delete_profile(&self, profile_id: &str) -> Result<DeleteProfileOutcome, ProviderError>;
}
