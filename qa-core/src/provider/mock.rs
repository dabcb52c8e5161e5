//! Deterministic in-memory provider used by tests and the `qa-cli run` demo command.
//!
//! Drives the same callback/outcome shape real providers use, so scheduler tests exercise
//! the real path instead of a shortcut.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{sleep, Duration};

use crate::error::ProviderError;
use crate::model::ProviderKey;

use super::{
    BrowserProvider, DeleteProfileOutcome, ExecuteTestInput, ExecuteTestOutcome, LoginInput,
    LoginOutcome, ProviderCallbacks,
};

/// Scripts a mock test run: whether it passes, and how many synthetic progress steps to
/// emit before completing. `step_delay` lets tests exercise concurrent scheduling without
/// a fixed sleep per test inflating suite time.
#[derive(Clone)]
pub struct MockProvider {
    pub succeed: bool,
    pub steps: u32,
    pub step_delay: Duration,
    calls: std::sync::Arc<AtomicU64>,
}

impl MockProvider {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            steps: 3,
            step_delay: Duration::from_millis(1),
            calls: std::sync::Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserProvider for MockProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Hyperbrowser
    }

    async fn execute_test(
        &self,
        input: ExecuteTestInput,
        callbacks: &(dyn ProviderCallbacks + Send + Sync),
    ) -> Result<ExecuteTestOutcome, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        callbacks
            .on_task_created(
                &format!("mock-task-{}", input.test_case_id),
                &format!("mock-session-{}", input.test_case_id),
            )
            .await;
        callbacks
            .on_streaming_url(&format!("https://mock.local/stream/{}", input.test_case_id), None)
            .await;
        for step in 1..=self.steps {
            callbacks
                .on_step(step, self.steps, &format!("step {step} of {}", self.steps))
                .await;
            if !self.step_delay.is_zero() {
                sleep(self.step_delay).await;
            }
        }
        Ok(ExecuteTestOutcome {
            success: self.succeed,
            reason: if self.succeed {
                "mock provider completed successfully".to_string()
            } else {
                "mock provider scripted failure".to_string()
            },
            extracted_data: serde_json::Value::Null,
            recording_url: None,
            raw_provider_data: None,
        })
    }

    async fn login_with_profile(&self, _input: LoginInput) -> Result<LoginOutcome, ProviderError> {
        Ok(LoginOutcome {
            profile_id: format!("mock-profile-{}", uuid::Uuid::new_v4()),
        })
    }

    async fn delete_profile(&self, _profile_id: &str) -> Result<DeleteProfileOutcome, ProviderError> {
        Ok(DeleteProfileOutcome { deleted: true })
    }
}
