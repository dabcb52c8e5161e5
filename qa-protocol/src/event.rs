//! Execution stream event types: the `type` + payload half of each SSE line.
//! Envelope fields (run id, sequence number) are injected separately, see `envelope`.

use serde::Serialize;
use serde_json::Value;

/// One execution-stream event. Serializes with `#[serde(tag = "type")]` so the wire
/// shape is `{"type": "test_start", ...fields}`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    TestStart {
        test_case_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved_user_account_id: Option<String>,
    },
    TaskCreated {
        test_case_id: String,
        task_id: String,
        session_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved_user_account_id: Option<String>,
    },
    StreamingUrl {
        test_case_id: String,
        streaming_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        recording_url: Option<String>,
    },
    StepProgress {
        test_case_id: String,
        current_step: u32,
        total_steps: u32,
        step_description: String,
    },
    TestComplete {
        test_case_id: String,
        result: Value,
    },
    TestError {
        test_case_id: String,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
    AllComplete {
        summary: AllCompleteSummary,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct AllCompleteSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub duration_ms: u64,
}

impl ProtocolEvent {
    /// Serializes the event to a JSON object (type + payload, no envelope).
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// The test case this event belongs to, or `None` for batch-level events
    /// (`all_complete` has no single owning test case).
    pub fn test_case_id(&self) -> Option<&str> {
        match self {
            ProtocolEvent::TestStart { test_case_id, .. }
            | ProtocolEvent::TaskCreated { test_case_id, .. }
            | ProtocolEvent::StreamingUrl { test_case_id, .. }
            | ProtocolEvent::StepProgress { test_case_id, .. }
            | ProtocolEvent::TestComplete { test_case_id, .. }
            | ProtocolEvent::TestError { test_case_id, .. } => Some(test_case_id),
            ProtocolEvent::AllComplete { .. } => None,
        }
    }

    /// True for the two terminal per-test events (`test_complete`/`test_error`).
    pub fn is_terminal_for_test(&self) -> bool {
        matches!(
            self,
            ProtocolEvent::TestComplete { .. } | ProtocolEvent::TestError { .. }
        )
    }
}
