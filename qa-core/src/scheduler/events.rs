//! Small constructors wrapping `qa_protocol::ProtocolEvent` so the scheduler body reads as
//! "emit a TestStart" rather than repeating the enum's field list at each call site.

use qa_protocol::event::AllCompleteSummary;
use qa_protocol::ProtocolEvent;
use serde_json::Value;

pub fn test_start(test_case_id: &str, resolved_account_id: Option<String>) -> ProtocolEvent {
    ProtocolEvent::TestStart {
        test_case_id: test_case_id.to_string(),
        resolved_user_account_id: resolved_account_id,
    }
}

pub fn task_created(
    test_case_id: &str,
    task_id: String,
    session_id: String,
    resolved_account_id: Option<String>,
) -> ProtocolEvent {
    ProtocolEvent::TaskCreated {
        test_case_id: test_case_id.to_string(),
        task_id,
        session_id,
        resolved_user_account_id: resolved_account_id,
    }
}

pub fn streaming_url(
    test_case_id: &str,
    streaming_url: String,
    recording_url: Option<String>,
) -> ProtocolEvent {
    ProtocolEvent::StreamingUrl {
        test_case_id: test_case_id.to_string(),
        streaming_url,
        recording_url,
    }
}

pub fn step_progress(
    test_case_id: &str,
    current_step: u32,
    total_steps: u32,
    step_description: String,
) -> ProtocolEvent {
    ProtocolEvent::StepProgress {
        test_case_id: test_case_id.to_string(),
        current_step,
        total_steps,
        step_description,
    }
}

pub fn test_complete(test_case_id: &str, result: Value) -> ProtocolEvent {
    ProtocolEvent::TestComplete {
        test_case_id: test_case_id.to_string(),
        result,
    }
}

pub fn test_error(test_case_id: &str, error: String, result: Option<Value>) -> ProtocolEvent {
    ProtocolEvent::TestError {
        test_case_id: test_case_id.to_string(),
        error,
        result,
    }
}

pub fn all_complete(total: u32, passed: u32, failed: u32, skipped: u32, duration_ms: u64) -> ProtocolEvent {
    ProtocolEvent::AllComplete {
        summary: AllCompleteSummary {
            total,
            passed,
            failed,
            skipped,
            duration_ms,
        },
    }
}
