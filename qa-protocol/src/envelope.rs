//! Envelope (run_id, event_id) injected into each stream event before it goes over the wire.
//! Grounded on stream-event's session/node envelope; here the run id is constant for the
//! whole batch and the sequence number is per-event monotonic.

use crate::event::ProtocolEvent;
use serde_json::Value;

/// Per-run envelope state: assigns a monotonically increasing `event_id` to each event.
pub struct EnvelopeState {
    pub run_id: String,
    pub next_event_id: u64,
}

impl EnvelopeState {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            next_event_id: 1,
        }
    }

    /// Converts an event to JSON and injects `run_id`/`event_id`, advancing the sequence.
    pub fn to_json(&mut self, event: &ProtocolEvent) -> Result<Value, serde_json::Error> {
        let mut value = event.to_value()?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("run_id".to_string(), Value::String(self.run_id.clone()));
            obj.insert(
                "event_id".to_string(),
                Value::Number(serde_json::Number::from(self.next_event_id)),
            );
        }
        self.next_event_id += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ProtocolEvent;

    #[test]
    fn injects_run_id_and_increments_event_id() {
        let mut state = EnvelopeState::new("run-1".into());
        let ev = ProtocolEvent::TestStart {
            test_case_id: "tc-1".into(),
            resolved_user_account_id: None,
        };
        let first = state.to_json(&ev).unwrap();
        let second = state.to_json(&ev).unwrap();
        assert_eq!(first["run_id"], "run-1");
        assert_eq!(first["event_id"], 1);
        assert_eq!(second["event_id"], 2);
    }
}
