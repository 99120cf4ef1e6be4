//! Orchestration lifecycle events.
//!
//! Written by the external orchestration process (launch, shutdown, phase
//! transitions) and immutable once recorded. The `recorded_at` field is the
//! RFC 3339 string the process emits; it is normalized to epoch milliseconds
//! at ingestion so the timeline merge is a plain integer sort.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OpscopeError, Result};

// ---------------------------------------------------------------------------
// OrchestrationEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    pub id: Uuid,
    pub orchestration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_number: Option<u32>,
    /// Free-form lifecycle tag, e.g. "launch", "shutdown", "phase_transition".
    pub event_type: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// RFC 3339 timestamp as emitted by the orchestration process.
    pub recorded_at: String,
}

impl OrchestrationEvent {
    /// Create a new event stamped with the current time.
    pub fn new(
        orchestration_id: impl Into<String>,
        event_type: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestration_id: orchestration_id.into(),
            phase_number: None,
            event_type: event_type.into(),
            summary: summary.into(),
            detail: None,
            recorded_at: Utc::now().to_rfc3339(),
        }
    }

    /// `recorded_at` as epoch milliseconds.
    pub fn recorded_at_ms(&self) -> Result<i64> {
        chrono::DateTime::parse_from_rfc3339(&self.recorded_at)
            .map(|dt| dt.timestamp_millis())
            .map_err(|_| OpscopeError::InvalidTimestamp(self.recorded_at.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_at_ms_parses_rfc3339() {
        let mut event = OrchestrationEvent::new("orc-1", "launch", "orchestration launched");
        event.recorded_at = "1970-01-01T00:00:01Z".to_string();
        assert_eq!(event.recorded_at_ms().unwrap(), 1_000);
    }

    #[test]
    fn recorded_at_ms_honors_offsets() {
        let mut event = OrchestrationEvent::new("orc-1", "shutdown", "done");
        event.recorded_at = "1970-01-01T01:00:00+01:00".to_string();
        assert_eq!(event.recorded_at_ms().unwrap(), 0);
    }

    #[test]
    fn recorded_at_ms_rejects_garbage() {
        let mut event = OrchestrationEvent::new("orc-1", "launch", "x");
        event.recorded_at = "not-a-timestamp".to_string();
        assert!(matches!(
            event.recorded_at_ms(),
            Err(OpscopeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn new_event_records_parseable_now() {
        let event = OrchestrationEvent::new("orc-1", "launch", "started");
        assert!(event.recorded_at_ms().is_ok());
    }

    #[test]
    fn json_roundtrip() {
        let mut event = OrchestrationEvent::new("orc-2", "phase_transition", "phase 3 -> 4");
        event.phase_number = Some(4);
        event.detail = Some("worker pool resized".to_string());
        let json = serde_json::to_string(&event).unwrap();
        let parsed: OrchestrationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.phase_number, Some(4));
        assert_eq!(parsed.event_type, "phase_transition");
    }
}
