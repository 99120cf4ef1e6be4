//! Control-plane action records.
//!
//! An action is a command submitted for execution by the orchestration
//! daemon (start, pause, resume, retry, task mutations). The dispatch path
//! creates the record in `Pending` state and mutates it exactly once, on the
//! terminal transition. Metrics and the timeline treat the log as
//! append-only input.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ActionStatus;

/// Action type of an orchestration launch, selected by the success-rate metric.
pub const START_ORCHESTRATION: &str = "start_orchestration";

// ---------------------------------------------------------------------------
// ControlPlaneAction
// ---------------------------------------------------------------------------

/// One command tracked from submission through terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneAction {
    pub id: Uuid,
    /// Orchestration the action targets, when it targets one. Used as the
    /// scope key by the timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_id: Option<String>,
    /// Open identifier, e.g. "start_orchestration", "pause", "retry".
    pub action_type: String,
    pub status: ActionStatus,
    /// Epoch milliseconds. Timestamps are normalized to epoch ms at the
    /// record boundary so downstream merges are plain integer sorts.
    pub created_at: i64,
    /// Epoch milliseconds, present iff `status` is terminal.
    /// Invariant: `completed_at >= created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub requested_by: String,
    /// Opaque request JSON, never interpreted by this crate.
    pub payload: serde_json::Value,
    /// Raw daemon response JSON text, interpreted only by the classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ControlPlaneAction {
    /// Create a new pending action stamped with the current time.
    pub fn new(
        action_type: impl Into<String>,
        requested_by: impl Into<String>,
        payload: serde_json::Value,
        orchestration_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestration_id,
            action_type: action_type.into(),
            status: ActionStatus::Pending,
            created_at: Utc::now().timestamp_millis(),
            completed_at: None,
            requested_by: requested_by.into(),
            payload,
            result: None,
        }
    }

    /// Wall-clock latency in milliseconds, when the action has completed.
    pub fn latency_ms(&self) -> Option<i64> {
        self.completed_at.map(|done| done - self.created_at)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_action_is_pending_without_completion() {
        let action = ControlPlaneAction::new(
            "pause",
            "operator@example.com",
            serde_json::json!({"orchestration": "orc-1"}),
            Some("orc-1".to_string()),
        );
        assert_eq!(action.status, ActionStatus::Pending);
        assert!(action.completed_at.is_none());
        assert!(action.result.is_none());
        assert!(action.latency_ms().is_none());
    }

    #[test]
    fn latency_is_completion_minus_creation() {
        let mut action =
            ControlPlaneAction::new("retry", "ops", serde_json::Value::Null, None);
        action.created_at = 1_000;
        action.completed_at = Some(1_350);
        assert_eq!(action.latency_ms(), Some(350));
    }

    #[test]
    fn json_roundtrip() {
        let action = ControlPlaneAction::new(
            START_ORCHESTRATION,
            "scheduler",
            serde_json::json!({"plan": "nightly"}),
            None,
        );
        let json = serde_json::to_string(&action).unwrap();
        let parsed: ControlPlaneAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, action.id);
        assert_eq!(parsed.action_type, START_ORCHESTRATION);
        assert_eq!(parsed.status, ActionStatus::Pending);
        assert_eq!(parsed.payload["plan"], "nightly");
    }

    #[test]
    fn optional_fields_omitted_when_absent() {
        let action = ControlPlaneAction::new("pause", "ops", serde_json::Value::Null, None);
        let json = serde_json::to_string(&action).unwrap();
        assert!(!json.contains("completed_at"));
        assert!(!json.contains("orchestration_id"));
        assert!(!json.contains("result"));
    }
}
