//! Unified activity feed for one orchestration.
//!
//! Merges the control-plane action log (request + completion halves) with
//! orchestration lifecycle events into a single reverse-chronological
//! sequence. Event timestamps arrive as RFC 3339 strings and are normalized
//! to epoch milliseconds before the merge, so ordering is one integer sort.

use serde::{Deserialize, Serialize};

use crate::action::ControlPlaneAction;
use crate::event::OrchestrationEvent;
use crate::reason::{classify, ReasonCode};
use crate::types::{ActionStatus, EntrySource};

/// Default entry cap when the caller does not supply one.
pub const DEFAULT_TIMELINE_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// TimelineEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Source-prefixed composite key, stable across recomputations:
    /// `cpa-req-<action-id>`, `cpa-done-<action-id>`, or `evt-<event-id>`.
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub source: EntrySource,
    /// "request", "success", "failure", or the underlying event type.
    pub category: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Merge action and event records into one feed, most recent first.
///
/// Each action contributes a request entry at `created_at` and, once
/// terminal, a completion entry at `completed_at`; failed completions are
/// annotated with the classified reason code. Each event contributes one
/// entry; events whose `recorded_at` does not parse are skipped. Entries
/// older than `since` (when given) are dropped before the merge. Ties on
/// `timestamp` order by ascending entry id so the feed is deterministic.
pub fn unified_timeline(
    actions: &[ControlPlaneAction],
    events: &[OrchestrationEvent],
    limit: usize,
    since: Option<i64>,
) -> Vec<TimelineEntry> {
    let in_window = |ts: i64| since.is_none_or(|s| ts >= s);
    let mut entries = Vec::new();

    for action in actions {
        if in_window(action.created_at) {
            entries.push(TimelineEntry {
                id: format!("cpa-req-{}", action.id),
                timestamp: action.created_at,
                source: EntrySource::ControlAction,
                category: "request".to_string(),
                summary: format!(
                    "{} requested by {}",
                    action.action_type, action.requested_by
                ),
                detail: payload_text(action),
                status: Some(action.status),
                action_type: Some(action.action_type.clone()),
                reason_code: None,
            });
        }

        if let Some(completed_at) = action.completed_at {
            if in_window(completed_at) {
                let failed = action.status == ActionStatus::Failed;
                entries.push(TimelineEntry {
                    id: format!("cpa-done-{}", action.id),
                    timestamp: completed_at,
                    source: EntrySource::ActionCompletion,
                    category: if failed { "failure" } else { "success" }.to_string(),
                    summary: format!("{} {}", action.action_type, action.status),
                    detail: action.result.clone(),
                    status: Some(action.status),
                    action_type: Some(action.action_type.clone()),
                    reason_code: if failed {
                        action.result.as_deref().and_then(classify)
                    } else {
                        None
                    },
                });
            }
        }
    }

    for event in events {
        let Ok(timestamp) = event.recorded_at_ms() else {
            continue;
        };
        if in_window(timestamp) {
            entries.push(TimelineEntry {
                id: format!("evt-{}", event.id),
                timestamp,
                source: EntrySource::Event,
                category: event.event_type.clone(),
                summary: event.summary.clone(),
                detail: event.detail.clone(),
                status: None,
                action_type: None,
                reason_code: None,
            });
        }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
    entries.truncate(limit);
    entries
}

fn payload_text(action: &ControlPlaneAction) -> Option<String> {
    if action.payload.is_null() {
        None
    } else {
        Some(action.payload.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn action_at(action_type: &str, created_at: i64) -> ControlPlaneAction {
        let mut a = ControlPlaneAction::new(
            action_type,
            "operator",
            serde_json::json!({"arg": 1}),
            Some("orc-1".to_string()),
        );
        a.created_at = created_at;
        a
    }

    fn finished_action(
        action_type: &str,
        created_at: i64,
        completed_at: i64,
        status: ActionStatus,
        result: Option<&str>,
    ) -> ControlPlaneAction {
        let mut a = action_at(action_type, created_at);
        a.status = status;
        a.completed_at = Some(completed_at);
        a.result = result.map(|s| s.to_string());
        a
    }

    fn event_at(event_type: &str, epoch_ms: i64) -> OrchestrationEvent {
        let mut e = OrchestrationEvent::new("orc-1", event_type, format!("{event_type} event"));
        e.recorded_at = chrono::Utc
            .timestamp_millis_opt(epoch_ms)
            .unwrap()
            .to_rfc3339();
        e
    }

    #[test]
    fn request_and_completion_entries_per_action() {
        let actions = [finished_action(
            "pause",
            1_000,
            2_000,
            ActionStatus::Completed,
            Some(r#"{"success":true,"message":"ok"}"#),
        )];
        let feed = unified_timeline(&actions, &[], DEFAULT_TIMELINE_LIMIT, None);

        assert_eq!(feed.len(), 2);
        // Most recent first: completion at 2000, then request at 1000.
        assert_eq!(feed[0].id, format!("cpa-done-{}", actions[0].id));
        assert_eq!(feed[0].category, "success");
        assert_eq!(feed[0].source, EntrySource::ActionCompletion);
        assert_eq!(feed[0].reason_code, None);
        assert_eq!(feed[1].id, format!("cpa-req-{}", actions[0].id));
        assert_eq!(feed[1].category, "request");
        assert_eq!(feed[1].summary, "pause requested by operator");
        assert_eq!(feed[1].detail.as_deref(), Some(r#"{"arg":1}"#));
    }

    #[test]
    fn failed_completion_carries_reason_code() {
        let actions = [finished_action(
            "retry",
            0,
            10,
            ActionStatus::Failed,
            Some(r#"{"success":false,"error_code":"cli_spawn_failed","message":"x"}"#),
        )];
        let feed = unified_timeline(&actions, &[], DEFAULT_TIMELINE_LIMIT, None);
        assert_eq!(feed[0].category, "failure");
        assert_eq!(feed[0].reason_code, Some(ReasonCode::DispatchCliSpawnFailed));
    }

    #[test]
    fn failed_completion_without_result_has_no_reason_code() {
        let actions = [finished_action("retry", 0, 10, ActionStatus::Failed, None)];
        let feed = unified_timeline(&actions, &[], DEFAULT_TIMELINE_LIMIT, None);
        assert_eq!(feed[0].category, "failure");
        assert_eq!(feed[0].reason_code, None);
        assert_eq!(feed[0].detail, None);
    }

    #[test]
    fn event_entries_are_normalized_and_tagged() {
        let mut event = event_at("phase_transition", 5_000);
        event.detail = Some("phase 2 -> 3".to_string());
        let feed = unified_timeline(&[], &[event.clone()], DEFAULT_TIMELINE_LIMIT, None);

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, format!("evt-{}", event.id));
        assert_eq!(feed[0].timestamp, 5_000);
        assert_eq!(feed[0].category, "phase_transition");
        assert_eq!(feed[0].status, None);
        assert_eq!(feed[0].action_type, None);
        assert_eq!(feed[0].reason_code, None);
        assert_eq!(feed[0].detail.as_deref(), Some("phase 2 -> 3"));
    }

    #[test]
    fn unparsable_event_timestamps_are_skipped() {
        let mut event = event_at("launch", 0);
        event.recorded_at = "yesterday-ish".to_string();
        let feed = unified_timeline(&[], &[event], DEFAULT_TIMELINE_LIMIT, None);
        assert!(feed.is_empty());
    }

    #[test]
    fn merge_is_reverse_chronological_across_sources() {
        let actions = [finished_action(
            "pause",
            1_000,
            3_000,
            ActionStatus::Completed,
            None,
        )];
        let events = [event_at("launch", 2_000), event_at("shutdown", 4_000)];
        let feed = unified_timeline(&actions, &events, DEFAULT_TIMELINE_LIMIT, None);

        let timestamps: Vec<i64> = feed.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![4_000, 3_000, 2_000, 1_000]);
    }

    #[test]
    fn ties_order_by_entry_id() {
        let actions = [finished_action(
            "pause",
            1_000,
            2_000,
            ActionStatus::Completed,
            None,
        )];
        let events = [event_at("launch", 2_000)];
        let feed = unified_timeline(&actions, &events, DEFAULT_TIMELINE_LIMIT, None);

        assert_eq!(feed[0].timestamp, 2_000);
        assert_eq!(feed[1].timestamp, 2_000);
        // "cpa-done-…" sorts before "evt-…" at the same millisecond.
        assert!(feed[0].id < feed[1].id);
        assert!(feed[0].id.starts_with("cpa-done-"));
    }

    #[test]
    fn since_filters_each_entry_independently() {
        // Request falls before the cutoff, completion after: only the
        // completion half survives.
        let actions = [finished_action(
            "pause",
            1_000,
            2_000,
            ActionStatus::Completed,
            None,
        )];
        let feed = unified_timeline(&actions, &[], DEFAULT_TIMELINE_LIMIT, Some(1_500));
        assert_eq!(feed.len(), 1);
        assert!(feed[0].id.starts_with("cpa-done-"));
    }

    #[test]
    fn since_is_inclusive() {
        let events = [event_at("launch", 1_000)];
        let feed = unified_timeline(&[], &events, DEFAULT_TIMELINE_LIMIT, Some(1_000));
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let events: Vec<_> = (0..10).map(|i| event_at("tick", i * 100)).collect();
        let feed = unified_timeline(&[], &events, 3, None);
        assert_eq!(feed.len(), 3);
        // The newest three survive.
        assert_eq!(feed[0].timestamp, 900);
        assert_eq!(feed[2].timestamp, 700);
    }

    #[test]
    fn pending_action_emits_only_request() {
        let actions = [action_at("pause", 1_000)];
        let feed = unified_timeline(&actions, &[], DEFAULT_TIMELINE_LIMIT, None);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].category, "request");
        assert_eq!(feed[0].status, Some(ActionStatus::Pending));
    }

    #[test]
    fn empty_inputs_yield_empty_feed() {
        assert!(unified_timeline(&[], &[], DEFAULT_TIMELINE_LIMIT, None).is_empty());
    }
}
