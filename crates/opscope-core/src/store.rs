//! Persistent storage for action and event records using redb.
//!
//! # Table design
//!
//! Both tables use a 24-byte composite key:
//! ```text
//! [ timestamp_ms: u64 big-endian (8 bytes) | uuid: 16 bytes ]
//! ```
//!
//! With the timestamp in the high bytes, byte ordering equals time ordering,
//! so a plain table scan returns actions in creation order and events in
//! recorded order with no post-sort. Event keys are derived from the
//! RFC 3339 `recorded_at` normalized to epoch milliseconds at insert, which
//! also rejects unparsable timestamps at the write boundary.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::action::ControlPlaneAction;
use crate::error::{OpscopeError, Result};
use crate::event::OrchestrationEvent;
use crate::types::ActionStatus;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: 24-byte composite (created_at ms big-endian ++ uuid bytes)
/// Value: JSON-encoded ControlPlaneAction
const ACTIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("actions");

/// Key: 24-byte composite (recorded_at ms big-endian ++ uuid bytes)
/// Value: JSON-encoded OrchestrationEvent
const EVENTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("events");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn composite_key(ts_ms: i64, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    let ms = ts_ms.max(0) as u64;
    key[..8].copy_from_slice(&ms.to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

// ---------------------------------------------------------------------------
// TelemetryDb
// ---------------------------------------------------------------------------

/// Record store for the control-plane action log and orchestration events.
///
/// The dispatch path creates actions and performs their single terminal
/// mutation; the orchestration process appends events. All readers get
/// time-ordered snapshots for the analytics layer to fold over.
pub struct TelemetryDb {
    db: Database,
}

impl TelemetryDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates both tables if they don't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| OpscopeError::Store(e.to_string()))?;
        let wt = db
            .begin_write()
            .map_err(|e| OpscopeError::Store(e.to_string()))?;
        wt.open_table(ACTIONS)
            .map_err(|e| OpscopeError::Store(e.to_string()))?;
        wt.open_table(EVENTS)
            .map_err(|e| OpscopeError::Store(e.to_string()))?;
        wt.commit().map_err(|e| OpscopeError::Store(e.to_string()))?;
        Ok(Self { db })
    }

    /// Insert a new action record. The key is derived from `created_at`.
    pub fn insert_action(&self, action: &ControlPlaneAction) -> Result<()> {
        let key = composite_key(action.created_at, action.id);
        let value = serde_json::to_vec(action)?;
        self.put(ACTIONS, &key, &value)
    }

    /// Apply the terminal transition to an action: set a terminal status,
    /// the completion timestamp, and the raw daemon result payload.
    ///
    /// Rejects non-terminal statuses, repeated completion, and completion
    /// times before the creation time. Returns the updated record.
    pub fn finish_action(
        &self,
        id: Uuid,
        status: ActionStatus,
        completed_at: i64,
        result: Option<String>,
    ) -> Result<ControlPlaneAction> {
        if !status.is_terminal() {
            return Err(OpscopeError::NonTerminalStatus(status.to_string()));
        }

        let mut action = self
            .list_actions()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(OpscopeError::ActionNotFound(id))?;

        if action.completed_at.is_some() {
            return Err(OpscopeError::ActionAlreadyCompleted(id));
        }
        if completed_at < action.created_at {
            return Err(OpscopeError::CompletionBeforeCreation {
                id,
                created_at: action.created_at,
                completed_at,
            });
        }

        action.status = status;
        action.completed_at = Some(completed_at);
        action.result = result;

        let key = composite_key(action.created_at, action.id);
        let value = serde_json::to_vec(&action)?;
        self.put(ACTIONS, &key, &value)?;
        Ok(action)
    }

    /// Insert an orchestration event. The key is derived from `recorded_at`,
    /// so an unparsable timestamp is rejected here rather than surfacing
    /// later in the timeline.
    pub fn insert_event(&self, event: &OrchestrationEvent) -> Result<()> {
        let ts = event.recorded_at_ms()?;
        let key = composite_key(ts, event.id);
        let value = serde_json::to_vec(event)?;
        self.put(EVENTS, &key, &value)
    }

    /// All actions in creation order (oldest first).
    pub fn list_actions(&self) -> Result<Vec<ControlPlaneAction>> {
        self.scan(ACTIONS)
    }

    /// Actions targeting one orchestration, in creation order.
    pub fn actions_for_orchestration(
        &self,
        orchestration_id: &str,
    ) -> Result<Vec<ControlPlaneAction>> {
        let mut actions = self.list_actions()?;
        actions.retain(|a| a.orchestration_id.as_deref() == Some(orchestration_id));
        Ok(actions)
    }

    /// Events for one orchestration, in recorded order (oldest first).
    pub fn events_for_orchestration(
        &self,
        orchestration_id: &str,
    ) -> Result<Vec<OrchestrationEvent>> {
        let mut events: Vec<OrchestrationEvent> = self.scan(EVENTS)?;
        events.retain(|e| e.orchestration_id == orchestration_id);
        Ok(events)
    }

    fn put(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        key: &[u8; 24],
        value: &[u8],
    ) -> Result<()> {
        let wt = self
            .db
            .begin_write()
            .map_err(|e| OpscopeError::Store(e.to_string()))?;
        {
            let mut t = wt
                .open_table(table)
                .map_err(|e| OpscopeError::Store(e.to_string()))?;
            t.insert(key.as_slice(), value)
                .map_err(|e| OpscopeError::Store(e.to_string()))?;
        }
        wt.commit().map_err(|e| OpscopeError::Store(e.to_string()))?;
        Ok(())
    }

    fn scan<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
    ) -> Result<Vec<T>> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| OpscopeError::Store(e.to_string()))?;
        let t = rt
            .open_table(table)
            .map_err(|e| OpscopeError::Store(e.to_string()))?;

        let mut result = Vec::new();
        for entry in t.iter().map_err(|e| OpscopeError::Store(e.to_string()))? {
            let (_, v) = entry.map_err(|e| OpscopeError::Store(e.to_string()))?;
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, TelemetryDb) {
        let dir = TempDir::new().unwrap();
        let db = TelemetryDb::open(&dir.path().join("telemetry.redb")).unwrap();
        (dir, db)
    }

    fn action_at(action_type: &str, created_at: i64) -> ControlPlaneAction {
        let mut a = ControlPlaneAction::new(
            action_type,
            "tester",
            serde_json::json!({}),
            Some("orc-1".to_string()),
        );
        a.created_at = created_at;
        a
    }

    #[test]
    fn actions_come_back_in_creation_order() {
        let (_dir, db) = open_tmp();
        // Insert out of order; key design restores creation order.
        db.insert_action(&action_at("resume", 2_000)).unwrap();
        db.insert_action(&action_at("pause", 1_000)).unwrap();

        let actions = db.list_actions().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type, "pause");
        assert_eq!(actions[1].action_type, "resume");
    }

    #[test]
    fn finish_action_sets_terminal_fields() {
        let (_dir, db) = open_tmp();
        let action = action_at("pause", 1_000);
        db.insert_action(&action).unwrap();

        let updated = db
            .finish_action(
                action.id,
                ActionStatus::Failed,
                1_250,
                Some(r#"{"success":false,"message":"x"}"#.to_string()),
            )
            .unwrap();
        assert_eq!(updated.status, ActionStatus::Failed);
        assert_eq!(updated.completed_at, Some(1_250));

        let actions = db.list_actions().unwrap();
        assert_eq!(actions[0].status, ActionStatus::Failed);
        assert_eq!(actions[0].latency_ms(), Some(250));
        assert!(actions[0].result.is_some());
    }

    #[test]
    fn finish_action_rejects_non_terminal_status() {
        let (_dir, db) = open_tmp();
        let action = action_at("pause", 1_000);
        db.insert_action(&action).unwrap();

        let err = db
            .finish_action(action.id, ActionStatus::Dispatched, 1_100, None)
            .unwrap_err();
        assert!(matches!(err, OpscopeError::NonTerminalStatus(_)));
    }

    #[test]
    fn finish_action_rejects_double_completion() {
        let (_dir, db) = open_tmp();
        let action = action_at("pause", 1_000);
        db.insert_action(&action).unwrap();
        db.finish_action(action.id, ActionStatus::Completed, 1_100, None)
            .unwrap();

        let err = db
            .finish_action(action.id, ActionStatus::Failed, 1_200, None)
            .unwrap_err();
        assert!(matches!(err, OpscopeError::ActionAlreadyCompleted(_)));
    }

    #[test]
    fn finish_action_rejects_completion_before_creation() {
        let (_dir, db) = open_tmp();
        let action = action_at("pause", 1_000);
        db.insert_action(&action).unwrap();

        let err = db
            .finish_action(action.id, ActionStatus::Completed, 900, None)
            .unwrap_err();
        assert!(matches!(
            err,
            OpscopeError::CompletionBeforeCreation { .. }
        ));
    }

    #[test]
    fn finish_action_unknown_id_is_not_found() {
        let (_dir, db) = open_tmp();
        let err = db
            .finish_action(Uuid::new_v4(), ActionStatus::Completed, 1, None)
            .unwrap_err();
        assert!(matches!(err, OpscopeError::ActionNotFound(_)));
    }

    #[test]
    fn actions_filtered_by_orchestration() {
        let (_dir, db) = open_tmp();
        let mut other = action_at("pause", 500);
        other.orchestration_id = Some("orc-2".to_string());
        let mut unscoped = action_at("retry", 600);
        unscoped.orchestration_id = None;
        db.insert_action(&action_at("pause", 400)).unwrap();
        db.insert_action(&other).unwrap();
        db.insert_action(&unscoped).unwrap();

        let scoped = db.actions_for_orchestration("orc-1").unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].created_at, 400);
    }

    #[test]
    fn events_come_back_in_recorded_order() {
        let (_dir, db) = open_tmp();
        let mut late = OrchestrationEvent::new("orc-1", "shutdown", "done");
        late.recorded_at = "2026-01-01T00:00:02Z".to_string();
        let mut early = OrchestrationEvent::new("orc-1", "launch", "started");
        early.recorded_at = "2026-01-01T00:00:01Z".to_string();
        db.insert_event(&late).unwrap();
        db.insert_event(&early).unwrap();

        let events = db.events_for_orchestration("orc-1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "launch");
        assert_eq!(events[1].event_type, "shutdown");
    }

    #[test]
    fn events_filtered_by_orchestration() {
        let (_dir, db) = open_tmp();
        db.insert_event(&OrchestrationEvent::new("orc-1", "launch", "a"))
            .unwrap();
        db.insert_event(&OrchestrationEvent::new("orc-2", "launch", "b"))
            .unwrap();

        assert_eq!(db.events_for_orchestration("orc-1").unwrap().len(), 1);
        assert_eq!(db.events_for_orchestration("orc-3").unwrap().len(), 0);
    }

    #[test]
    fn insert_event_rejects_bad_timestamp() {
        let (_dir, db) = open_tmp();
        let mut event = OrchestrationEvent::new("orc-1", "launch", "x");
        event.recorded_at = "not a timestamp".to_string();
        assert!(matches!(
            db.insert_event(&event).unwrap_err(),
            OpscopeError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn empty_db_lists_nothing() {
        let (_dir, db) = open_tmp();
        assert!(db.list_actions().unwrap().is_empty());
        assert!(db.events_for_orchestration("orc-1").unwrap().is_empty());
    }
}
