use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ActionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a control-plane action.
///
/// Transitions: `Pending → Dispatched → Completed | Failed`
///
/// The dispatcher owns the pending/dispatched semantics; this crate only
/// reads them. `completed_at` is set exactly when the status is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Accepted by the control plane, not yet handed to the daemon.
    Pending,
    /// Handed to the daemon, awaiting its outcome.
    Dispatched,
    /// Daemon reported success.
    Completed,
    /// Daemon reported failure or the dispatch itself failed.
    Failed,
}

impl ActionStatus {
    pub fn all() -> &'static [ActionStatus] {
        &[
            ActionStatus::Pending,
            ActionStatus::Dispatched,
            ActionStatus::Completed,
            ActionStatus::Failed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Dispatched => "dispatched",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Failed)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionStatus {
    type Err = crate::error::OpscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActionStatus::Pending),
            "dispatched" => Ok(ActionStatus::Dispatched),
            "completed" => Ok(ActionStatus::Completed),
            "failed" => Ok(ActionStatus::Failed),
            _ => Err(crate::error::OpscopeError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EntrySource
// ---------------------------------------------------------------------------

/// Which record stream a timeline entry was projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// The request half of a control-plane action.
    ControlAction,
    /// The terminal half of a control-plane action.
    ActionCompletion,
    /// An orchestration lifecycle event.
    Event,
}

impl EntrySource {
    pub fn as_str(self) -> &'static str {
        match self {
            EntrySource::ControlAction => "control_action",
            EntrySource::ActionCompletion => "action_completion",
            EntrySource::Event => "event",
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
