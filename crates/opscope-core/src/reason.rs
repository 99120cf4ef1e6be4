//! Reason-code taxonomy for failed control-plane actions.
//!
//! The daemon reports outcomes as loose JSON text; `classify` folds any
//! string, well-formed or not, into a stable set of reason codes, and
//! `Category` groups codes for dashboard rollups by prefix convention.
//! Classification is deterministic and never fails: malformed input is
//! itself a classified outcome, not an error.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DaemonDispatchResult (wire contract, read-only)
// ---------------------------------------------------------------------------

/// Outcome payload the daemon serializes into `ControlPlaneAction.result`.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonDispatchResult {
    pub success: bool,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// ReasonCode
// ---------------------------------------------------------------------------

/// Stable identifier for why an action failed.
///
/// Values are snake_case strings partitioned into categories by prefix:
/// `validation_*`, `dispatch_*`, and everything else grouped as execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Result payload missing, malformed, or carrying an unknown error code.
    DispatchPayloadInvalid,
    /// Daemon did not recognize the action type.
    DispatchUnknownType,
    /// Daemon CLI ran but exited non-zero.
    DispatchCliExitNonzero,
    /// Daemon CLI could not be spawned at all.
    DispatchCliSpawnFailed,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::DispatchPayloadInvalid => "dispatch_payload_invalid",
            ReasonCode::DispatchUnknownType => "dispatch_unknown_type",
            ReasonCode::DispatchCliExitNonzero => "dispatch_cli_exit_nonzero",
            ReasonCode::DispatchCliSpawnFailed => "dispatch_cli_spawn_failed",
        }
    }

    pub fn category(self) -> Category {
        Category::for_code(self.as_str())
    }

    /// Map a daemon `error_code` to a reason code. Codes outside the fixed
    /// table fall back to `DispatchPayloadInvalid`.
    fn from_daemon_code(code: &str) -> ReasonCode {
        match code {
            "payload_missing_field" | "payload_invalid" => ReasonCode::DispatchPayloadInvalid,
            "unknown_action_type" => ReasonCode::DispatchUnknownType,
            "cli_exit_non_zero" => ReasonCode::DispatchCliExitNonzero,
            "cli_spawn_failed" => ReasonCode::DispatchCliSpawnFailed,
            _ => ReasonCode::DispatchPayloadInvalid,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Coarse grouping of reason codes for rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Validation,
    Dispatch,
    Execution,
}

impl Category {
    /// Categorize any code string by prefix. Codes outside the
    /// `validation_*` / `dispatch_*` prefixes land in `Execution`,
    /// unrecognized ones included.
    pub fn for_code(code: &str) -> Category {
        if code.starts_with("validation_") {
            Category::Validation
        } else if code.starts_with("dispatch_") {
            Category::Dispatch
        } else {
            Category::Execution
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Validation => "validation",
            Category::Dispatch => "dispatch",
            Category::Execution => "execution",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Translate a raw daemon result payload into a reason code.
///
/// Returns `None` for a successful outcome. Total over any input string:
/// unparsable text (including the empty string) classifies as
/// `DispatchPayloadInvalid` rather than erroring.
pub fn classify(result_json: &str) -> Option<ReasonCode> {
    let parsed: DaemonDispatchResult = match serde_json::from_str(result_json) {
        Ok(p) => p,
        Err(_) => return Some(ReasonCode::DispatchPayloadInvalid),
    };

    if parsed.success {
        return None;
    }

    match parsed.error_code.as_deref() {
        Some(code) => Some(ReasonCode::from_daemon_code(code)),
        None => Some(ReasonCode::DispatchCliExitNonzero),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
