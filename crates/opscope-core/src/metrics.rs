//! Operational metrics over the control-plane action log.
//!
//! Three independent read-only reports: launch success rate, per-type
//! latency percentiles, and failure distribution by reason code. Each is a
//! pure function over an action snapshot (same records and arguments, same
//! result), so callers can recompute them on every store invalidation.
//!
//! Every call re-scans and re-sorts its snapshot (O(n log n), no caching).
//! Fine for control-plane volumes; very large logs would want pre-aggregated
//! rollups instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{ControlPlaneAction, START_ORCHESTRATION};
use crate::reason::classify;
use crate::types::ActionStatus;

/// Reason key for a failed action whose result payload reads as a success.
pub const REASON_UNCLASSIFIED: &str = "unclassified";
/// Reason key for a failed action with no result payload at all.
pub const REASON_UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Launch success rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSuccessReport {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// `succeeded / total` in [0, 1]; `None` when there were no launches in
    /// the window, which is distinct from a true 0.0 rate.
    pub rate: Option<f64>,
}

/// Success rate of orchestration launches created at or after `since`.
///
/// The denominator is every attempted launch in the window, not just the
/// resolved ones — `succeeded + failed` may trail `total` while launches are
/// still in flight. The metric tracks reliability against attempts.
pub fn launch_success_rate(actions: &[ControlPlaneAction], since: i64) -> LaunchSuccessReport {
    let launches: Vec<_> = actions
        .iter()
        .filter(|a| a.action_type == START_ORCHESTRATION && a.created_at >= since)
        .collect();

    let total = launches.len() as u64;
    if total == 0 {
        return LaunchSuccessReport {
            total: 0,
            succeeded: 0,
            failed: 0,
            rate: None,
        };
    }

    let succeeded = launches
        .iter()
        .filter(|a| a.status == ActionStatus::Completed)
        .count() as u64;
    let failed = launches
        .iter()
        .filter(|a| a.status == ActionStatus::Failed)
        .count() as u64;

    LaunchSuccessReport {
        total,
        succeeded,
        failed,
        rate: Some(succeeded as f64 / total as f64),
    }
}

// ---------------------------------------------------------------------------
// Action latency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyReport {
    pub count: u64,
    pub median_ms: i64,
    pub p95_ms: i64,
}

/// Median and p95 completion latency per action type, over actions that
/// reached a terminal state and were created at or after `since`.
///
/// Types with no completed actions are absent from the map rather than
/// zero-filled.
pub fn action_latency(
    actions: &[ControlPlaneAction],
    since: i64,
) -> BTreeMap<String, LatencyReport> {
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for action in actions {
        if action.created_at < since {
            continue;
        }
        if let Some(latency) = action.latency_ms() {
            groups
                .entry(action.action_type.clone())
                .or_default()
                .push(latency);
        }
    }

    groups
        .into_iter()
        .map(|(action_type, mut latencies)| {
            latencies.sort_unstable();
            let report = LatencyReport {
                count: latencies.len() as u64,
                median_ms: median(&latencies),
                p95_ms: p95(&latencies),
            };
            (action_type, report)
        })
        .collect()
}

/// Median of a sorted, non-empty sample, rounded to the nearest integer ms.
/// Even-length samples average the two middle values.
fn median(sorted: &[i64]) -> i64 {
    let n = sorted.len();
    if n % 2 == 0 {
        let mid = (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0;
        mid.round() as i64
    } else {
        sorted[n / 2]
    }
}

/// Nearest-rank p95 of a sorted, non-empty sample. The index is upper-clamped
/// so small samples never read out of bounds; for n = 1 this is the single
/// value.
fn p95(sorted: &[i64]) -> i64 {
    let n = sorted.len();
    let rank = (n as f64 * 0.95).ceil() as usize;
    let index = rank.saturating_sub(1).min(n - 1);
    sorted[index]
}

// ---------------------------------------------------------------------------
// Failure distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDistribution {
    pub total_failed: u64,
    /// action type → reason code → count. BTreeMaps keep iteration order
    /// deterministic; callers should still read this as a set of
    /// (action_type, reason_code, count) triples.
    pub by_action_type: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Count failed actions created at or after `since`, bucketed by action type
/// and classified reason code.
///
/// A failed action with no result payload counts under `"unknown"`; one
/// whose payload classifies as a success (logically inconsistent with the
/// failed status) counts under `"unclassified"`.
pub fn failure_distribution(actions: &[ControlPlaneAction], since: i64) -> FailureDistribution {
    let mut total_failed = 0u64;
    let mut by_action_type: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for action in actions {
        if action.status != ActionStatus::Failed || action.created_at < since {
            continue;
        }
        total_failed += 1;

        let reason = match &action.result {
            Some(result) => classify(result)
                .map(|code| code.as_str().to_string())
                .unwrap_or_else(|| REASON_UNCLASSIFIED.to_string()),
            None => REASON_UNKNOWN.to_string(),
        };

        *by_action_type
            .entry(action.action_type.clone())
            .or_default()
            .entry(reason)
            .or_insert(0) += 1;
    }

    FailureDistribution {
        total_failed,
        by_action_type,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
