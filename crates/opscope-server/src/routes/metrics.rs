use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;

use opscope_core::metrics::{self, FailureDistribution, LatencyReport, LaunchSuccessReport};

use crate::{error::AppError, state::AppState};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Shared `?since=` window for all three reports. Inclusive lower bound on
/// `created_at` in epoch ms; omitted means no lower bound.
#[derive(Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub since: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/metrics/launch-success — success rate of orchestration launches.
pub async fn launch_success(
    State(app): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<LaunchSuccessReport>, AppError> {
    let actions = app.db.list_actions()?;
    Ok(Json(metrics::launch_success_rate(&actions, q.since)))
}

/// GET /api/metrics/latency — median/p95 completion latency per action type.
pub async fn latency(
    State(app): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<BTreeMap<String, LatencyReport>>, AppError> {
    let actions = app.db.list_actions()?;
    Ok(Json(metrics::action_latency(&actions, q.since)))
}

/// GET /api/metrics/failures — failed actions by type and reason code.
pub async fn failures(
    State(app): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> Result<Json<FailureDistribution>, AppError> {
    let actions = app.db.list_actions()?;
    Ok(Json(metrics::failure_distribution(&actions, q.since)))
}
