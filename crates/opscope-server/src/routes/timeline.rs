use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use opscope_core::timeline::{unified_timeline, TimelineEntry, DEFAULT_TIMELINE_LIMIT};

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<usize>,
    pub since: Option<i64>,
}

/// GET /api/orchestrations/{id}/timeline — unified activity feed for one
/// orchestration, most recent first.
pub async fn get_timeline(
    Path(orchestration_id): Path<String>,
    State(app): State<AppState>,
    Query(q): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelineEntry>>, AppError> {
    let actions = app.db.actions_for_orchestration(&orchestration_id)?;
    let events = app.db.events_for_orchestration(&orchestration_id)?;
    let limit = q.limit.unwrap_or(DEFAULT_TIMELINE_LIMIT);
    Ok(Json(unified_timeline(&actions, &events, limit, q.since)))
}
