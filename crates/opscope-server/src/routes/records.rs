//! Record intake and raw views.
//!
//! The external dispatcher posts actions and their terminal transitions
//! here; the orchestration process posts lifecycle events. Every successful
//! write broadcasts an invalidation signal so SSE subscribers re-query.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use opscope_core::action::ControlPlaneAction;
use opscope_core::event::OrchestrationEvent;
use opscope_core::types::ActionStatus;

use crate::{error::AppError, state::AppState};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateActionRequest {
    pub action_type: String,
    pub requested_by: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub orchestration_id: Option<String>,
}

/// POST /api/actions — the dispatch path creates a pending action record.
pub async fn create_action(
    State(app): State<AppState>,
    Json(body): Json<CreateActionRequest>,
) -> Result<(StatusCode, Json<ControlPlaneAction>), AppError> {
    if body.action_type.trim().is_empty() {
        return Err(AppError::bad_request("action_type must not be empty"));
    }
    if body.requested_by.trim().is_empty() {
        return Err(AppError::bad_request("requested_by must not be empty"));
    }

    let action = ControlPlaneAction::new(
        body.action_type,
        body.requested_by,
        body.payload,
        body.orchestration_id,
    );
    app.db.insert_action(&action)?;
    app.notify_update();
    info!(id = %action.id, action_type = %action.action_type, "action recorded");
    Ok((StatusCode::CREATED, Json(action)))
}

#[derive(Deserialize)]
pub struct FinishActionRequest {
    pub status: ActionStatus,
    /// Epoch ms; defaults to now.
    #[serde(default)]
    pub completed_at: Option<i64>,
    /// Raw daemon response JSON text.
    #[serde(default)]
    pub result: Option<String>,
}

/// POST /api/actions/{id}/finish — the dispatcher's single terminal
/// mutation: terminal status, completion time, raw daemon result.
pub async fn finish_action(
    Path(id): Path<Uuid>,
    State(app): State<AppState>,
    Json(body): Json<FinishActionRequest>,
) -> Result<Json<ControlPlaneAction>, AppError> {
    let completed_at = body
        .completed_at
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    let updated = app
        .db
        .finish_action(id, body.status, completed_at, body.result)?;
    app.notify_update();
    info!(id = %id, status = %updated.status, "action finished");
    Ok(Json(updated))
}

/// GET /api/actions — the full action log, creation order.
pub async fn list_actions(
    State(app): State<AppState>,
) -> Result<Json<Vec<ControlPlaneAction>>, AppError> {
    Ok(Json(app.db.list_actions()?))
}

// ---------------------------------------------------------------------------
// Orchestration events
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub event_type: String,
    pub summary: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub phase_number: Option<u32>,
    /// RFC 3339; defaults to now.
    #[serde(default)]
    pub recorded_at: Option<String>,
}

/// POST /api/orchestrations/{id}/events — the orchestration process records
/// a lifecycle event.
pub async fn create_event(
    Path(orchestration_id): Path<String>,
    State(app): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<OrchestrationEvent>), AppError> {
    if body.event_type.trim().is_empty() {
        return Err(AppError::bad_request("event_type must not be empty"));
    }

    let mut event = OrchestrationEvent::new(orchestration_id, body.event_type, body.summary);
    event.detail = body.detail;
    event.phase_number = body.phase_number;
    if let Some(recorded_at) = body.recorded_at {
        event.recorded_at = recorded_at;
    }

    app.db.insert_event(&event)?;
    app.notify_update();
    info!(id = %event.id, orchestration = %event.orchestration_id, event_type = %event.event_type, "event recorded");
    Ok((StatusCode::CREATED, Json(event)))
}
