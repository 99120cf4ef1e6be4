use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use opscope_core::{
    action::ControlPlaneAction, config::Config, event::OrchestrationEvent, store::TelemetryDb,
    types::ActionStatus,
};
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum RecordSubcommand {
    /// Record a new control-plane action in pending state
    Action {
        /// Action type, e.g. start_orchestration, pause, resume, retry
        action_type: String,

        /// Identity submitting the action
        #[arg(long, default_value = "cli")]
        requested_by: String,

        /// Request payload as JSON text
        #[arg(long)]
        payload: Option<String>,

        /// Orchestration the action targets
        #[arg(long)]
        orchestration: Option<String>,
    },
    /// Apply the terminal transition to an action
    Finish {
        id: Uuid,

        /// Terminal status: completed or failed
        status: ActionStatus,

        /// Completion time in epoch ms (default: now)
        #[arg(long)]
        completed_at: Option<i64>,

        /// Raw daemon result payload as JSON text
        #[arg(long)]
        result: Option<String>,
    },
    /// Record an orchestration lifecycle event
    Event {
        orchestration_id: String,

        /// Lifecycle tag, e.g. launch, shutdown, phase_transition
        event_type: String,

        /// Human-readable summary
        summary: String,

        #[arg(long)]
        detail: Option<String>,

        #[arg(long)]
        phase: Option<u32>,

        /// RFC 3339 timestamp (default: now)
        #[arg(long)]
        recorded_at: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: RecordSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db = TelemetryDb::open(&config.db_path(root)).context("failed to open telemetry db")?;

    match subcmd {
        RecordSubcommand::Action {
            action_type,
            requested_by,
            payload,
            orchestration,
        } => {
            let payload = match payload {
                Some(text) => {
                    serde_json::from_str(&text).context("payload is not valid JSON")?
                }
                None => serde_json::Value::Null,
            };
            let action =
                ControlPlaneAction::new(action_type, requested_by, payload, orchestration);
            db.insert_action(&action)?;

            if json {
                return print_json(&action);
            }
            println!("Recorded action {} ({})", action.id, action.action_type);
            Ok(())
        }
        RecordSubcommand::Finish {
            id,
            status,
            completed_at,
            result,
        } => {
            let completed_at = completed_at.unwrap_or_else(|| Utc::now().timestamp_millis());
            let updated = db.finish_action(id, status, completed_at, result)?;

            if json {
                return print_json(&updated);
            }
            println!("Action {} {}", updated.id, updated.status);
            Ok(())
        }
        RecordSubcommand::Event {
            orchestration_id,
            event_type,
            summary,
            detail,
            phase,
            recorded_at,
        } => {
            let mut event = OrchestrationEvent::new(orchestration_id, event_type, summary);
            event.detail = detail;
            event.phase_number = phase;
            if let Some(at) = recorded_at {
                event.recorded_at = at;
            }
            db.insert_event(&event)?;

            if json {
                return print_json(&event);
            }
            println!(
                "Recorded event {} ({} / {})",
                event.id, event.orchestration_id, event.event_type
            );
            Ok(())
        }
    }
}
