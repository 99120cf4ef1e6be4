use crate::output::print_json;
use anyhow::Context;
use chrono::TimeZone;
use opscope_core::{config::Config, store::TelemetryDb, timeline::unified_timeline};
use std::path::Path;

pub fn run(
    root: &Path,
    orchestration_id: &str,
    limit: usize,
    since: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db = TelemetryDb::open(&config.db_path(root)).context("failed to open telemetry db")?;

    let actions = db
        .actions_for_orchestration(orchestration_id)
        .context("failed to read action log")?;
    let events = db
        .events_for_orchestration(orchestration_id)
        .context("failed to read event log")?;
    let entries = unified_timeline(&actions, &events, limit, since);

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No activity for '{orchestration_id}'.");
        return Ok(());
    }

    for entry in &entries {
        let when = chrono::Utc
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());
        let reason = entry
            .reason_code
            .map(|code| format!("  [{code}]"))
            .unwrap_or_default();
        println!("{when}  {:<10} {}{reason}", entry.category, entry.summary);
    }
    Ok(())
}
