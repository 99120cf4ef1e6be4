use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use opscope_core::{
    config::Config,
    metrics::{action_latency, failure_distribution, launch_success_rate},
    store::TelemetryDb,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum MetricsSubcommand {
    /// Success rate of orchestration launches
    Launch {
        /// Only actions created at or after this epoch-ms timestamp
        #[arg(long, default_value_t = 0)]
        since: i64,
    },
    /// Median/p95 completion latency per action type
    Latency {
        /// Only actions created at or after this epoch-ms timestamp
        #[arg(long, default_value_t = 0)]
        since: i64,
    },
    /// Failed actions by type and reason code
    Failures {
        /// Only actions created at or after this epoch-ms timestamp
        #[arg(long, default_value_t = 0)]
        since: i64,
    },
}

pub fn run(root: &Path, subcmd: MetricsSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db = TelemetryDb::open(&config.db_path(root)).context("failed to open telemetry db")?;
    let actions = db.list_actions().context("failed to read action log")?;

    match subcmd {
        MetricsSubcommand::Launch { since } => {
            let report = launch_success_rate(&actions, since);
            if json {
                return print_json(&report);
            }
            match report.rate {
                Some(rate) => println!(
                    "{} launches: {} succeeded, {} failed ({:.1}% success)",
                    report.total,
                    report.succeeded,
                    report.failed,
                    rate * 100.0
                ),
                None => println!("No launches recorded."),
            }
            Ok(())
        }
        MetricsSubcommand::Latency { since } => {
            let reports = action_latency(&actions, since);
            if json {
                return print_json(&reports);
            }
            if reports.is_empty() {
                println!("No completed actions.");
                return Ok(());
            }
            let rows = reports
                .iter()
                .map(|(action_type, r)| {
                    vec![
                        action_type.clone(),
                        r.count.to_string(),
                        r.median_ms.to_string(),
                        r.p95_ms.to_string(),
                    ]
                })
                .collect();
            print_table(&["ACTION TYPE", "COUNT", "MEDIAN MS", "P95 MS"], rows);
            Ok(())
        }
        MetricsSubcommand::Failures { since } => {
            let dist = failure_distribution(&actions, since);
            if json {
                return print_json(&dist);
            }
            if dist.total_failed == 0 {
                println!("No failed actions.");
                return Ok(());
            }
            println!("{} failed actions:", dist.total_failed);
            let rows = dist
                .by_action_type
                .iter()
                .flat_map(|(action_type, reasons)| {
                    reasons.iter().map(|(reason, count)| {
                        vec![action_type.clone(), reason.clone(), count.to_string()]
                    })
                })
                .collect();
            print_table(&["ACTION TYPE", "REASON", "COUNT"], rows);
            Ok(())
        }
    }
}
