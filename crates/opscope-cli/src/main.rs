mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{metrics::MetricsSubcommand, record::RecordSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "opscope",
    about = "Control-plane telemetry — record actions and events, report metrics and timelines",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .opscope/ or .git/)
    #[arg(long, global = true, env = "OPSCOPE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize opscope in the current project
    Init,

    /// Record actions and events (the dispatcher / orchestration intake)
    Record {
        #[command(subcommand)]
        subcommand: RecordSubcommand,
    },

    /// Operational metrics over the action log
    Metrics {
        #[command(subcommand)]
        subcommand: MetricsSubcommand,
    },

    /// Unified activity feed for one orchestration, most recent first
    Timeline {
        orchestration_id: String,

        /// Maximum number of entries
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Only entries at or after this epoch-ms timestamp
        #[arg(long)]
        since: Option<i64>,
    },

    /// Start the telemetry HTTP server
    Serve {
        /// Port to listen on (default: from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Record { subcommand } => cmd::record::run(&root, subcommand, cli.json),
        Commands::Metrics { subcommand } => cmd::metrics::run(&root, subcommand, cli.json),
        Commands::Timeline {
            orchestration_id,
            limit,
            since,
        } => cmd::timeline::run(&root, &orchestration_id, limit, since, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
