use anyhow::Context;
use opscope_core::{config::Config, store::TelemetryDb};
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db = TelemetryDb::open(&config.db_path(root)).context("failed to open telemetry db")?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(opscope_server::serve(db, port))
}
