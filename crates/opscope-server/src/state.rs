use opscope_core::store::TelemetryDb;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared application state passed to all route handlers.
///
/// Every successful store write sends on `event_tx`; SSE subscribers treat
/// each signal as an invalidation and re-query whatever reports they render.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<TelemetryDb>,
    pub event_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(db: TelemetryDb) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            db: Arc::new(db),
            event_tx: tx,
        }
    }

    /// Signal subscribers that the record set changed.
    pub fn notify_update(&self) {
        let _ = self.event_tx.send(());
    }
}
