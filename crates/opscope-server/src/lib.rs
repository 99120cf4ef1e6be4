pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use opscope_core::store::TelemetryDb;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(db: TelemetryDb) -> Router {
    let app_state = state::AppState::new(db);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Invalidation stream (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Record intake + raw log
        .route("/api/actions", get(routes::records::list_actions))
        .route("/api/actions", post(routes::records::create_action))
        .route(
            "/api/actions/{id}/finish",
            post(routes::records::finish_action),
        )
        .route(
            "/api/orchestrations/{id}/events",
            post(routes::records::create_event),
        )
        // Reports
        .route(
            "/api/orchestrations/{id}/timeline",
            get(routes::timeline::get_timeline),
        )
        .route(
            "/api/metrics/launch-success",
            get(routes::metrics::launch_success),
        )
        .route("/api/metrics/latency", get(routes::metrics::latency))
        .route("/api/metrics/failures", get(routes::metrics::failures))
        .layer(cors)
        .with_state(app_state)
}

/// Start the telemetry server on `port`.
pub async fn serve(db: TelemetryDb, port: u16) -> anyhow::Result<()> {
    let app = build_router(db);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("opscope server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the telemetry server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so
/// the caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(db: TelemetryDb, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(db);

    tracing::info!("opscope server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
