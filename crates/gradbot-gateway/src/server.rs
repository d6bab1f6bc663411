//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gradbot_core::config::GatewayConfig;
use gradbot_scheduler::GradBot;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub bot: Arc<GradBot>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(gateway_config: GatewayConfig, bot: Arc<GradBot>) -> Self {
        Self {
            gateway_config,
            bot,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any)
        .allow_origin(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/status", get(super::routes::status))
        .route("/api/v1/countdown", get(super::routes::countdown))
        .route("/api/v1/milestones", get(super::routes::milestones))
        .route(
            "/api/v1/reminders",
            get(super::routes::list_reminders).post(super::routes::add_reminder),
        )
        .route("/api/v1/goals", get(super::routes::list_goals))
        .route("/api/v1/study", get(super::routes::study_sessions))
        .route("/api/v1/notifications", get(super::routes::notifications))
        .route("/api/v1/schedule", get(super::routes::schedule))
        .route("/api/v1/commands", post(super::routes::run_command))
        .fallback(super::routes::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Serve until `shutdown` is cancelled.
pub async fn start(
    config: &GatewayConfig,
    bot: Arc<GradBot>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = build_router(AppState::new(config.clone(), bot));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("🌐 Gateway server stopped");
    Ok(())
}
