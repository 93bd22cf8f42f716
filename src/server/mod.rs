//! HTTP JSON API for the dashboard pages.
//!
//! Handlers are thin: they parse query parameters, push the synchronous
//! pipeline onto the blocking pool and shape the JSON the pages expect.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::PipelineConfig;
use crate::error::{AppError, EXIT_INPUT, EXIT_SERVER};
use crate::series::FallbackPolicy;

pub mod routes;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<PipelineConfig>,
    pub policy: Arc<FallbackPolicy>,
}

impl AppState {
    pub fn new(config: PipelineConfig, policy: FallbackPolicy) -> Self {
        Self {
            config: Arc::new(config),
            policy: Arc::new(policy),
        }
    }
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/bloom-data", get(routes::bloom_data))
        .route("/api/bloom-forecast", get(routes::bloom_forecast))
        .route("/api/identify", get(routes::identify_status).post(routes::identify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `bind` and serve until the process is stopped.
pub async fn serve(config: PipelineConfig, policy: FallbackPolicy, bind: &str) -> Result<(), AppError> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid bind address '{bind}': {e}")))?;

    info!(
        data_dir = %config.data_dir.display(),
        temperature = %config.temperature_source,
        rainfall = %config.rainfall_source,
        satellite = %config.satellite_source,
        "dashboard sources"
    );

    let app = router(AppState::new(config, policy));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::new(EXIT_SERVER, format!("Failed to bind {addr}: {e}")))?;

    info!("bloom v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::new(EXIT_SERVER, format!("Server error: {e}")))
}
