use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the persistence backend is reachable.
    pub persistence_healthy: bool,
}

/// GET /health -- returns service and persistence health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let persistence_healthy = match state.persistence.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Persistence health check failed");
            false
        }
    };

    let status = if persistence_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        persistence_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
