use std::sync::Arc;

use storyreel_core::persistence::ProjectPersistence;
use storyreel_genai::GenerationBackend;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Durable project storage (PostgreSQL in production).
    pub persistence: Arc<dyn ProjectPersistence>,
    /// Model backend used by the flow endpoints.
    pub generator: Arc<dyn GenerationBackend>,
    pub config: Arc<ServerConfig>,
}
