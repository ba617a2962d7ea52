//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the same middleware
//! stack.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use storyreel_core::validation::MAX_STORY_CHARS;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Largest flow request body: a full-length story at four bytes per
/// character plus room for the JSON envelope and guidance text.
///
/// Anything under this reaches the handler, so an over-long story is
/// reported as `INPUT_TOO_LARGE` rather than a transport rejection.
pub const FLOW_BODY_LIMIT: usize = MAX_STORY_CHARS * 4 + 64 * 1024;

/// Build the full application [`Router`] with all middleware layers.
///
/// Routes fall in two groups with their own timeout and body limit:
///
/// - `/health`, `/api/v1/visual-styles` and `/api/v1/projects` use
///   `request_timeout_secs` and `max_body_bytes` (project patches carry
///   rendered scene images).
/// - `/api/v1/flows` waits on the model, so it gets
///   `generation_timeout_secs` and [`FLOW_BODY_LIMIT`].
///
/// Shared layers, bottom-up: panic recovery, request ID propagation,
/// tracing, request ID assignment, CORS.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let records = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(timeout(config.request_timeout_secs));

    let flows = Router::new()
        .nest("/api/v1/flows", routes::flow_routes())
        .layer(DefaultBodyLimit::max(FLOW_BODY_LIMIT))
        .layer(timeout(config.generation_timeout_secs));

    Router::new()
        .merge(records)
        .merge(flows)
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

fn timeout(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}

/// Build the CORS middleware layer from server configuration.
///
/// The request ID is exposed so the web client can quote it when a
/// generation call fails. Panics at startup if any configured origin is
/// invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
