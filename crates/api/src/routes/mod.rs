pub mod flows;
pub mod health;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` record routes.
///
/// ```text
/// /visual-styles              static style catalog (GET, public)
///
/// /projects                   list, create (auth required)
/// /projects/{id}              get, patch, delete (owner only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/visual-styles", get(handlers::visual_style::list))
        .nest("/projects", project::router())
}

/// Build the `/api/v1/flows` routes. These call the generation backend and
/// are layered separately because they run far longer than record calls.
///
/// ```text
/// /analyze                    story analysis (POST)
/// /storyboard                 storyboard descriptions (POST)
/// /scenes                     scene images (POST)
/// ```
pub fn flow_routes() -> Router<AppState> {
    flows::router()
}
