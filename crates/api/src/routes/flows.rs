use axum::routing::post;
use axum::Router;

use crate::handlers::flows;
use crate::state::AppState;

/// Routes mounted at `/flows`.
///
/// ```text
/// POST /analyze      -> analyze
/// POST /storyboard   -> storyboard
/// POST /scenes       -> scenes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(flows::analyze))
        .route("/storyboard", post(flows::storyboard))
        .route("/scenes", post(flows::scenes))
}
