use axum::Json;
use storyreel_core::visual_style::{VisualStyle, VISUAL_STYLES};

use crate::response::DataResponse;

/// GET /api/v1/visual-styles
pub async fn list() -> Json<DataResponse<&'static [VisualStyle]>> {
    Json(DataResponse {
        data: VISUAL_STYLES,
    })
}
