//! Handlers for the `/flows` endpoints.
//!
//! Thin wrappers over the AI flows. Nothing here touches persistence; the
//! client stores results through the project routes.

use axum::extract::State;
use axum::Json;
use storyreel_core::project::StoryAnalysis;
use storyreel_core::validation::validate_story_text;
use storyreel_core::visual_style::find_style;
use storyreel_genai::flows::{
    self, AnalyzeStoryInput, GenerateScenesInput, GenerateStoryboardInput, GeneratedScene,
};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/flows/analyze
pub async fn analyze(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<AnalyzeStoryInput>,
) -> AppResult<Json<DataResponse<StoryAnalysis>>> {
    validate_story_text(&input.story_text)?;
    tracing::debug!(owner_id = %user.owner_id, chars = input.story_text.chars().count(), "Analyzing story");

    let analysis = flows::analyze_story(state.generator.as_ref(), &input).await?;
    Ok(Json(DataResponse { data: analysis }))
}

/// POST /api/v1/flows/storyboard
pub async fn storyboard(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<GenerateStoryboardInput>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    tracing::debug!(owner_id = %user.owner_id, "Generating storyboard");

    let descriptions = flows::generate_storyboard(state.generator.as_ref(), &input).await?;
    Ok(Json(DataResponse { data: descriptions }))
}

/// POST /api/v1/flows/scenes
///
/// `visual_style` may be a catalog id, which is expanded to its prompt
/// fragment, or free style text.
pub async fn scenes(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(mut input): ApiJson<GenerateScenesInput>,
) -> AppResult<Json<DataResponse<Vec<GeneratedScene>>>> {
    if let Some(style) = find_style(&input.visual_style) {
        input.visual_style = style.prompt_fragment.to_string();
    }
    tracing::debug!(
        owner_id = %user.owner_id,
        count = input.scene_descriptions.len(),
        "Generating scenes"
    );

    let scenes = flows::generate_scenes(state.generator.as_ref(), &input).await;
    Ok(Json(DataResponse { data: scenes }))
}
