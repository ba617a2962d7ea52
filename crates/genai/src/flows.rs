//! The three AI flows: analyze a story, draft a storyboard, render scenes.
//!
//! Each flow is a request/response mapping over [`GenerationBackend`]. Only
//! the scene batch isolates failures: every description is generated
//! independently and failed items are dropped from the result.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storyreel_core::error::CoreError;
use storyreel_core::project::{Scene, StoryAnalysis};
use storyreel_core::validation::check_story_length;

use crate::backend::{GenerationBackend, ImagePrompt};
use crate::error::GenerationError;
use crate::prompts;

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeStoryInput {
    pub story_text: String,
}

/// Analyze a story into themes, characters, structure and summary.
///
/// Stories over the length limit fail with [`CoreError::InputTooLarge`]
/// before any request is made. Every other failure, including empty or
/// off-schema output, surfaces as [`CoreError::GenerationFailed`].
pub async fn analyze_story(
    backend: &dyn GenerationBackend,
    input: &AnalyzeStoryInput,
) -> Result<StoryAnalysis, CoreError> {
    check_story_length(&input.story_text)?;

    let prompt = prompts::analyze_story(&input.story_text);
    let output = backend
        .generate_structured(&prompt)
        .await?
        .ok_or_else(|| CoreError::GenerationFailed("story analysis returned no output".into()))?;

    serde_json::from_value(output).map_err(|e| {
        CoreError::GenerationFailed(format!("story analysis output did not match schema: {e}"))
    })
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateStoryboardInput {
    pub analysis: StoryAnalysis,
    /// Free-text guidance from the user.
    pub user_prompts: String,
}

/// Draft 3-5 scene descriptions from an analysis.
///
/// Transport and API failures propagate. Output that is absent, not JSON
/// or not an array yields an empty storyboard and a warning.
pub async fn generate_storyboard(
    backend: &dyn GenerationBackend,
    input: &GenerateStoryboardInput,
) -> Result<Vec<String>, CoreError> {
    let analysis_json = serde_json::to_string(&input.analysis)
        .map_err(|e| CoreError::Internal(format!("failed to serialize analysis: {e}")))?;
    let prompt = prompts::storyboard(&analysis_json, &input.user_prompts);

    let output = match backend.generate_structured(&prompt).await {
        Ok(Some(output)) => output,
        Ok(None) => {
            tracing::warn!("Storyboard generation returned no output, using empty storyboard");
            return Ok(Vec::new());
        }
        Err(GenerationError::MalformedOutput(detail)) => {
            tracing::warn!(%detail, "Storyboard output was malformed, using empty storyboard");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };

    Ok(scene_descriptions(output))
}

fn scene_descriptions(output: Value) -> Vec<String> {
    let items = match output {
        Value::Array(items) => items,
        other => {
            tracing::warn!(
                kind = json_kind(&other),
                "Storyboard output is not an array, using empty storyboard"
            );
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            other => {
                tracing::warn!(index, kind = json_kind(&other), "Skipping unusable storyboard entry");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateScenesInput {
    /// Ordered scene descriptions; blank entries are skipped.
    pub scene_descriptions: Vec<String>,
    /// Prompt fragment of the selected visual style.
    pub visual_style: String,
}

/// One rendered scene: the echoed description and its image URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScene {
    pub description: String,
    pub image_url: String,
}

impl From<GeneratedScene> for Scene {
    fn from(scene: GeneratedScene) -> Self {
        Scene {
            description: scene.description,
            image_url: Some(scene.image_url),
        }
    }
}

/// Render one image per description, concurrently.
///
/// All calls are awaited before returning. Failed items are logged and
/// dropped; the successful subset is returned in input order and the batch
/// as a whole never fails.
pub async fn generate_scenes(
    backend: &dyn GenerationBackend,
    input: &GenerateScenesInput,
) -> Vec<GeneratedScene> {
    let descriptions: Vec<&str> = input
        .scene_descriptions
        .iter()
        .map(String::as_str)
        .filter(|d| !d.trim().is_empty())
        .collect();

    let results = join_all(
        descriptions
            .iter()
            .map(|d| generate_scene(backend, d, &input.visual_style)),
    )
    .await;

    let total = results.len();
    let scenes: Vec<GeneratedScene> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            Ok(scene) => Some(scene),
            Err(err) => {
                tracing::warn!(index, error = %err, "Scene generation failed, dropping scene");
                None
            }
        })
        .collect();

    tracing::info!(requested = total, generated = scenes.len(), "Scene batch finished");
    scenes
}

/// Render a single scene. A response without media is a failure.
pub async fn generate_scene(
    backend: &dyn GenerationBackend,
    description: &str,
    visual_style: &str,
) -> Result<GeneratedScene, CoreError> {
    let prompt = ImagePrompt {
        subject: description.to_string(),
        style: visual_style.to_string(),
    };
    match backend.generate_image(&prompt).await? {
        Some(image_url) => Ok(GeneratedScene {
            description: description.to_string(),
            image_url,
        }),
        None => Err(CoreError::GenerationFailed(
            "no image was returned for the scene".to_string(),
        )),
    }
}
