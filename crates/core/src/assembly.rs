//! Final video assembly.
//!
//! Rendering is not performed server-side yet; assembly produces a
//! placeholder reference that carries the project title.

use crate::error::CoreError;
use crate::project::Project;

const PLACEHOLDER_VIDEO_BASE: &str = "https://placehold.co/1280x720.mp4";

/// Build the video reference for a project with generated scenes.
pub fn assemble_video_url(project: &Project) -> Result<String, CoreError> {
    let has_scenes = project
        .generated_scenes
        .as_ref()
        .is_some_and(|s| !s.is_empty());
    if !has_scenes {
        return Err(CoreError::Validation(
            "generate scenes before assembling the video".to_string(),
        ));
    }
    Ok(format!(
        "{PLACEHOLDER_VIDEO_BASE}?text=Video+for+{}",
        urlencoding::encode(&project.title)
    ))
}
