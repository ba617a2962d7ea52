//! The production workflow: story in, video out.
//!
//! Each step runs an AI flow against the open project and persists the
//! result through the [`ProjectStore`]. Results are written to the project
//! the step started on, even if another project was opened meanwhile.
//!
//! Edits to the scene list are built from the store's latest copy under the
//! project's lock, so a slow render never reverts a reorder that finished
//! while it was running. Any change to the scenes drops the assembled video.

use std::sync::Arc;

use storyreel_core::assembly::assemble_video_url;
use storyreel_core::error::CoreError;
use storyreel_core::project::{NewProject, Project, ProjectPatch, Scene, StoryboardScene};
use storyreel_core::types::ProjectId;
use storyreel_core::validation::validate_title;
use storyreel_core::visual_style::{find_style, VisualStyle};
use storyreel_genai::flows::{
    self, AnalyzeStoryInput, GenerateScenesInput, GenerateStoryboardInput,
};
use storyreel_genai::{prompts, GenerationBackend};

use crate::store::ProjectStore;

pub struct Studio {
    store: Arc<ProjectStore>,
    generator: Arc<dyn GenerationBackend>,
}

impl Studio {
    pub fn new(store: Arc<ProjectStore>, generator: Arc<dyn GenerationBackend>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Analyze a story and save it as a new project.
    ///
    /// Nothing is persisted if the input is invalid or the analysis fails.
    pub async fn create_project(
        &self,
        owner_id: Option<&str>,
        title: &str,
        story_text: &str,
    ) -> Result<ProjectId, CoreError> {
        let owner_id = owner_id
            .filter(|id| !id.is_empty())
            .ok_or(CoreError::NotAuthenticated)?;
        let data = NewProject::new(title, story_text);
        data.validate_input()?;

        let analysis = flows::analyze_story(
            self.generator.as_ref(),
            &AnalyzeStoryInput {
                story_text: data.story_text.clone(),
            },
        )
        .await?;

        self.store
            .add_project(data.with_analysis(analysis), Some(owner_id))
            .await
    }

    /// Draft a storyboard for the open project and save it.
    ///
    /// Blank guidance falls back to a default prompt built from the title.
    pub async fn generate_storyboard(
        &self,
        guidance: Option<&str>,
    ) -> Result<Vec<StoryboardScene>, CoreError> {
        let project = self.open_project()?;
        let analysis = project.analysis.clone().ok_or_else(|| {
            CoreError::Validation("analyze the story before generating a storyboard".into())
        })?;
        let user_prompts = guidance
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| prompts::default_storyboard_guidance(&project.title));

        let descriptions = flows::generate_storyboard(
            self.generator.as_ref(),
            &GenerateStoryboardInput {
                analysis,
                user_prompts,
            },
        )
        .await?;
        if descriptions.is_empty() {
            tracing::warn!(project_id = %project.id, "Storyboard generation produced no scenes");
        }

        let storyboard: Vec<StoryboardScene> = descriptions
            .into_iter()
            .map(StoryboardScene::from_description)
            .collect();
        self.store
            .update_project(
                &project.id,
                ProjectPatch {
                    storyboard: Some(storyboard.clone()),
                    ..ProjectPatch::default()
                },
            )
            .await?;
        Ok(storyboard)
    }

    /// Choose the visual style for the open project.
    pub async fn select_visual_style(&self, style_id: &str) -> Result<(), CoreError> {
        let style = style_by_id(style_id)?;
        let project = self.open_project()?;
        self.store
            .update_project(
                &project.id,
                ProjectPatch {
                    visual_style: Some(style.id.to_string()),
                    ..ProjectPatch::default()
                },
            )
            .await
    }

    /// Render an image for every storyboard scene.
    ///
    /// Scenes that fail are left out. If nothing could be rendered the
    /// previous scenes are kept and an empty list is returned.
    pub async fn generate_scenes(&self) -> Result<Vec<Scene>, CoreError> {
        let project = self.open_project()?;
        let descriptions: Vec<String> = project
            .storyboard
            .iter()
            .flatten()
            .map(|s| s.description.clone())
            .collect();
        if descriptions.is_empty() {
            return Err(CoreError::Validation(
                "generate a storyboard before generating scenes".into(),
            ));
        }
        let style = selected_style(&project)?;

        let scenes: Vec<Scene> = flows::generate_scenes(
            self.generator.as_ref(),
            &GenerateScenesInput {
                scene_descriptions: descriptions,
                visual_style: style.prompt_fragment.to_string(),
            },
        )
        .await
        .into_iter()
        .map(Scene::from)
        .collect();

        if scenes.is_empty() {
            tracing::warn!(project_id = %project.id, "No scenes could be generated");
            return Ok(scenes);
        }
        self.store
            .update_project(&project.id, scenes_patch(scenes.clone()))
            .await?;
        Ok(scenes)
    }

    /// Re-render one generated scene in place.
    ///
    /// The new image replaces the scene at `index` if it still holds the
    /// same description when the render finishes, otherwise the first scene
    /// with that description.
    pub async fn regenerate_scene(&self, index: usize) -> Result<Scene, CoreError> {
        let project = self.open_project()?;
        let scenes = project.generated_scenes.as_deref().unwrap_or_default();
        let description = scenes
            .get(index)
            .map(|s| s.description.clone())
            .ok_or_else(|| scene_out_of_range(index, scenes.len()))?;
        let style = selected_style(&project)?;

        let scene = Scene::from(
            flows::generate_scene(self.generator.as_ref(), &description, style.prompt_fragment)
                .await?,
        );
        let fresh = scene.clone();
        self.store
            .update_project_with(&project.id, move |latest| {
                let mut scenes = latest.generated_scenes.clone().unwrap_or_default();
                let slot = match scenes.get(index) {
                    Some(s) if s.description == fresh.description => index,
                    _ => scenes
                        .iter()
                        .position(|s| s.description == fresh.description)
                        .ok_or_else(|| {
                            CoreError::Validation(format!(
                                "scene \"{}\" is no longer part of the project",
                                fresh.description
                            ))
                        })?,
                };
                scenes[slot] = fresh;
                Ok(scenes_patch(scenes))
            })
            .await?;
        Ok(scene)
    }

    /// Move a generated scene from one position to another.
    pub async fn reorder_scenes(&self, from: usize, to: usize) -> Result<(), CoreError> {
        let project = self.open_project()?;
        self.store
            .update_project_with(&project.id, |latest| {
                let mut scenes = latest.generated_scenes.clone().unwrap_or_default();
                let len = scenes.len();
                if from >= len {
                    return Err(scene_out_of_range(from, len));
                }
                if to >= len {
                    return Err(scene_out_of_range(to, len));
                }
                if from == to {
                    return Ok(ProjectPatch::default());
                }
                let scene = scenes.remove(from);
                scenes.insert(to, scene);
                Ok(scenes_patch(scenes))
            })
            .await
            .map(|_| ())
    }

    /// Rename the open project. Blank or unchanged titles are ignored.
    pub async fn rename(&self, title: &str) -> Result<(), CoreError> {
        let project = self.open_project()?;
        let title = title.trim();
        if title.is_empty() || title == project.title {
            return Ok(());
        }
        validate_title(title)?;
        self.store
            .update_project(
                &project.id,
                ProjectPatch {
                    title: Some(title.to_string()),
                    ..ProjectPatch::default()
                },
            )
            .await
    }

    /// Assemble the final video and save its reference.
    pub async fn assemble_video(&self) -> Result<String, CoreError> {
        let project = self.open_project()?;
        let video_url = assemble_video_url(&project)?;
        self.store
            .update_project(
                &project.id,
                ProjectPatch {
                    video_url: Some(Some(video_url.clone())),
                    ..ProjectPatch::default()
                },
            )
            .await?;
        tracing::info!(project_id = %project.id, "Video assembled");
        Ok(video_url)
    }

    fn open_project(&self) -> Result<Project, CoreError> {
        self.store
            .current_project()
            .ok_or_else(|| CoreError::Validation("no project is open".into()))
    }
}

fn style_by_id(style_id: &str) -> Result<&'static VisualStyle, CoreError> {
    find_style(style_id).ok_or_else(|| CoreError::NotFound {
        entity: "VisualStyle",
        id: style_id.to_string(),
    })
}

fn selected_style(project: &Project) -> Result<&'static VisualStyle, CoreError> {
    let style_id = project
        .visual_style
        .as_deref()
        .ok_or_else(|| CoreError::Validation("select a visual style first".into()))?;
    style_by_id(style_id)
}

/// Replace the generated scenes and drop the video built from the old ones.
fn scenes_patch(scenes: Vec<Scene>) -> ProjectPatch {
    ProjectPatch {
        generated_scenes: Some(scenes),
        video_url: Some(None),
        ..ProjectPatch::default()
    }
}

fn scene_out_of_range(index: usize, len: usize) -> CoreError {
    CoreError::Validation(format!("scene index {index} is out of range (0..{len})"))
}
