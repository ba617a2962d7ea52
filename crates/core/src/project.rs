//! Project entity, its nested scene types, and the create/patch DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{timestamp_format, OwnerId, ProjectId, Timestamp};
use crate::validation::validate_story_text;

/// Structured result of the story analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    /// Key themes identified in the story.
    pub themes: Vec<String>,
    /// Main characters and their descriptions.
    pub characters: Vec<String>,
    /// Beginning, rising action, climax, falling action and resolution.
    pub structure: String,
    /// A brief summary of the story.
    pub summary: String,
}

/// One storyboard entry. The image is optional; freshly generated
/// storyboards carry descriptions only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardScene {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl StoryboardScene {
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image_uri: None,
        }
    }
}

/// A generated scene: description plus the image produced for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A user's story-to-video project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: OwnerId,
    pub title: String,
    pub story_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StoryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<Vec<StoryboardScene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_scenes: Option<Vec<Scene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(with = "timestamp_format")]
    pub created_at: Timestamp,
    #[serde(with = "timestamp_format")]
    pub updated_at: Timestamp,
}

/// Progress of a project through the production workflow.
///
/// Derived from which optional fields are populated; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Analyzed,
    Storyboarded,
    ScenesGenerated,
    VideoReady,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Analyzed => "Analyzed",
            Self::Storyboarded => "Storyboarded",
            Self::ScenesGenerated => "Scenes Generated",
            Self::VideoReady => "Video Ready",
        }
    }
}

impl Project {
    pub fn status(&self) -> ProjectStatus {
        if self.video_url.is_some() {
            ProjectStatus::VideoReady
        } else if self.generated_scenes.as_ref().is_some_and(|s| !s.is_empty()) {
            ProjectStatus::ScenesGenerated
        } else if self.storyboard.as_ref().is_some_and(|s| !s.is_empty()) {
            ProjectStatus::Storyboarded
        } else if self.analysis.is_some() {
            ProjectStatus::Analyzed
        } else {
            ProjectStatus::Draft
        }
    }

    /// Image shown on the project card: first generated scene, then first
    /// storyboard image.
    pub fn cover_image(&self) -> Option<&str> {
        let scene = self
            .generated_scenes
            .as_ref()
            .and_then(|s| s.first())
            .and_then(|s| s.image_url.as_deref());
        scene.or_else(|| {
            self.storyboard
                .as_ref()
                .and_then(|s| s.first())
                .and_then(|s| s.image_uri.as_deref())
        })
    }
}

/// DTO for creating a project. Id, owner and timestamps are assigned by the
/// persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    pub story_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StoryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<Vec<StoryboardScene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_scenes: Option<Vec<Scene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl NewProject {
    pub fn new(title: impl Into<String>, story_text: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            story_text: story_text.into(),
            ..Self::default()
        }
    }

    pub fn with_analysis(mut self, analysis: StoryAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Check title bounds and story text (non-blank, at most
    /// [`MAX_STORY_CHARS`](crate::validation::MAX_STORY_CHARS) characters).
    pub fn validate_input(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_story_text(&self.story_text)
    }

    /// Materialize the stored record. Used by persistence backends that do
    /// not have a database to fill in defaults.
    pub fn into_project(self, id: ProjectId, owner_id: OwnerId, now: Timestamp) -> Project {
        Project {
            id,
            owner_id,
            title: self.title,
            story_text: self.story_text,
            analysis: self.analysis,
            storyboard: self.storyboard,
            visual_style: self.visual_style,
            generated_scenes: self.generated_scenes,
            video_url: self.video_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` fields are left untouched; there is deliberately
/// no way to change `id`, `owner_id` or `created_at`.
///
/// `video_url` is the one clearable field: `Some(None)` (JSON `null`)
/// removes the assembled video, e.g. after the scenes it was built from
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 100))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StoryAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storyboard: Option<Vec<StoryboardScene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_scenes: Option<Vec<Scene>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub video_url: Option<Option<String>>,
}

/// Keep an explicit `null` apart from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate_input(&self) -> Result<(), CoreError> {
        Ok(self.validate()?)
    }

    /// Merge the patch into `project` and stamp `updated_at`.
    pub fn apply(&self, project: &mut Project, now: Timestamp) {
        if let Some(title) = &self.title {
            project.title.clone_from(title);
        }
        if let Some(analysis) = &self.analysis {
            project.analysis = Some(analysis.clone());
        }
        if let Some(storyboard) = &self.storyboard {
            project.storyboard = Some(storyboard.clone());
        }
        if let Some(style) = &self.visual_style {
            project.visual_style = Some(style.clone());
        }
        if let Some(scenes) = &self.generated_scenes {
            project.generated_scenes = Some(scenes.clone());
        }
        if let Some(url) = &self.video_url {
            project.video_url.clone_from(url);
        }
        project.updated_at = now;
    }
}
