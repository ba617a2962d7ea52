//! Row mapping for the `projects` table.
//!
//! Nested structures are stored as JSONB; [`ProjectRow`] decodes them and
//! converts into the domain [`Project`].

use sqlx::types::Json;
use sqlx::FromRow;
use storyreel_core::project::{Project, Scene, StoryAnalysis, StoryboardScene};
use storyreel_core::types::Timestamp;

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub story_text: String,
    pub analysis: Option<Json<StoryAnalysis>>,
    pub storyboard: Option<Json<Vec<StoryboardScene>>>,
    pub visual_style: Option<String>,
    pub generated_scenes: Option<Json<Vec<Scene>>>,
    pub video_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            story_text: row.story_text,
            analysis: row.analysis.map(|Json(a)| a),
            storyboard: row.storyboard.map(|Json(s)| s),
            visual_style: row.visual_style,
            generated_scenes: row.generated_scenes.map(|Json(s)| s),
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
