//! Repository for the `projects` table.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use storyreel_core::persistence::{PersistenceError, ProjectPersistence};
use storyreel_core::project::{NewProject, Project, ProjectPatch};
use storyreel_core::types::ProjectId;
use uuid::Uuid;

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, story_text, analysis, storyboard, visual_style, \
                       generated_scenes, video_url, created_at, updated_at";

/// PostgreSQL-backed project persistence.
#[derive(Clone)]
pub struct PgProjectRepo {
    pool: PgPool,
}

impl PgProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> PersistenceError {
    tracing::error!(error = %err, "Project query failed");
    PersistenceError::Backend(err.to_string())
}

#[async_trait]
impl ProjectPersistence for PgProjectRepo {
    /// Insert a new project. Identifiers are UUIDv7 so they sort by creation.
    async fn create(
        &self,
        owner_id: &str,
        data: &NewProject,
    ) -> Result<ProjectId, PersistenceError> {
        let id = Uuid::now_v7().to_string();
        sqlx::query(
            "INSERT INTO projects
                (id, owner_id, title, story_text, analysis, storyboard,
                 visual_style, generated_scenes, video_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&data.title)
        .bind(&data.story_text)
        .bind(data.analysis.as_ref().map(Json))
        .bind(data.storyboard.as_ref().map(Json))
        .bind(&data.visual_style)
        .bind(data.generated_scenes.as_ref().map(Json))
        .bind(&data.video_url)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, PersistenceError> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, PersistenceError> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(Project::from))
    }

    /// Only non-`None` fields in `patch` are applied; `updated_at` is always
    /// stamped. `video_url` is cleared when the patch carries an explicit
    /// `null`.
    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            "UPDATE projects SET
                title = COALESCE($2, title),
                analysis = COALESCE($3, analysis),
                storyboard = COALESCE($4, storyboard),
                visual_style = COALESCE($5, visual_style),
                generated_scenes = COALESCE($6, generated_scenes),
                video_url = CASE WHEN $7 THEN $8 ELSE video_url END,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(patch.analysis.as_ref().map(Json))
        .bind(patch.storyboard.as_ref().map(Json))
        .bind(&patch.visual_style)
        .bind(patch.generated_scenes.as_ref().map(Json))
        .bind(patch.video_url.is_some())
        .bind(patch.video_url.as_ref().and_then(|v| v.as_deref()))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Permanently delete a project.
    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), PersistenceError> {
        crate::health_check(&self.pool).await.map_err(backend)
    }
}
