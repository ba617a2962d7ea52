//! Contract for the durable owner of record for projects.
//!
//! Implemented by the PostgreSQL repository, the in-memory remote and the
//! HTTP remote. The client-side project store and the API server only ever
//! hold an `Arc<dyn ProjectPersistence>`.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::project::{NewProject, Project, ProjectPatch};
use crate::types::ProjectId;

/// Errors from a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The targeted record does not exist.
    #[error("project {id} not found")]
    NotFound { id: ProjectId },

    /// The caller is not allowed to perform the operation.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or failed internally.
    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ProjectPersistence: Send + Sync {
    /// Insert a record owned by `owner_id` and return its new identifier.
    async fn create(&self, owner_id: &str, data: &NewProject)
        -> Result<ProjectId, PersistenceError>;

    /// All records of an owner, most recently created first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, PersistenceError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, PersistenceError>;

    /// Apply a partial update and stamp `updated_at`.
    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), PersistenceError>;

    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;

    /// Cheap liveness check used by the health endpoint.
    async fn health_check(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

impl PersistenceError {
    /// Map a failed read into the error surfaced to callers.
    pub fn into_read_error(self) -> CoreError {
        CoreError::RemoteReadFailed(self.to_string())
    }

    /// Map a failed write into the error surfaced to callers.
    pub fn into_write_error(self) -> CoreError {
        CoreError::RemoteWriteFailed(self.to_string())
    }
}
