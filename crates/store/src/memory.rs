//! In-process persistence backend.
//!
//! Keeps records in a `Vec` behind a mutex. Used for offline sessions and
//! as the reference backend in tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use storyreel_core::persistence::{PersistenceError, ProjectPersistence};
use storyreel_core::project::{NewProject, Project, ProjectPatch};
use storyreel_core::types::ProjectId;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryRemote {
    records: Mutex<Vec<Project>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with existing records.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            records: Mutex::new(projects),
        }
    }

    /// Copy of every stored record, in insertion order.
    pub fn snapshot(&self) -> Vec<Project> {
        self.records().clone()
    }

    fn records(&self) -> MutexGuard<'_, Vec<Project>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProjectPersistence for MemoryRemote {
    async fn create(
        &self,
        owner_id: &str,
        data: &NewProject,
    ) -> Result<ProjectId, PersistenceError> {
        let id = Uuid::new_v4().to_string();
        let project = data
            .clone()
            .into_project(id.clone(), owner_id.to_string(), Utc::now());
        self.records().push(project);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, PersistenceError> {
        // Newest insertions first, so equal timestamps still list newest first.
        let mut projects: Vec<Project> = self
            .records()
            .iter()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, PersistenceError> {
        Ok(self.records().iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), PersistenceError> {
        let mut records = self.records();
        let project = records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })?;
        patch.apply(project, Utc::now());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|p| p.id != id);
        if records.len() == before {
            return Err(PersistenceError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
