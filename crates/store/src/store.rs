//! In-memory project state for the signed-in owner.
//!
//! The store holds the owner's project list, the currently open project and
//! the last error message. Updates and deletes are applied locally first and
//! rolled back from a snapshot if the remote write fails.
//!
//! Mutations of the same project are serialized through a per-project async
//! lock: a second update waits until the first one's remote write has
//! settled, so a rollback can never overwrite a later optimistic state.
//! The state mutex itself is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use storyreel_core::error::CoreError;
use storyreel_core::persistence::ProjectPersistence;
use storyreel_core::project::{NewProject, Project, ProjectPatch};
use storyreel_core::types::ProjectId;

type ProjectLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug, Default)]
struct StoreState {
    projects: Vec<Project>,
    current: Option<Project>,
    last_error: Option<String>,
}

impl StoreState {
    /// The local copy of a project, preferring the open one.
    fn find(&self, id: &str) -> Option<&Project> {
        self.current
            .as_ref()
            .filter(|p| p.id == id)
            .or_else(|| self.projects.iter().find(|p| p.id == id))
    }

    /// Overwrite every local copy of `project`. Copies that are no longer
    /// present are not recreated.
    fn replace(&mut self, project: &Project) {
        if let Some(current) = self.current.as_mut().filter(|p| p.id == project.id) {
            *current = project.clone();
        }
        if let Some(entry) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *entry = project.clone();
        }
    }
}

/// Local copies removed by an optimistic delete.
struct Removed {
    from_list: Option<(usize, Project)>,
    current: Option<Project>,
}

pub struct ProjectStore {
    remote: Arc<dyn ProjectPersistence>,
    state: Mutex<StoreState>,
    locks: Mutex<HashMap<ProjectId, ProjectLock>>,
}

impl ProjectStore {
    pub fn new(remote: Arc<dyn ProjectPersistence>) -> Self {
        Self {
            remote,
            state: Mutex::new(StoreState::default()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    // -- Readers -----------------------------------------------------------

    /// The owner's projects, most recently created first.
    pub fn projects(&self) -> Vec<Project> {
        self.state().projects.clone()
    }

    pub fn current_project(&self) -> Option<Project> {
        self.state().current.clone()
    }

    /// Message of the most recent failed operation, cleared when the next
    /// operation starts.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Drop all local state, e.g. on sign-out.
    pub fn reset(&self) {
        *self.state() = StoreState::default();
        self.locks().clear();
    }

    // -- Reads -------------------------------------------------------------

    /// Replace the local list with the owner's projects.
    ///
    /// On failure the previous list is kept untouched.
    pub async fn fetch_all_projects(&self, owner_id: Option<&str>) -> Result<(), CoreError> {
        let owner_id = self.require_owner(owner_id)?;
        self.begin();

        match self.remote.list_by_owner(owner_id).await {
            Ok(projects) => {
                tracing::debug!(owner_id, count = projects.len(), "Fetched projects");
                self.state().projects = projects;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(owner_id, error = %err, "Failed to fetch projects");
                Err(self.fail(err.into_read_error()))
            }
        }
    }

    /// Load one project and make it the open project.
    ///
    /// The open slot is cleared first, so a failed fetch never leaves a
    /// stale project open.
    pub async fn fetch_project(
        &self,
        project_id: &str,
        owner_id: Option<&str>,
    ) -> Result<Project, CoreError> {
        let owner_id = self.require_owner(owner_id)?;
        self.begin();
        self.state().current = None;

        let record = self
            .remote
            .get_by_id(project_id)
            .await
            .map_err(|err| self.fail(err.into_read_error()))?;

        match record {
            Some(project) if project.owner_id == owner_id => {
                let mut state = self.state();
                if let Some(entry) = state.projects.iter_mut().find(|p| p.id == project.id) {
                    *entry = project.clone();
                }
                state.current = Some(project.clone());
                Ok(project)
            }
            Some(_) => {
                tracing::warn!(project_id, owner_id, "Project belongs to another owner");
                Err(self.fail(CoreError::AccessDenied(format!(
                    "project {project_id} belongs to another user"
                ))))
            }
            None => Err(self.fail(CoreError::NotFound {
                entity: "Project",
                id: project_id.to_string(),
            })),
        }
    }

    // -- Writes ------------------------------------------------------------

    /// Create a project and refresh the list.
    ///
    /// A failed refresh is logged but does not fail the creation: the new
    /// identifier is still returned.
    pub async fn add_project(
        &self,
        data: NewProject,
        owner_id: Option<&str>,
    ) -> Result<ProjectId, CoreError> {
        let owner_id = self.require_owner(owner_id)?;
        self.begin();
        data.validate_input().map_err(|err| self.fail(err))?;

        let id = self
            .remote
            .create(owner_id, &data)
            .await
            .map_err(|err| self.fail(err.into_write_error()))?;
        tracing::info!(project_id = %id, owner_id, "Project created");

        if let Err(err) = self.fetch_all_projects(Some(owner_id)).await {
            tracing::warn!(project_id = %id, error = %err, "Project created but list refresh failed");
        }
        Ok(id)
    }

    /// Patch the open project. Does nothing when no project is open.
    pub async fn update_current_project(&self, patch: ProjectPatch) -> Result<(), CoreError> {
        let Some(id) = self.state().current.as_ref().map(|p| p.id.clone()) else {
            tracing::debug!("No open project, skipping update");
            return Ok(());
        };
        self.update_project(&id, patch).await
    }

    /// Patch a project by id, optimistically.
    ///
    /// Local copies are patched before the remote write and restored from
    /// a snapshot if it fails. When the project is not held locally only the
    /// remote write happens.
    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<(), CoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        let lock = self.project_lock(id);
        let _guard = lock.lock().await;
        self.begin();
        patch.validate_input().map_err(|err| self.fail(err))?;
        self.commit(id, &patch).await.map(|_| ())
    }

    /// Patch a project from its latest local copy.
    ///
    /// `build` runs under the project's lock, so the patch is derived from
    /// the state every earlier mutation left behind rather than from a copy
    /// read before some slow step. Returns the updated local copy.
    pub async fn update_project_with<F>(&self, id: &str, build: F) -> Result<Project, CoreError>
    where
        F: FnOnce(&Project) -> Result<ProjectPatch, CoreError>,
    {
        let lock = self.project_lock(id);
        let _guard = lock.lock().await;
        self.begin();

        let local = self.state().find(id).cloned();
        let Some(snapshot) = local else {
            return Err(self.fail(CoreError::NotFound {
                entity: "Project",
                id: id.to_string(),
            }));
        };
        let patch = build(&snapshot).map_err(|err| self.fail(err))?;
        if patch.is_empty() {
            return Ok(snapshot);
        }
        patch.validate_input().map_err(|err| self.fail(err))?;

        let updated = self.commit(id, &patch).await?;
        Ok(updated.unwrap_or(snapshot))
    }

    /// Delete a project, optimistically.
    ///
    /// On failure the project is reinserted at its previous position and
    /// reopened if nothing else has been opened in the meantime. A copy that
    /// a concurrent list refresh brought back is kept instead of a second
    /// one being inserted.
    pub async fn delete_project(&self, id: &str) -> Result<(), CoreError> {
        let lock = self.project_lock(id);
        let _guard = lock.lock().await;
        self.begin();

        let removed = {
            let mut state = self.state();
            let from_list = state
                .projects
                .iter()
                .position(|p| p.id == id)
                .map(|index| (index, state.projects.remove(index)));
            let current = if state.current.as_ref().is_some_and(|p| p.id == id) {
                state.current.take()
            } else {
                None
            };
            Removed { from_list, current }
        };

        match self.remote.delete(id).await {
            Ok(()) => {
                tracing::info!(project_id = id, "Project deleted");
                let mut state = self.state();
                state.projects.retain(|p| p.id != id);
                if state.current.as_ref().is_some_and(|p| p.id == id) {
                    state.current = None;
                }
                drop(state);
                self.locks().remove(id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(project_id = id, error = %err, "Remote delete failed, rolling back");
                let mut state = self.state();
                if let Some((index, project)) = removed.from_list {
                    if !state.projects.iter().any(|p| p.id == id) {
                        let index = index.min(state.projects.len());
                        state.projects.insert(index, project);
                    }
                }
                if state.current.is_none() {
                    state.current = removed.current;
                }
                drop(state);
                Err(self.fail(err.into_write_error()))
            }
        }
    }

    // -- Internals ---------------------------------------------------------

    /// Apply `patch` to the local copies, write it remotely and roll back
    /// on failure. The caller holds the project's lock.
    async fn commit(&self, id: &str, patch: &ProjectPatch) -> Result<Option<Project>, CoreError> {
        let (snapshot, updated) = {
            let mut state = self.state();
            let snapshot = state.find(id).cloned();
            let updated = snapshot.as_ref().map(|snapshot| {
                let mut updated = snapshot.clone();
                patch.apply(&mut updated, Utc::now());
                state.replace(&updated);
                updated
            });
            (snapshot, updated)
        };

        match self.remote.update(id, patch).await {
            Ok(()) => Ok(updated),
            Err(err) => {
                tracing::warn!(project_id = id, error = %err, "Remote update failed, rolling back");
                if let Some(snapshot) = &snapshot {
                    self.state().replace(snapshot);
                }
                Err(self.fail(err.into_write_error()))
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<ProjectId, ProjectLock>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn project_lock(&self, id: &str) -> ProjectLock {
        Arc::clone(self.locks().entry(id.to_string()).or_default())
    }

    fn begin(&self) {
        self.state().last_error = None;
    }

    /// Record `err` as the last error and hand it back.
    fn fail(&self, err: CoreError) -> CoreError {
        self.state().last_error = Some(err.to_string());
        err
    }

    fn require_owner<'a>(&self, owner_id: Option<&'a str>) -> Result<&'a str, CoreError> {
        match owner_id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(id),
            None => Err(self.fail(CoreError::NotAuthenticated)),
        }
    }
}
