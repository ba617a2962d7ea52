//! Handlers for the `/projects` resource.
//!
//! Every route is scoped to the authenticated owner. Projects owned by
//! someone else are reported as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storyreel_core::error::CoreError;
use storyreel_core::project::{NewProject, Project, ProjectPatch};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(mut input): ApiJson<NewProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    input.title = input.title.trim().to_string();
    input.validate_input()?;

    let id = state.persistence.create(&user.owner_id, &input).await?;
    let project = state.persistence.get_by_id(&id).await?.ok_or_else(|| {
        AppError::InternalError(format!("project {id} missing right after creation"))
    })?;
    tracing::info!(project_id = %id, owner_id = %user.owner_id, "Project created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.persistence.list_by_owner(&user.owner_id).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = find_owned(&state, &user, &id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PATCH /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(mut patch): ApiJson<ProjectPatch>,
) -> AppResult<Json<DataResponse<Project>>> {
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
    }
    patch.validate_input()?;
    find_owned(&state, &user, &id).await?;

    state.persistence.update(&id, &patch).await?;
    let project = find_owned(&state, &user, &id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    find_owned(&state, &user, &id).await?;
    state.persistence.delete(&id).await?;
    tracing::info!(project_id = %id, owner_id = %user.owner_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_owned(state: &AppState, user: &AuthUser, id: &str) -> AppResult<Project> {
    match state.persistence.get_by_id(id).await? {
        Some(project) if project.owner_id == user.owner_id => Ok(project),
        Some(_) => {
            tracing::warn!(project_id = %id, owner_id = %user.owner_id, "Project belongs to another owner");
            Err(not_found(id))
        }
        None => Err(not_found(id)),
    }
}

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: id.to_string(),
    })
}
