//! Project API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, index_nodes, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{CreateProjectRequest, Project, SelectProjectRequest};
use crate::AppState;

/// GET /api/projects - List the caller's projects.
pub async fn list_projects(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<Project>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_projects(user.id()).await {
        Ok(projects) => success(projects, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_project(user.id(), &id).await {
        Ok(project) => success(project, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/projects - Create a project and make it the active one.
pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Project name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_project(user.id(), &request).await {
        Ok(project) => {
            activate(&state, &user, &project, true).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(project, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/projects/:id - Delete a project with all of its files.
pub async fn delete_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_project(user.id(), &id).await {
        Ok(()) => {
            if let Err(e) = state.search.remove_project(&id).await {
                tracing::warn!("Failed to remove project from index: {}", e);
            }
            if let Some(user_id) = user.id() {
                if let Err(e) = state.active.clear(user_id, &id).await {
                    tracing::warn!("Failed to clear active project: {}", e);
                }
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/projects/active - Restore the caller's last project.
///
/// Falls back to the oldest project, creating `my-project` if the caller has none.
pub async fn get_active_project(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Project> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(user_id) = user.id() {
        if let Some(project_id) = state.active.get(user_id).await {
            if let Ok(project) = state.repo.get_project(Some(user_id), &project_id).await {
                return success(project, revision_id);
            }
            tracing::debug!(user_id, project_id = %project_id, "Active project is gone, falling back");
        }
    }

    match state.repo.ensure_default_project(user.id()).await {
        Ok(project) => {
            activate(&state, &user, &project, true).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(project, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/projects/active - Select the active project.
pub async fn select_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SelectProjectRequest>,
) -> ApiResult<Project> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_project(user.id(), &request.project_id).await {
        Ok(project) => {
            activate(&state, &user, &project, false).await;
            success(project, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// Point the caller at `project`, optionally (re)indexing its files.
async fn activate(state: &AppState, user: &CurrentUser, project: &Project, reindex: bool) {
    if reindex {
        match state.repo.list_project_nodes(user.id(), &project.id).await {
            Ok(nodes) => index_nodes(state, &nodes).await,
            Err(e) => tracing::warn!("Failed to load nodes for indexing: {}", e),
        }
    }

    if let Some(user_id) = user.id() {
        if let Err(e) = state.active.set(user_id, &project.id).await {
            tracing::warn!("Failed to store active project: {}", e);
        }
    }
}
