//! Whole-project maintenance endpoints: templates, clean, reset and the terminal.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{error, index_nodes, success, unindex_nodes, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{ApplyTemplateRequest, FileNode, RemovedNodes, ResetProjectRequest};
use crate::templates::TemplateKey;
use crate::terminal::{self, CommandOutput};
use crate::AppState;

/// One line of terminal input.
#[derive(Debug, Deserialize)]
pub struct TerminalRequest {
    pub input: String,
}

/// POST /api/projects/:id/template - Expand a starter template under the root.
pub async fn apply_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
    Json(request): Json<ApplyTemplateRequest>,
) -> ApiResult<Vec<FileNode>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let template = TemplateKey::resolve(&request.template_key);

    match state
        .repo
        .apply_template(user.id(), &project_id, template)
        .await
    {
        Ok(created) => {
            index_nodes(&state, &created).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(created, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/projects/:id/clean - Delete nodes unreachable from the root.
pub async fn clean_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
) -> ApiResult<RemovedNodes> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.clean_project(user.id(), &project_id).await {
        Ok(removed) => {
            unindex_nodes(&state, &removed.removed_ids).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(removed, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/projects/:id/reset - Wipe the tree back to README plus a template.
pub async fn reset_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
    Json(request): Json<ResetProjectRequest>,
) -> ApiResult<Vec<FileNode>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let template = request
        .template_key
        .as_deref()
        .map_or(TemplateKey::Blank, TemplateKey::resolve);

    match state
        .repo
        .reset_project(user.id(), &project_id, template)
        .await
    {
        Ok(nodes) => {
            if let Err(e) = state.search.remove_project(&project_id).await {
                tracing::warn!("Failed to clear project from index: {}", e);
            }
            index_nodes(&state, &nodes).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(nodes, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/projects/:id/terminal - Run one terminal command in the project.
pub async fn run_terminal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
    Json(request): Json<TerminalRequest>,
) -> ApiResult<CommandOutput> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let project = match state.repo.get_project(user.id(), &project_id).await {
        Ok(project) => project,
        Err(e) => return error(e, revision_id),
    };

    match terminal::execute(&state.repo, user.id(), &project, &request.input).await {
        Ok(output) => {
            unindex_nodes(&state, &output.removed_ids).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(output, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
