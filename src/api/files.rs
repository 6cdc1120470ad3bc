//! File tree API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, index_node, success, unindex_nodes, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{CreateNodeRequest, FileNode, RemovedNodes, UpdateContentRequest, ROOT_PATH};
use crate::AppState;

/// GET /api/projects/:id/files - Flat node list of a project.
pub async fn list_files(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
) -> ApiResult<Vec<FileNode>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_project_nodes(user.id(), &project_id).await {
        Ok(nodes) => success(nodes, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/projects/:id/files - Create a file or directory.
pub async fn create_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
    Json(request): Json<CreateNodeRequest>,
) -> ApiResult<FileNode> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = validate_create(&request) {
        return error(e, revision_id);
    }

    match state.repo.create_node(user.id(), &project_id, &request).await {
        Ok(node) => {
            index_node(&state, &node).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(node, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/files/:id - Get a single node.
pub async fn get_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FileNode> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_node(user.id(), &id).await {
        Ok(node) => success(node, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/files/:id - Overwrite a file's content.
pub async fn update_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateContentRequest>,
) -> ApiResult<FileNode> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_content(user.id(), &id, &request.content).await {
        Ok(node) => {
            index_node(&state, &node).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(node, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/files/:id - Delete a node and, for directories, its subtree.
pub async fn delete_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<RemovedNodes> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_node(user.id(), &id).await {
        Ok(node) if node.is_root() => {
            return error(
                AppError::Validation("The project root cannot be deleted".to_string()),
                revision_id,
            );
        }
        Ok(_) => {}
        Err(e) => return error(e, revision_id),
    }

    match state.repo.delete_node(user.id(), &id).await {
        Ok(removed) => {
            unindex_nodes(&state, &removed.removed_ids).await;

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(removed, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

fn validate_create(request: &CreateNodeRequest) -> Result<(), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if !request.path.starts_with('/') {
        return Err(AppError::Validation(
            "Path must start with '/'".to_string(),
        ));
    }
    if request.path == ROOT_PATH {
        return Err(AppError::Validation(
            "A project has exactly one root".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, path: &str) -> CreateNodeRequest {
        CreateNodeRequest {
            name: name.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_create() {
        assert!(validate_create(&request("a.js", "/a.js")).is_ok());
        assert!(matches!(
            validate_create(&request(" ", "/a.js")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_create(&request("a.js", "a.js")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_create(&request("root", "/")),
            Err(AppError::Validation(_))
        ));
    }
}
