//! REST API module.
//!
//! Every handler answers with the `{success, data, revisionId}` envelope and resolves
//! the caller through the [`CurrentUser`](crate::auth::CurrentUser) extractor.

mod files;
mod projects;
mod recent;
mod revision;
mod search;
mod workspace;

pub use files::*;
pub use projects::*;
pub use recent::*;
pub use revision::*;
pub use search::*;
pub use workspace::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::FileNode;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

// The database is the source of truth; a search index that falls behind is only
// logged and gets rebuilt on the next start.

async fn index_nodes(state: &AppState, nodes: &[FileNode]) {
    if let Err(e) = state.search.index_nodes(nodes).await {
        tracing::warn!("Failed to index {} node(s): {}", nodes.len(), e);
    }
}

async fn index_node(state: &AppState, node: &FileNode) {
    if let Err(e) = state.search.index_node(node).await {
        tracing::warn!("Failed to index {}: {}", node.path, e);
    }
}

async fn unindex_nodes(state: &AppState, file_ids: &[String]) {
    if let Err(e) = state.search.remove_nodes(file_ids).await {
        tracing::warn!("Failed to remove {} node(s) from index: {}", file_ids.len(), e);
    }
}
