//! Search API endpoints.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::FileNode;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    pub q: String,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Search result with files and metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Single search result item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub file: FileNode,
    pub score: f32,
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 100;

/// GET /api/projects/:id/search - Search a project's files.
pub async fn search_files(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(project_id): Path<String>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = state.repo.get_project(user.id(), &project_id).await {
        return error(e, revision_id);
    }

    let limit = params.limit.clamp(1, MAX_SEARCH_LIMIT);

    let search_results = match state
        .search
        .search(&project_id, &params.q, limit, params.offset)
    {
        Ok(results) => results,
        Err(e) => return error(e, revision_id),
    };

    // The index may briefly lag the database; hits without a stored node are dropped.
    let mut results = Vec::new();
    for hit in search_results {
        if let Ok(file) = state.repo.get_node(user.id(), &hit.file_id).await {
            results.push(SearchResultItem {
                file,
                score: hit.score,
            });
        }
    }

    let total = results.len();

    success(
        SearchResponse {
            results,
            total,
            limit,
            offset: params.offset,
        },
        revision_id,
    )
}
