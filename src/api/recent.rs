//! Recent files API endpoint.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::RecentFile;
use crate::AppState;

/// GET /api/recent - The caller's recently edited files, newest first.
pub async fn list_recent(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<RecentFile>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_recent(user.id()).await {
        Ok(files) => success(files, revision_id),
        Err(e) => error(e, revision_id),
    }
}
