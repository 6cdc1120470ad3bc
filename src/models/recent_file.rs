//! Recent-files models.

use serde::{Deserialize, Serialize};

use super::{FileNode, Project};

/// Maximum number of recent-file entries kept per user.
pub const RECENT_FILES_LIMIT: usize = 10;

/// One row of a user's recent-files index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentFileEntry {
    pub id: String,
    pub user_id: String,
    pub file_id: String,
    pub project_id: String,
    /// Epoch milliseconds
    pub last_accessed: i64,
}

/// A recent entry joined with its file and project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub file: FileNode,
    pub project: Project,
    pub last_accessed: i64,
}
