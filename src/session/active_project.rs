//! Last selected project per user, persisted outside the database.
//!
//! Set when a project is created or selected, read back on startup, cleared when the
//! project is deleted. The whole map is rewritten as JSON on every change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::errors::AppError;

pub struct ActiveProjectPointer {
    path: PathBuf,
    by_user: RwLock<HashMap<String, String>>,
}

impl ActiveProjectPointer {
    /// Load the pointer file at `path`. A missing or unreadable file starts empty.
    pub async fn load(path: &Path) -> Self {
        let by_user = match tokio::fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(map) => {
                    tracing::info!("Restored active project for {} user(s)", map.len());
                    map
                }
                Err(e) => {
                    tracing::warn!("Ignoring corrupt active project file {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read active project file {:?}: {}", path, e);
                HashMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            by_user: RwLock::new(by_user),
        }
    }

    pub async fn get(&self, user_id: &str) -> Option<String> {
        self.by_user.read().await.get(user_id).cloned()
    }

    pub async fn set(&self, user_id: &str, project_id: &str) -> Result<(), AppError> {
        let mut by_user = self.by_user.write().await;
        if by_user.get(user_id).map(String::as_str) == Some(project_id) {
            return Ok(());
        }
        by_user.insert(user_id.to_string(), project_id.to_string());
        self.persist(&by_user).await
    }

    /// Forget the user's pointer if it still refers to `project_id`.
    pub async fn clear(&self, user_id: &str, project_id: &str) -> Result<(), AppError> {
        let mut by_user = self.by_user.write().await;
        if by_user.get(user_id).map(String::as_str) != Some(project_id) {
            return Ok(());
        }
        by_user.remove(user_id);
        self.persist(&by_user).await
    }

    async fn persist(&self, by_user: &HashMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(by_user)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
