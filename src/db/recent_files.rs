//! Recent-files tracker: a bounded, recency-ordered index of edited files per user.

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use super::repository::{require_user, Repository};
use crate::errors::AppError;
use crate::models::{RecentFile, RecentFileEntry, RECENT_FILES_LIMIT};

impl Repository {
    /// Insert or refresh the caller's entry for `file_id`, then evict everything
    /// beyond the most recent [`RECENT_FILES_LIMIT`] entries.
    pub async fn touch_recent(
        &self,
        user: Option<&str>,
        file_id: &str,
        project_id: &str,
    ) -> Result<RecentFileEntry, AppError> {
        let user_id = require_user(user)?;
        let mut tx = self.pool.begin().await?;
        let entry = touch_recent_entry(&mut *tx, user_id, file_id, project_id).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// The caller's recent files, newest first, joined with file and project.
    ///
    /// Entries whose file or project no longer exists are skipped.
    pub async fn list_recent(&self, user: Option<&str>) -> Result<Vec<RecentFile>, AppError> {
        let Some(user_id) = user else {
            return Ok(Vec::new());
        };

        let entries = self.recent_entries(user_id).await?;
        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let file = self.owned_node(user_id, &entry.file_id).await?;
            let project = self.owned_project(user_id, &entry.project_id).await?;
            if let (Some(file), Some(project)) = (file, project) {
                files.push(RecentFile {
                    file,
                    project,
                    last_accessed: entry.last_accessed,
                });
            }
        }

        Ok(files)
    }

    /// Raw entries for a user, newest first.
    pub(crate) async fn recent_entries(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecentFileEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, file_id, project_id, last_accessed FROM recent_files WHERE user_id = ? ORDER BY last_accessed DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(RECENT_FILES_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| RecentFileEntry {
                id: row.get("id"),
                user_id: row.get("user_id"),
                file_id: row.get("file_id"),
                project_id: row.get("project_id"),
                last_accessed: row.get("last_accessed"),
            })
            .collect())
    }
}

/// Upsert a recent-file entry on an open transaction.
///
/// The first statement is a write, so the transaction takes the write lock before
/// reading anything and a concurrent commit cannot invalidate its snapshot.
/// Timestamps are kept strictly increasing per user so touches within the same
/// millisecond still have a defined order.
pub(crate) async fn touch_recent_entry(
    conn: &mut SqliteConnection,
    user_id: &str,
    file_id: &str,
    project_id: &str,
) -> Result<RecentFileEntry, AppError> {
    let now = Utc::now().timestamp_millis();

    let touched = sqlx::query(
        r#"UPDATE recent_files
           SET last_accessed = MAX(?, (SELECT MAX(last_accessed) + 1 FROM recent_files WHERE user_id = ?)),
               project_id = ?
           WHERE user_id = ? AND file_id = ?
           RETURNING id, last_accessed"#,
    )
    .bind(now)
    .bind(user_id)
    .bind(project_id)
    .bind(user_id)
    .bind(file_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (id, last_accessed) = match touched {
        Some(row) => (row.get("id"), row.get("last_accessed")),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            let last_accessed: i64 = sqlx::query_scalar(
                r#"INSERT INTO recent_files (id, user_id, file_id, project_id, last_accessed)
                   SELECT ?, ?, ?, ?, MAX(?, COALESCE(MAX(last_accessed) + 1, ?))
                   FROM recent_files WHERE user_id = ?
                   RETURNING last_accessed"#,
            )
            .bind(&id)
            .bind(user_id)
            .bind(file_id)
            .bind(project_id)
            .bind(now)
            .bind(now)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;
            (id, last_accessed)
        }
    };

    let evicted = sqlx::query(
        r#"DELETE FROM recent_files
           WHERE user_id = ?
             AND id NOT IN (
                 SELECT id FROM recent_files
                 WHERE user_id = ?
                 ORDER BY last_accessed DESC
                 LIMIT ?
             )"#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(RECENT_FILES_LIMIT as i64)
    .execute(&mut *conn)
    .await?;

    if evicted.rows_affected() > 0 {
        tracing::debug!(
            user_id,
            "Evicted {} recent file entr(ies)",
            evicted.rows_affected()
        );
    }

    Ok(RecentFileEntry {
        id,
        user_id: user_id.to_string(),
        file_id: file_id.to_string(),
        project_id: project_id.to_string(),
        last_accessed,
    })
}
