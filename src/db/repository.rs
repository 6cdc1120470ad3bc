//! Database repository shared by the project, file-tree and recent-files operations.
//!
//! Every operation takes the caller's identity as `Option<&str>`. Mutations reject a
//! missing identity with `Unauthorized`; list queries answer it with an empty result.

use chrono::Utc;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{FileNode, Project, RevisionInfo};

pub(crate) const PROJECT_COLUMNS: &str =
    "id, name, description, language, framework, user_id, created_at";

pub(crate) const FILE_COLUMNS: &str = "id, name, path, content, language, project_id, user_id, is_directory, parent_id, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(crate) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        bump_revision(&self.pool).await?;
        self.get_revision_id().await
    }

    /// Load a project only if `user_id` owns it.
    pub(crate) async fn owned_project(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ? AND user_id = ?",
            PROJECT_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    /// Load a node only if `user_id` owns it.
    pub(crate) async fn owned_node(
        &self,
        user_id: &str,
        file_id: &str,
    ) -> Result<Option<FileNode>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM files WHERE id = ? AND user_id = ?",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(node_from_row))
    }
}

/// Resolve the caller for a mutation.
pub(crate) fn require_user(user: Option<&str>) -> Result<&str, AppError> {
    user.ok_or_else(AppError::unauthenticated)
}

pub(crate) async fn bump_revision<'e, E>(executor: E) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Insert a fully-formed node row.
pub(crate) async fn insert_node<'e, E>(executor: E, node: &FileNode) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(&format!(
        "INSERT INTO files ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        FILE_COLUMNS
    ))
    .bind(&node.id)
    .bind(&node.name)
    .bind(&node.path)
    .bind(&node.content)
    .bind(&node.language)
    .bind(&node.project_id)
    .bind(&node.user_id)
    .bind(node.is_directory as i32)
    .bind(&node.parent_id)
    .bind(&node.created_at)
    .bind(&node.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Build an unsaved node with a fresh id and timestamps.
pub(crate) struct NewNode<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub language: Option<&'a str>,
    pub project_id: &'a str,
    pub user_id: &'a str,
    pub is_directory: bool,
    pub parent_id: Option<&'a str>,
}

impl NewNode<'_> {
    pub fn build(&self) -> FileNode {
        let now = Utc::now().to_rfc3339();
        FileNode {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.to_string(),
            path: self.path.to_string(),
            content: self.content.to_string(),
            language: self.language.map(str::to_string),
            project_id: self.project_id.to_string(),
            user_id: self.user_id.to_string(),
            is_directory: self.is_directory,
            parent_id: self.parent_id.map(str::to_string),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// Helper functions for row conversion

pub(crate) fn project_from_row(row: &SqliteRow) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        language: row.get("language"),
        framework: row.get("framework"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

pub(crate) fn node_from_row(row: &SqliteRow) -> FileNode {
    let is_directory: i32 = row.get("is_directory");
    FileNode {
        id: row.get("id"),
        name: row.get("name"),
        path: row.get("path"),
        content: row.get("content"),
        language: row.get("language"),
        project_id: row.get("project_id"),
        user_id: row.get("user_id"),
        is_directory: is_directory != 0,
        parent_id: row.get("parent_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
