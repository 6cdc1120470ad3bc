//! Project directory: per-user projects and their cascading deletion.

use chrono::Utc;

use super::repository::{
    bump_revision, insert_node, project_from_row, require_user, NewNode, Repository,
    PROJECT_COLUMNS,
};
use crate::errors::AppError;
use crate::models::{CreateProjectRequest, Project, ROOT_PATH};

/// Name of the project created for users who have none.
pub const DEFAULT_PROJECT_NAME: &str = "my-project";

pub(crate) const README_NAME: &str = "README.md";
pub(crate) const README_PATH: &str = "/README.md";

/// Body of the welcome file every new project starts with.
pub(crate) fn readme_content(name: &str, description: Option<&str>) -> String {
    format!(
        "# {}\n\n{}\n\nStart coding by creating new files or editing existing ones.",
        name,
        description.unwrap_or("Welcome to your new project!")
    )
}

impl Repository {
    /// List the caller's projects, oldest first. Empty without an identity.
    pub async fn list_projects(&self, user: Option<&str>) -> Result<Vec<Project>, AppError> {
        let Some(user_id) = user else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE user_id = ? ORDER BY created_at, rowid",
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Get one of the caller's projects.
    pub async fn get_project(
        &self,
        user: Option<&str>,
        project_id: &str,
    ) -> Result<Project, AppError> {
        let user_id = require_user(user)?;
        self.owned_project(user_id, project_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("Project"))
    }

    /// Create a project together with its root directory and welcome README.
    pub async fn create_project(
        &self,
        user: Option<&str>,
        request: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let user_id = require_user(user)?;

        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            description: request.description.clone(),
            language: request.language.clone(),
            framework: request.framework.clone(),
            user_id: user_id.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let root = NewNode {
            name: &project.name,
            path: ROOT_PATH,
            content: "",
            language: None,
            project_id: &project.id,
            user_id,
            is_directory: true,
            parent_id: None,
        }
        .build();

        let readme_body = readme_content(&project.name, project.description.as_deref());
        let readme = NewNode {
            name: README_NAME,
            path: README_PATH,
            content: &readme_body,
            language: Some("markdown"),
            project_id: &project.id,
            user_id,
            is_directory: false,
            parent_id: Some(&root.id),
        }
        .build();

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO projects ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            PROJECT_COLUMNS
        ))
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.language)
        .bind(&project.framework)
        .bind(&project.user_id)
        .bind(&project.created_at)
        .execute(&mut *tx)
        .await?;

        insert_node(&mut *tx, &root).await?;
        insert_node(&mut *tx, &readme).await?;
        bump_revision(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(project_id = %project.id, user_id, "Created project {:?}", project.name);
        Ok(project)
    }

    /// Return the caller's oldest project, creating a default one if they have none.
    pub async fn ensure_default_project(&self, user: Option<&str>) -> Result<Project, AppError> {
        let user_id = require_user(user)?;

        if let Some(project) = self.list_projects(Some(user_id)).await?.into_iter().next() {
            return Ok(project);
        }

        tracing::info!(user_id, "Bootstrapping default project");
        self.create_project(
            Some(user_id),
            &CreateProjectRequest {
                name: DEFAULT_PROJECT_NAME.to_string(),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a project, all of its nodes and every recent entry pointing into it.
    pub async fn delete_project(
        &self,
        user: Option<&str>,
        project_id: &str,
    ) -> Result<(), AppError> {
        let user_id = require_user(user)?;
        if self.owned_project(user_id, project_id).await?.is_none() {
            return Err(AppError::not_found_or_denied("Project"));
        }

        let files = sqlx::query("DELETE FROM files WHERE project_id = ? AND user_id = ?")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM recent_files WHERE user_id = ? AND project_id = ?")
            .bind(user_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found_or_denied("Project"));
        }

        self.increment_revision().await?;
        tracing::info!(
            project_id,
            user_id,
            "Deleted project and {} node(s)",
            files.rows_affected()
        );
        Ok(())
    }
}
