//! File tree store: node CRUD, cascading delete, reachability clean, reset and
//! template materialization.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::Row;

use super::projects::{readme_content, README_NAME, README_PATH};
use super::recent_files::touch_recent_entry;
use super::repository::{
    bump_revision, insert_node, node_from_row, require_user, NewNode, Repository, FILE_COLUMNS,
};
use crate::errors::AppError;
use crate::models::{CreateNodeRequest, FileNode, RemovedNodes, ROOT_PATH};
use crate::templates::{plan, TemplateKey};
use crate::tree::{cascade_order, find_root, join_path, sweep};

impl Repository {
    /// Create a file or directory in one of the caller's projects.
    ///
    /// A request without `parent_id` is attached to the project root so that no
    /// non-root node starts out parentless. `path` must be the parent's path joined
    /// with `name`; it is stored as given and never re-derived later.
    pub async fn create_node(
        &self,
        user: Option<&str>,
        project_id: &str,
        request: &CreateNodeRequest,
    ) -> Result<FileNode, AppError> {
        let user_id = require_user(user)?;
        if self.owned_project(user_id, project_id).await?.is_none() {
            return Err(AppError::not_found_or_denied("Project"));
        }

        let parent = match &request.parent_id {
            Some(parent_id) => Some(
                self.owned_node(user_id, parent_id)
                    .await?
                    .filter(|parent| parent.project_id == project_id)
                    .ok_or_else(|| AppError::not_found_or_denied("Parent directory"))?,
            ),
            None => self.find_project_root(project_id).await?,
        };

        if let Some(parent) = &parent {
            if !parent.is_directory {
                return Err(AppError::Validation(format!(
                    "{} is not a directory",
                    parent.path
                )));
            }
            if join_path(&parent.path, &request.name) != request.path {
                return Err(AppError::Validation(format!(
                    "Path {} does not match parent {} and name {}",
                    request.path, parent.path, request.name
                )));
            }
        }
        let parent_id = parent.map(|parent| parent.id);

        let node = NewNode {
            name: &request.name,
            path: &request.path,
            content: request.content.as_deref().unwrap_or(""),
            language: request.language.as_deref(),
            project_id,
            user_id,
            is_directory: request.is_directory.unwrap_or(false),
            parent_id: parent_id.as_deref(),
        }
        .build();

        insert_node(&self.pool, &node).await?;
        self.increment_revision().await?;

        tracing::debug!(file_id = %node.id, project_id, "Created node {}", node.path);
        Ok(node)
    }

    /// Get one of the caller's nodes.
    pub async fn get_node(&self, user: Option<&str>, file_id: &str) -> Result<FileNode, AppError> {
        let user_id = require_user(user)?;
        self.owned_node(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("File"))
    }

    /// Overwrite a file's content and touch it in the caller's recent files.
    pub async fn update_content(
        &self,
        user: Option<&str>,
        file_id: &str,
        content: &str,
    ) -> Result<FileNode, AppError> {
        let user_id = require_user(user)?;
        let mut node = self
            .owned_node(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("File"))?;

        if node.is_directory {
            return Err(AppError::Validation(
                "Directories have no content to update".to_string(),
            ));
        }

        // Content, revision and recent entry commit together. The UPDATE goes
        // first so the transaction holds the write lock before it reads anything.
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let result =
            sqlx::query("UPDATE files SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?")
                .bind(content)
                .bind(&now)
                .bind(file_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

        // The row can vanish between the read and the write.
        if result.rows_affected() == 0 {
            return Err(AppError::not_found_or_denied("File"));
        }

        bump_revision(&mut *tx).await?;
        touch_recent_entry(&mut *tx, user_id, file_id, &node.project_id).await?;
        tx.commit().await?;

        node.content = content.to_string();
        node.updated_at = now;
        Ok(node)
    }

    /// Flat node list of one of the caller's projects, in creation order.
    ///
    /// Empty when the caller is anonymous or does not own the project.
    pub async fn list_project_nodes(
        &self,
        user: Option<&str>,
        project_id: &str,
    ) -> Result<Vec<FileNode>, AppError> {
        let Some(user_id) = user else {
            return Ok(Vec::new());
        };
        if self.owned_project(user_id, project_id).await?.is_none() {
            return Ok(Vec::new());
        }
        self.project_nodes(user_id, project_id).await
    }

    /// Every stored node, for rebuilding the search index.
    pub async fn list_all_nodes(&self) -> Result<Vec<FileNode>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM files ORDER BY rowid", FILE_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(node_from_row).collect())
    }

    /// Delete a node; directories take their whole subtree with them, deepest first.
    ///
    /// Each node is removed by its own statement, so a failure part-way leaves a
    /// partially deleted subtree for [`Repository::clean_project`] to finish.
    pub async fn delete_node(
        &self,
        user: Option<&str>,
        file_id: &str,
    ) -> Result<RemovedNodes, AppError> {
        let user_id = require_user(user)?;
        let target = self
            .owned_node(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("File"))?;

        let nodes = self.project_nodes(user_id, &target.project_id).await?;
        let order = cascade_order(&nodes, &target.id);

        let mut removed = RemovedNodes::default();
        for id in order {
            if self.delete_single_node(user_id, &id).await? {
                removed.removed_ids.push(id);
            }
        }

        if removed.count() > 0 {
            self.increment_revision().await?;
        }

        tracing::info!(
            file_id,
            project_id = %target.project_id,
            "Deleted {} and {} descendant(s)",
            target.path,
            removed.count().saturating_sub(1)
        );
        Ok(removed)
    }

    /// Remove every node of the project that is no longer reachable from its root.
    ///
    /// A project without a root is left untouched.
    pub async fn clean_project(
        &self,
        user: Option<&str>,
        project_id: &str,
    ) -> Result<RemovedNodes, AppError> {
        let user_id = require_user(user)?;
        if self.owned_project(user_id, project_id).await?.is_none() {
            return Err(AppError::not_found_or_denied("Project"));
        }

        let nodes = self.project_nodes(user_id, project_id).await?;
        let sweep = sweep(&nodes);

        if sweep.root.is_none() {
            tracing::warn!(project_id, "Project has no root, skipping clean");
            return Ok(RemovedNodes::default());
        }
        if !sweep.stragglers.is_empty() {
            tracing::warn!(
                project_id,
                "Found {} parentless node(s) besides the root",
                sweep.stragglers.len()
            );
        }

        let mut removed = RemovedNodes::default();
        for id in sweep.unreachable_ids() {
            if self.delete_single_node(user_id, &id).await? {
                removed.removed_ids.push(id);
            }
        }

        if removed.count() > 0 {
            self.increment_revision().await?;
            tracing::info!(project_id, "Removed {} unreachable node(s)", removed.count());
        }
        Ok(removed)
    }

    /// Wipe everything below the root, recreate the README, apply `template` and
    /// reconcile. Returns the resulting node list.
    pub async fn reset_project(
        &self,
        user: Option<&str>,
        project_id: &str,
        template: TemplateKey,
    ) -> Result<Vec<FileNode>, AppError> {
        let user_id = require_user(user)?;
        let project = self
            .owned_project(user_id, project_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("Project"))?;

        let nodes = self.project_nodes(user_id, project_id).await?;
        let root = find_root(&nodes)
            .cloned()
            .ok_or_else(|| AppError::not_found_or_denied("Project root"))?;

        for node in nodes.iter().filter(|node| node.id != root.id) {
            self.delete_single_node(user_id, &node.id).await?;
        }

        let readme_body = readme_content(&project.name, project.description.as_deref());
        let readme = NewNode {
            name: README_NAME,
            path: README_PATH,
            content: &readme_body,
            language: Some("markdown"),
            project_id,
            user_id,
            is_directory: false,
            parent_id: Some(&root.id),
        }
        .build();
        insert_node(&self.pool, &readme).await?;
        self.increment_revision().await?;

        self.apply_template(Some(user_id), project_id, template)
            .await?;
        self.clean_project(Some(user_id), project_id).await?;

        tracing::info!(project_id, template = template.as_str(), "Reset project");
        self.project_nodes(user_id, project_id).await
    }

    /// Expand a starter template under the project's existing root.
    ///
    /// Directories are created before files so every parent path resolves through the
    /// path-to-id map. Returns the created nodes.
    pub async fn apply_template(
        &self,
        user: Option<&str>,
        project_id: &str,
        template: TemplateKey,
    ) -> Result<Vec<FileNode>, AppError> {
        let user_id = require_user(user)?;
        if self.owned_project(user_id, project_id).await?.is_none() {
            return Err(AppError::not_found_or_denied("Project"));
        }

        let root = self
            .find_project_root(project_id)
            .await?
            .ok_or_else(|| AppError::not_found_or_denied("Project root"))?;

        let planned = plan(template);
        if planned.is_empty() {
            return Ok(Vec::new());
        }

        let mut dir_ids: HashMap<String, String> = HashMap::new();
        dir_ids.insert(ROOT_PATH.to_string(), root.id.clone());

        let mut created = Vec::with_capacity(planned.len());
        let mut tx = self.pool.begin().await?;

        for entry in &planned {
            let parent_id = match dir_ids.get(&entry.parent_path) {
                Some(id) => id.clone(),
                None => {
                    tracing::warn!(
                        "Template {} has no directory {}, attaching {} to root",
                        template.as_str(),
                        entry.parent_path,
                        entry.path
                    );
                    root.id.clone()
                }
            };

            let node = NewNode {
                name: &entry.name,
                path: &entry.path,
                content: &entry.content,
                language: entry.language.as_deref(),
                project_id,
                user_id,
                is_directory: entry.is_directory,
                parent_id: Some(&parent_id),
            }
            .build();

            insert_node(&mut *tx, &node).await?;
            if node.is_directory {
                dir_ids.insert(node.path.clone(), node.id.clone());
            }
            created.push(node);
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(
            project_id,
            template = template.as_str(),
            "Applied template with {} node(s)",
            created.len()
        );
        Ok(created)
    }

    /// The project's root directory, if it has one.
    pub(crate) async fn find_project_root(
        &self,
        project_id: &str,
    ) -> Result<Option<FileNode>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM files WHERE project_id = ? AND parent_id IS NULL AND path = ? AND is_directory = 1 ORDER BY rowid LIMIT 1",
            FILE_COLUMNS
        ))
        .bind(project_id)
        .bind(ROOT_PATH)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(node_from_row))
    }

    pub(crate) async fn project_nodes(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> Result<Vec<FileNode>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM files WHERE project_id = ? AND user_id = ? ORDER BY rowid",
            FILE_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    /// Delete one node and its recent-file entries. Returns whether the node existed.
    async fn delete_single_node(&self, user_id: &str, file_id: &str) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM recent_files WHERE user_id = ? AND file_id = ?")
            .bind(user_id)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(file_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of nodes stored for a project.
    pub async fn count_project_nodes(&self, project_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM files WHERE project_id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::test_support::TestRepo;
    use crate::models::{CreateProjectRequest, Project, RECENT_FILES_LIMIT};

    const ALICE: Option<&str> = Some("alice");

    async fn project(t: &TestRepo, name: &str) -> Project {
        t.repo
            .create_project(
                ALICE,
                &CreateProjectRequest {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    fn folder(name: &str, path: &str, parent_id: &str) -> CreateNodeRequest {
        CreateNodeRequest {
            name: name.to_string(),
            path: path.to_string(),
            parent_id: Some(parent_id.to_string()),
            is_directory: Some(true),
            ..Default::default()
        }
    }

    fn source(name: &str, path: &str, parent_id: &str) -> CreateNodeRequest {
        CreateNodeRequest {
            name: name.to_string(),
            path: path.to_string(),
            content: Some("console.log(1);".to_string()),
            language: Some("javascript".to_string()),
            parent_id: Some(parent_id.to_string()),
            is_directory: Some(false),
        }
    }

    async fn root_id(t: &TestRepo, project_id: &str) -> String {
        t.repo.find_project_root(project_id).await.unwrap().unwrap().id
    }

    /// Simulate drift by writing a row the store API would never produce.
    async fn insert_raw(t: &TestRepo, project_id: &str, path: &str, parent_id: Option<&str>) -> String {
        let node = NewNode {
            name: "drift",
            path,
            content: "",
            language: None,
            project_id,
            user_id: "alice",
            is_directory: false,
            parent_id,
        }
        .build();
        insert_node(&t.repo.pool, &node).await.unwrap();
        node.id
    }

    #[tokio::test]
    async fn test_create_list_delete_scenario() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 2);

        let src = t
            .repo
            .create_node(ALICE, &p.id, &folder("src", "/src", &root))
            .await
            .unwrap();
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 3);

        let index = t
            .repo
            .create_node(ALICE, &p.id, &source("index.js", "/src/index.js", &src.id))
            .await
            .unwrap();
        let listed = t.repo.list_project_nodes(ALICE, &p.id).await.unwrap();
        assert_eq!(listed.len(), 4);
        assert!(listed.iter().any(|n| n.id == index.id));

        let removed = t.repo.delete_node(ALICE, &src.id).await.unwrap();
        assert_eq!(removed.removed_ids, vec![index.id.clone(), src.id.clone()]);

        let remaining = t.repo.list_project_nodes(ALICE, &p.id).await.unwrap();
        let paths: Vec<_> = remaining.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/README.md"]);
    }

    #[tokio::test]
    async fn test_delete_leaves_siblings_and_other_projects() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let other = project(&t, "Other").await;
        let root = root_id(&t, &p.id).await;

        let a = t.repo.create_node(ALICE, &p.id, &folder("a", "/a", &root)).await.unwrap();
        let b = t.repo.create_node(ALICE, &p.id, &folder("b", "/b", &root)).await.unwrap();
        let deep = t.repo.create_node(ALICE, &p.id, &folder("deep", "/a/deep", &a.id)).await.unwrap();
        t.repo.create_node(ALICE, &p.id, &source("x.js", "/a/deep/x.js", &deep.id)).await.unwrap();
        let y = t.repo.create_node(ALICE, &p.id, &source("y.js", "/b/y.js", &b.id)).await.unwrap();

        let removed = t.repo.delete_node(ALICE, &a.id).await.unwrap();
        assert_eq!(removed.count(), 3);

        let ids: HashSet<_> = t
            .repo
            .list_project_nodes(ALICE, &p.id)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert!(ids.contains(&b.id));
        assert!(ids.contains(&y.id));
        assert_eq!(ids.len(), 4);
        assert_eq!(t.repo.count_project_nodes(&other.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_parent_defaults_to_root() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;

        let node = t
            .repo
            .create_node(
                ALICE,
                &p.id,
                &CreateNodeRequest {
                    name: "notes.txt".to_string(),
                    path: "/notes.txt".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(node.parent_id, Some(root));
        assert_eq!(node.content, "");
        assert!(!node.is_directory);
    }

    #[tokio::test]
    async fn test_parent_must_be_a_matching_directory() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let other = project(&t, "Other").await;
        let root = root_id(&t, &p.id).await;
        let file = t
            .repo
            .create_node(ALICE, &p.id, &source("a.js", "/a.js", &root))
            .await
            .unwrap();

        let err = t
            .repo
            .create_node(ALICE, &p.id, &source("b.js", "/a.js/b.js", &file.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = t
            .repo
            .create_node(ALICE, &p.id, &source("b.js", "/lib/b.js", &root))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let foreign_root = root_id(&t, &other.id).await;
        let err = t
            .repo
            .create_node(ALICE, &p.id, &source("b.js", "/b.js", &foreign_root))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_foreign_access_is_denied() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;

        let err = t
            .repo
            .create_node(Some("bob"), &p.id, &folder("x", "/x", &root))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = t.repo.create_node(None, &p.id, &folder("x", "/x", &root)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = t.repo.update_content(Some("bob"), &root, "x").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = t.repo.delete_node(Some("bob"), &root).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(t.repo.list_project_nodes(Some("bob"), &p.id).await.unwrap().is_empty());
        assert!(t.repo.list_project_nodes(None, &p.id).await.unwrap().is_empty());
        assert!(t.repo.list_project_nodes(ALICE, "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_content_overwrites_and_touches_recent() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        let file = t
            .repo
            .create_node(ALICE, &p.id, &source("a.js", "/a.js", &root))
            .await
            .unwrap();

        let updated = t.repo.update_content(ALICE, &file.id, "let a = 2;").await.unwrap();
        assert_eq!(updated.content, "let a = 2;");
        assert_eq!(
            t.repo.get_node(ALICE, &file.id).await.unwrap().content,
            "let a = 2;"
        );

        let recent = t.repo.list_recent(ALICE).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].file.id, file.id);
        assert_eq!(recent[0].project.id, p.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_all_succeed() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;

        let mut ids = Vec::new();
        for i in 0..20 {
            let name = format!("f{}.js", i);
            let node = t
                .repo
                .create_node(ALICE, &p.id, &source(&name, &format!("/{}", name), &root))
                .await
                .unwrap();
            ids.push(node.id);
        }
        let revision_before = t.repo.get_revision_id().await.unwrap();

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let repo = t.repo.clone();
                tokio::spawn(async move { repo.update_content(ALICE, &id, "saved").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in &ids {
            assert_eq!(t.repo.get_node(ALICE, id).await.unwrap().content, "saved");
        }
        assert_eq!(t.repo.get_revision_id().await.unwrap(), revision_before + 20);

        let entries = t.repo.recent_entries("alice").await.unwrap();
        assert_eq!(entries.len(), RECENT_FILES_LIMIT);
        assert!(entries.windows(2).all(|w| w[0].last_accessed > w[1].last_accessed));
    }

    #[tokio::test]
    async fn test_update_directory_is_rejected() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        let err = t.repo.update_content(ALICE, &root, "x").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_purges_recent_entries() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        let dir = t.repo.create_node(ALICE, &p.id, &folder("src", "/src", &root)).await.unwrap();
        let file = t
            .repo
            .create_node(ALICE, &p.id, &source("a.js", "/src/a.js", &dir.id))
            .await
            .unwrap();
        t.repo.update_content(ALICE, &file.id, "x").await.unwrap();

        t.repo.delete_node(ALICE, &dir.id).await.unwrap();

        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recent_files")
            .fetch_one(&t.repo.pool)
            .await
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_clean_removes_drift_and_is_idempotent() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        let src = t.repo.create_node(ALICE, &p.id, &folder("src", "/src", &root)).await.unwrap();
        t.repo.create_node(ALICE, &p.id, &source("a.js", "/src/a.js", &src.id)).await.unwrap();

        let orphan = insert_raw(&t, &p.id, "/ghost/orphan.js", Some("no-such-parent")).await;
        let straggler = insert_raw(&t, &p.id, "/loose.js", None).await;

        let removed = t.repo.clean_project(ALICE, &p.id).await.unwrap();
        let removed_set: HashSet<_> = removed.removed_ids.into_iter().collect();
        assert_eq!(removed_set, HashSet::from([orphan, straggler]));
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 4);

        let again = t.repo.clean_project(ALICE, &p.id).await.unwrap();
        assert_eq!(again.count(), 0);
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_clean_repairs_out_of_band_directory_delete() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        let src = t.repo.create_node(ALICE, &p.id, &folder("src", "/src", &root)).await.unwrap();
        let lib = t.repo.create_node(ALICE, &p.id, &folder("lib", "/src/lib", &src.id)).await.unwrap();
        t.repo.create_node(ALICE, &p.id, &source("a.js", "/src/lib/a.js", &lib.id)).await.unwrap();

        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(&src.id)
            .execute(&t.repo.pool)
            .await
            .unwrap();

        let removed = t.repo.clean_project(ALICE, &p.id).await.unwrap();
        assert_eq!(removed.count(), 2);
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clean_without_root_is_noop() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(&root)
            .execute(&t.repo.pool)
            .await
            .unwrap();

        let removed = t.repo.clean_project(ALICE, &p.id).await.unwrap();
        assert_eq!(removed.count(), 0);
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_react_template_parents_resolve() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;

        let created = t
            .repo
            .apply_template(ALICE, &p.id, TemplateKey::React)
            .await
            .unwrap();
        assert!(!created.is_empty());

        let nodes = t.repo.list_project_nodes(ALICE, &p.id).await.unwrap();
        let by_id: HashMap<_, _> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        for node in nodes.iter().filter(|n| !n.is_root()) {
            let parent = by_id[node.parent_id.as_deref().unwrap()];
            assert!(parent.is_directory);
            assert!(node.path.starts_with(&parent.path));
            assert_eq!(
                crate::tree::parent_path(&node.path),
                Some(parent.path.as_str())
            );
        }

        assert_eq!(t.repo.clean_project(ALICE, &p.id).await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_blank_template_creates_nothing() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let created = t
            .repo
            .apply_template(ALICE, &p.id, TemplateKey::resolve("does-not-exist"))
            .await
            .unwrap();
        assert!(created.is_empty());
        assert_eq!(t.repo.count_project_nodes(&p.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_template_without_root_is_not_found() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        sqlx::query("DELETE FROM files WHERE project_id = ?")
            .bind(&p.id)
            .execute(&t.repo.pool)
            .await
            .unwrap();

        let err = t
            .repo
            .apply_template(ALICE, &p.id, TemplateKey::Node)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_rebuilds_from_template() {
        let t = TestRepo::new().await;
        let p = project(&t, "P").await;
        let root = root_id(&t, &p.id).await;
        t.repo.create_node(ALICE, &p.id, &folder("junk", "/junk", &root)).await.unwrap();
        insert_raw(&t, &p.id, "/ghost/x", Some("gone")).await;

        let nodes = t
            .repo
            .reset_project(ALICE, &p.id, TemplateKey::Python)
            .await
            .unwrap();

        let roots = nodes.iter().filter(|n| n.is_root()).count();
        assert_eq!(roots, 1);
        assert!(nodes.iter().any(|n| n.id == root));
        assert!(nodes.iter().any(|n| n.path == "/README.md"));
        assert!(nodes.iter().any(|n| n.path == "/app/greeting.py"));
        assert!(!nodes.iter().any(|n| n.path == "/junk" || n.path == "/ghost/x"));
    }
}
