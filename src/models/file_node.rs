//! File tree node model and request bodies.

use serde::{Deserialize, Serialize};

/// Path of every project's root directory.
pub const ROOT_PATH: &str = "/";

/// A directory or file in a project's tree.
///
/// `path` is POSIX-style and always starts with `/`. It is supplied by whoever creates
/// the node and is never re-derived from the parent chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub project_id: String,
    pub user_id: String,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl FileNode {
    /// Whether this node is the project's root directory.
    pub fn is_root(&self) -> bool {
        self.is_directory && self.parent_id.is_none() && self.path == ROOT_PATH
    }
}

/// Request body for creating a file or directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_directory: Option<bool>,
}

/// Request body for overwriting a file's content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub content: String,
}

/// Outcome of a structural operation that removes nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemovedNodes {
    pub removed_ids: Vec<String>,
}

impl RemovedNodes {
    pub fn count(&self) -> usize {
        self.removed_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, is_directory: bool, parent_id: Option<&str>) -> FileNode {
        FileNode {
            id: "n".to_string(),
            name: "n".to_string(),
            path: path.to_string(),
            content: String::new(),
            language: None,
            project_id: "p".to_string(),
            user_id: "u".to_string(),
            is_directory,
            parent_id: parent_id.map(str::to_string),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_is_root() {
        assert!(node("/", true, None).is_root());
        assert!(!node("/", false, None).is_root());
        assert!(!node("/src", true, None).is_root());
        assert!(!node("/", true, Some("other")).is_root());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(node("/src", true, Some("root"))).unwrap();
        assert_eq!(json["isDirectory"], true);
        assert_eq!(json["parentId"], "root");
        assert!(json.get("language").is_none());
    }
}
