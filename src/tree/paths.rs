//! POSIX-style path helpers for node paths.

use crate::models::ROOT_PATH;

/// Parent path of `path`, or `None` for the root itself.
pub fn parent_path(path: &str) -> Option<&str> {
    if path == ROOT_PATH {
        return None;
    }
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => Some(ROOT_PATH),
        Some(idx) => Some(&trimmed[..idx]),
    }
}

/// Last segment of `path`.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Path of a child called `name` under `parent`.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}
