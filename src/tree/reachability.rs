//! Reachability sweep: which nodes can no longer be reached from the root.

use std::collections::HashSet;

use super::{find_root, ChildIndex};
use crate::models::FileNode;

/// Result of a reachability sweep over one project.
#[derive(Debug, Default)]
pub struct Sweep<'a> {
    pub root: Option<&'a FileNode>,
    /// Every stored node, root excluded, that was not visited from the root.
    pub unreachable: Vec<&'a FileNode>,
    /// Parentless nodes other than the root.
    pub stragglers: Vec<&'a FileNode>,
}

impl<'a> Sweep<'a> {
    pub fn unreachable_ids(&self) -> Vec<String> {
        self.unreachable.iter().map(|node| node.id.clone()).collect()
    }
}

/// Walk the tree from the root and collect everything the walk never visits.
///
/// Files are visited but never descended into. Without a root nothing is reported, since
/// reachability cannot be established.
pub fn sweep(nodes: &[FileNode]) -> Sweep<'_> {
    let Some(root) = find_root(nodes) else {
        return Sweep::default();
    };

    let index = ChildIndex::build(nodes);
    let mut visited: HashSet<&str> = HashSet::with_capacity(nodes.len());
    visited.insert(root.id.as_str());

    let mut stack: Vec<&str> = vec![root.id.as_str()];
    while let Some(dir_id) = stack.pop() {
        for child in index.children(dir_id) {
            if !visited.insert(child.id.as_str()) {
                continue;
            }
            if child.is_directory {
                stack.push(child.id.as_str());
            }
        }
    }

    let stragglers = index
        .top_level()
        .iter()
        .copied()
        .filter(|node| node.id != root.id)
        .collect();

    let unreachable = nodes
        .iter()
        .filter(|node| node.id != root.id && !visited.contains(node.id.as_str()))
        .collect();

    Sweep {
        root: Some(root),
        unreachable,
        stragglers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::test_support::{dir, file, root};

    #[test]
    fn test_everything_reachable() {
        let nodes = vec![
            root("r"),
            file("readme", "/README.md", "r"),
            dir("src", "/src", "r"),
            file("index", "/src/index.js", "src"),
        ];
        let sweep = sweep(&nodes);
        assert_eq!(sweep.root.map(|r| r.id.as_str()), Some("r"));
        assert!(sweep.unreachable.is_empty());
        assert!(sweep.stragglers.is_empty());
    }

    #[test]
    fn test_dangling_parent_is_unreachable() {
        let nodes = vec![
            root("r"),
            dir("src", "/src", "r"),
            file("lost", "/gone/lost.js", "gone"),
        ];
        assert_eq!(sweep(&nodes).unreachable_ids(), vec!["lost".to_string()]);
    }

    #[test]
    fn test_whole_orphaned_subtree_is_unreachable() {
        let nodes = vec![
            root("r"),
            dir("a", "/missing/a", "missing"),
            dir("b", "/missing/a/b", "a"),
            file("c", "/missing/a/b/c.txt", "b"),
        ];
        let mut ids = sweep(&nodes).unreachable_ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_children_of_files_are_not_descended() {
        let nodes = vec![
            root("r"),
            file("f", "/f.txt", "r"),
            file("under-file", "/f.txt/x", "f"),
        ];
        assert_eq!(sweep(&nodes).unreachable_ids(), vec!["under-file".to_string()]);
    }

    #[test]
    fn test_parentless_non_root_is_a_straggler() {
        let mut loose = dir("loose", "/loose", "r");
        loose.parent_id = None;
        let nodes = vec![root("r"), loose];
        let sweep = sweep(&nodes);
        assert_eq!(sweep.stragglers.len(), 1);
        assert_eq!(sweep.unreachable_ids(), vec!["loose".to_string()]);
    }

    #[test]
    fn test_cycle_without_root_path_terminates() {
        let nodes = vec![root("r"), dir("a", "/a", "b"), dir("b", "/b", "a")];
        let mut ids = sweep(&nodes).unreachable_ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_no_root_reports_nothing() {
        let nodes = vec![dir("src", "/src", "r"), file("x", "/src/x", "src")];
        let sweep = sweep(&nodes);
        assert!(sweep.root.is_none());
        assert!(sweep.unreachable.is_empty());
    }
}
