//! Deletion order for a directory subtree.

use std::collections::HashSet;

use super::ChildIndex;
use crate::models::FileNode;

/// Ids of `target` and everything below it, ordered so each node comes after all of
/// its descendants.
///
/// Only explicit parent links are followed, and only through directories. Returns an
/// empty list when `target` is not in `nodes`.
pub fn cascade_order(nodes: &[FileNode], target_id: &str) -> Vec<String> {
    let Some(target) = nodes.iter().find(|node| node.id == target_id) else {
        return Vec::new();
    };

    let index = ChildIndex::build(nodes);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pre_order: Vec<&FileNode> = Vec::new();
    let mut stack: Vec<&FileNode> = vec![target];

    while let Some(node) = stack.pop() {
        // A corrupted parent chain can loop back into the subtree.
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        pre_order.push(node);
        if node.is_directory {
            stack.extend(index.children(&node.id).iter().copied());
        }
    }

    pre_order.into_iter().rev().map(|node| node.id.clone()).collect()
}
