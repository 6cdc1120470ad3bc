//! Adjacency index keyed by parent id.

use std::collections::HashMap;

use crate::models::FileNode;

/// Children grouped by their `parent_id`, with a `None` bucket for top-level nodes.
pub struct ChildIndex<'a> {
    by_parent: HashMap<Option<&'a str>, Vec<&'a FileNode>>,
}

impl<'a> ChildIndex<'a> {
    pub fn build(nodes: &'a [FileNode]) -> Self {
        let mut by_parent: HashMap<Option<&'a str>, Vec<&'a FileNode>> = HashMap::new();
        for node in nodes {
            by_parent
                .entry(node.parent_id.as_deref())
                .or_default()
                .push(node);
        }
        Self { by_parent }
    }

    /// Direct children of `parent_id`, in input order.
    pub fn children<'s>(&'s self, parent_id: &'s str) -> &'s [&'a FileNode] {
        self.by_parent
            .get(&Some(parent_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes without a parent reference.
    pub fn top_level(&self) -> &[&'a FileNode] {
        self.by_parent
            .get(&None)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The project's root: the first parentless directory at `/`.
pub fn find_root(nodes: &[FileNode]) -> Option<&FileNode> {
    nodes.iter().find(|node| node.is_root())
}
