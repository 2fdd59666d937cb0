//! Folder tree construction.
//!
//! Builds a nested tree view from the flat record list of one owner.
//! Child ordering is deterministic: case-insensitive name, then creation
//! time, then id, so repeated reads of an unchanged tree are identical.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::model::{FileRecord, RecordKind};

/// One node of the nested folder tree.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FolderTreeNode {
    /// Record ID.
    pub id: String,
    /// Record name.
    pub name: String,
    /// File or folder.
    pub kind: RecordKind,
    /// Content size in bytes (0 for folders).
    pub size: i64,
    /// Child nodes, folders and files alike.
    pub children: Vec<FolderTreeNode>,
}

impl FolderTreeNode {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            kind: record.kind,
            size: record.size,
            children: Vec::new(),
        }
    }
}

/// Build the nested tree rooted at `root` from `records`.
///
/// `records` is the complete flat record set of one owner. Records whose
/// parent chain does not reach `root` are ignored.
pub fn build_tree(root: &FileRecord, records: &[FileRecord]) -> FolderTreeNode {
    let mut by_parent: HashMap<&str, Vec<&FileRecord>> = HashMap::new();
    for record in records {
        if let Some(parent_id) = record.parent_id.as_deref() {
            by_parent.entry(parent_id).or_default().push(record);
        }
    }
    for children in by_parent.values_mut() {
        children.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    build_node(root, &by_parent)
}

fn build_node(
    record: &FileRecord,
    by_parent: &HashMap<&str, Vec<&FileRecord>>,
) -> FolderTreeNode {
    let mut node = FolderTreeNode::from_record(record);
    if let Some(children) = by_parent.get(record.id.as_str()) {
        node.children = children
            .iter()
            .map(|child| build_node(child, by_parent))
            .collect();
    }
    node
}
