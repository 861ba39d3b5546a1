//! Flat file rows indexed as a per-project tree.
//!
//! Rows are stored flat (as the datastore returns them) in an arena. A
//! parent id -> children adjacency index is maintained on every mutation so
//! that children lookups, ancestor walks and subtree collection never need a
//! full scan. Children keep the order in which rows entered the tree.

use super::file::{FileKind, FileRecord};
use super::ids::FileId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

new_key_type! { pub struct NodeId; }

/// Padding of root level explorer rows.
pub const BASE_PADDING: u16 = 4;
/// Extra padding per nesting level.
pub const LEVEL_PADDING: u16 = 12;

pub fn item_padding(depth: u16) -> u16 {
    BASE_PADDING.saturating_add(depth.saturating_mul(LEVEL_PADDING))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTreeError {
    EmptyName,
    NameExists,
    ParentNotFolder,
    MoveIntoDescendant,
    InvalidContent,
    NotFound,
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::EmptyName => write!(f, "name cannot be empty"),
            FileTreeError::NameExists => write!(f, "name already exists"),
            FileTreeError::ParentNotFolder => write!(f, "parent is not a folder"),
            FileTreeError::MoveIntoDescendant => {
                write!(f, "cannot move a folder into its own subtree")
            }
            FileTreeError::InvalidContent => {
                write!(f, "content and storage id do not match the row type")
            }
            FileTreeError::NotFound => write!(f, "file not found"),
        }
    }
}

impl std::error::Error for FileTreeError {}

/// Folders before files, then by name (case-insensitive, ties broken by the
/// raw name so the order is total).
pub fn listing_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    match (a.kind, b.kind) {
        (FileKind::Folder, FileKind::File) => Ordering::Less,
        (FileKind::File, FileKind::Folder) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[derive(Debug, Clone)]
struct Node {
    record: FileRecord,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    by_id: FxHashMap<FileId, NodeId>,
    children: FxHashMap<Option<FileId>, Vec<NodeId>>,
    order: BTreeMap<u64, NodeId>,
    next_seq: u64,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut tree = Self::new();
        for record in records {
            tree.upsert(record);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, id: &FileId) -> Option<&FileRecord> {
        let node_id = self.by_id.get(id)?;
        self.arena.get(*node_id).map(|n| &n.record)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.by_id.contains_key(id)
    }

    /// All rows in the order they entered the tree.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.order
            .values()
            .filter_map(|node_id| self.arena.get(*node_id))
            .map(|n| &n.record)
    }

    pub fn to_records(&self) -> Vec<FileRecord> {
        self.iter().cloned().collect()
    }

    /// Inserts a new row, or replaces the row with the same id in place.
    pub fn upsert(&mut self, record: FileRecord) {
        match self.by_id.get(&record.id).copied() {
            Some(node_id) => self.replace_node(node_id, record),
            None => self.insert_node(record),
        }
    }

    /// Replaces an existing row. Returns `false` if the id is unknown.
    pub fn replace(&mut self, record: FileRecord) -> bool {
        match self.by_id.get(&record.id).copied() {
            Some(node_id) => {
                self.replace_node(node_id, record);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &FileId) -> Option<FileRecord> {
        let node_id = self.by_id.remove(id)?;
        let node = self.arena.remove(node_id)?;
        self.order.remove(&node.seq);
        self.unlink(&node.record.parent_id, node_id);
        Some(node.record)
    }

    fn insert_node(&mut self, record: FileRecord) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);

        let id = record.id.clone();
        let parent = record.parent_id.clone();
        let node_id = self.arena.insert(Node { record, seq });
        self.by_id.insert(id, node_id);
        self.order.insert(seq, node_id);
        self.link(parent, node_id, seq);
    }

    fn replace_node(&mut self, node_id: NodeId, record: FileRecord) {
        let Some(node) = self.arena.get_mut(node_id) else {
            return;
        };
        let seq = node.seq;
        let old_parent = node.record.parent_id.clone();
        let new_parent = record.parent_id.clone();
        node.record = record;

        if old_parent != new_parent {
            self.unlink(&old_parent, node_id);
            self.link(new_parent, node_id, seq);
        }
    }

    fn link(&mut self, parent: Option<FileId>, node_id: NodeId, seq: u64) {
        let arena = &self.arena;
        let siblings = self.children.entry(parent).or_default();
        let pos = siblings.partition_point(|n| arena.get(*n).is_some_and(|node| node.seq < seq));
        siblings.insert(pos, node_id);
    }

    fn unlink(&mut self, parent: &Option<FileId>, node_id: NodeId) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|n| *n != node_id);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }

    /// Rows whose `parent_id` is `parent`; `None` selects root rows.
    pub fn children_of(&self, parent: Option<&FileId>) -> Vec<&FileRecord> {
        self.children
            .get(&parent.cloned())
            .map(|siblings| {
                siblings
                    .iter()
                    .filter_map(|n| self.arena.get(*n))
                    .map(|n| &n.record)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_name_taken(
        &self,
        name: &str,
        parent: Option<&FileId>,
        exclude: Option<&FileId>,
    ) -> bool {
        let needle = name.to_lowercase();
        self.children_of(parent)
            .into_iter()
            .any(|f| Some(&f.id) != exclude && f.name.to_lowercase() == needle)
    }

    /// Every row below `id`, depth first, parents before their children.
    pub fn descendants(&self, id: &FileId) -> Vec<FileId> {
        let mut result = Vec::new();
        let mut visited: FxHashSet<FileId> = FxHashSet::default();
        visited.insert(id.clone());

        let mut stack: Vec<FileId> = self
            .children_of(Some(id))
            .into_iter()
            .rev()
            .map(|f| f.id.clone())
            .collect();

        while let Some(next) = stack.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }
            for child in self.children_of(Some(&next)).into_iter().rev() {
                stack.push(child.id.clone());
            }
            result.push(next);
        }

        result
    }

    /// True when `candidate` is `ancestor` itself or lies somewhere below it.
    pub fn is_within(&self, candidate: &FileId, ancestor: &FileId) -> bool {
        let mut visited: FxHashSet<&FileId> = FxHashSet::default();
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !visited.insert(id) {
                return false;
            }
            current = self.get(id).and_then(|r| r.parent_id.as_ref());
        }
        false
    }

    /// Rows from the root down to `id` (inclusive). Empty for unknown ids.
    /// The walk stops at the first parent that is not present locally.
    pub fn path_to(&self, id: &FileId) -> Vec<&FileRecord> {
        let mut path = Vec::new();
        let mut visited: FxHashSet<&FileId> = FxHashSet::default();
        let mut current = self.get(id);

        while let Some(record) = current {
            if !visited.insert(&record.id) {
                break;
            }
            path.push(record);
            current = record.parent_id.as_ref().and_then(|p| self.get(p));
        }

        path.reverse();
        path
    }

    pub fn build_tree(&self) -> Vec<TreeNode> {
        self.children_of(None)
            .into_iter()
            .map(|record| self.build_node(record))
            .collect()
    }

    fn build_node(&self, record: &FileRecord) -> TreeNode {
        let children = if record.is_folder() {
            self.children_of(Some(&record.id))
                .into_iter()
                .map(|child| self.build_node(child))
                .collect()
        } else {
            Vec::new()
        };
        TreeNode {
            file: record.clone(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub file: FileRecord,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Pre-order flattening of a forest back into rows.
    pub fn flatten(forest: &[TreeNode]) -> Vec<FileRecord> {
        let mut result = Vec::new();
        let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
        while let Some(node) = stack.pop() {
            result.push(node.file.clone());
            stack.extend(node.children.iter().rev());
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeRow {
    pub id: FileId,
    pub depth: u16,
    pub padding: u16,
    pub name: String,
    pub kind: FileKind,
    pub is_expanded: bool,
}

impl FileTree {
    /// Visible explorer rows: roots plus the children of expanded folders.
    pub fn rows(&self, expanded: &FxHashSet<FileId>) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut visited: FxHashSet<&FileId> = FxHashSet::default();
        let mut stack: Vec<(&FileRecord, u16)> = self
            .children_of(None)
            .into_iter()
            .rev()
            .map(|r| (r, 0))
            .collect();

        while let Some((record, depth)) = stack.pop() {
            if !visited.insert(&record.id) {
                continue;
            }
            let is_expanded = record.is_folder() && expanded.contains(&record.id);
            result.push(FileTreeRow {
                id: record.id.clone(),
                depth,
                padding: item_padding(depth),
                name: record.name.clone(),
                kind: record.kind,
                is_expanded,
            });

            if is_expanded {
                for child in self.children_of(Some(&record.id)).into_iter().rev() {
                    stack.push((child, depth.saturating_add(1)));
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
