//! Data model layer.

pub mod file;
pub mod file_tree;
pub mod ids;
pub mod project;

pub use file::{
    normalize_updated_at, now_millis, rename_selection, FileKind, FilePatch, FileRecord, NewFile,
};
pub use file_tree::{
    item_padding, listing_order, FileTree, FileTreeError, FileTreeRow, NodeId, TreeNode,
    BASE_PADDING, LEVEL_PADDING,
};
pub use ids::{FileId, ProjectId, UserId};
pub use project::{ExportStatus, ImportStatus, NewProject, Project, ProjectPatch};
