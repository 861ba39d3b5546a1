//! Editor-side state that is independent of file content storage.

pub mod drafts;
pub mod tabs;

pub use drafts::Drafts;
pub use tabs::{EditorTabs, TabState};
