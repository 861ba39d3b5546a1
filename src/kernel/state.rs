use super::editor::{Drafts, EditorTabs};
use super::files::FileRegistry;
use super::projects::ProjectsState;
use crate::kernel::services::ports::WorkspaceConfig;

#[derive(Debug)]
pub struct AppState {
    pub files: FileRegistry,
    pub tabs: EditorTabs,
    pub drafts: Drafts,
    pub projects: ProjectsState,
}

impl AppState {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            files: FileRegistry::new(),
            tabs: EditorTabs::new(),
            drafts: Drafts::new(config.save_debounce()),
            projects: ProjectsState::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&WorkspaceConfig::default())
    }
}
