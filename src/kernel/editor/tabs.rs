//! Open-tab state per project.
//!
//! A single-click opens a preview tab that the next preview replaces in
//! place; opening pinned (or re-opening the preview pinned) keeps the tab
//! until it is closed.

use crate::models::{FileId, ProjectId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabState {
    pub open: Vec<FileId>,
    pub active: Option<FileId>,
    pub preview: Option<FileId>,
}

static EMPTY_TAB_STATE: TabState = TabState {
    open: Vec::new(),
    active: None,
    preview: None,
};

impl TabState {
    pub fn is_open(&self, file_id: &FileId) -> bool {
        self.open.contains(file_id)
    }

    pub fn is_preview(&self, file_id: &FileId) -> bool {
        self.preview.as_ref() == Some(file_id)
    }

    pub fn is_active(&self, file_id: &FileId) -> bool {
        self.active.as_ref() == Some(file_id)
    }

    pub fn open_file(&mut self, file_id: FileId, pinned: bool) -> bool {
        if self.is_open(&file_id) {
            let mut changed = false;
            if self.active.as_ref() != Some(&file_id) {
                self.active = Some(file_id.clone());
                changed = true;
            }
            if pinned && self.is_preview(&file_id) {
                self.preview = None;
                changed = true;
            }
            return changed;
        }

        if pinned {
            self.open.push(file_id.clone());
            self.active = Some(file_id);
            return true;
        }

        let slot = self
            .preview
            .as_ref()
            .and_then(|preview| self.open.iter().position(|id| id == preview));
        match slot {
            Some(index) => self.open[index] = file_id.clone(),
            None => self.open.push(file_id.clone()),
        }
        self.active = Some(file_id.clone());
        self.preview = Some(file_id);
        true
    }

    pub fn close(&mut self, file_id: &FileId) -> bool {
        let Some(index) = self.open.iter().position(|id| id == file_id) else {
            return false;
        };
        self.open.remove(index);

        if self.is_active(file_id) {
            self.active = if self.open.is_empty() {
                None
            } else if index >= self.open.len() {
                self.open.last().cloned()
            } else {
                Some(self.open[index].clone())
            };
        }
        if self.is_preview(file_id) {
            self.preview = None;
        }
        true
    }

    pub fn close_all(&mut self) -> bool {
        if *self == EMPTY_TAB_STATE {
            return false;
        }
        *self = TabState::default();
        true
    }

    /// Membership is not checked; callers pass an already open id.
    pub fn set_active(&mut self, file_id: FileId) -> bool {
        if self.is_active(&file_id) {
            return false;
        }
        self.active = Some(file_id);
        true
    }
}

#[derive(Debug, Default)]
pub struct EditorTabs {
    tabs: FxHashMap<ProjectId, TabState>,
}

impl EditorTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab_state(&self, project_id: &ProjectId) -> &TabState {
        self.tabs.get(project_id).unwrap_or(&EMPTY_TAB_STATE)
    }

    fn tab_state_mut(&mut self, project_id: &ProjectId) -> &mut TabState {
        self.tabs.entry(project_id.clone()).or_default()
    }

    pub fn open_file(&mut self, project_id: &ProjectId, file_id: FileId, pinned: bool) -> bool {
        self.tab_state_mut(project_id).open_file(file_id, pinned)
    }

    pub fn close_tab(&mut self, project_id: &ProjectId, file_id: &FileId) -> bool {
        self.tabs
            .get_mut(project_id)
            .is_some_and(|state| state.close(file_id))
    }

    pub fn close_all(&mut self, project_id: &ProjectId) -> bool {
        self.tabs
            .get_mut(project_id)
            .is_some_and(TabState::close_all)
    }

    pub fn set_active(&mut self, project_id: &ProjectId, file_id: FileId) -> bool {
        self.tab_state_mut(project_id).set_active(file_id)
    }

    pub fn forget(&mut self, project_id: &ProjectId) -> bool {
        self.tabs.remove(project_id).is_some()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/tabs.rs"]
mod tests;
