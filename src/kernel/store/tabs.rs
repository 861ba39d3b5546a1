use crate::kernel::action::TabAction;
use crate::models::FileId;

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_tab_action(&mut self, action: TabAction) -> DispatchResult {
        let project_id = action.project_id().clone();
        let before = self.state.tabs.tab_state(&project_id).clone();

        let state_changed = match action {
            TabAction::Open {
                file_id, pinned, ..
            } => self.state.tabs.open_file(&project_id, file_id, pinned),
            TabAction::Close { file_id, .. } => self.state.tabs.close_tab(&project_id, &file_id),
            TabAction::CloseAll { .. } => self.state.tabs.close_all(&project_id),
            TabAction::SetActive { file_id, .. } => {
                self.state.tabs.set_active(&project_id, file_id)
            }
        };
        if !state_changed {
            return DispatchResult::unchanged();
        }

        // Buffered edits are written back once their tab stops being the
        // focused one or is closed.
        let after = self.state.tabs.tab_state(&project_id);
        let mut leaving: Vec<FileId> = before
            .open
            .iter()
            .filter(|id| !after.is_open(id))
            .cloned()
            .collect();
        if let Some(previous) = before.active {
            if after.active.as_ref() != Some(&previous) && !leaving.contains(&previous) {
                leaving.push(previous);
            }
        }

        DispatchResult {
            effects: self.flush_drafts_for(&project_id, &leaving),
            state_changed: true,
            rejected: None,
        }
    }
}
