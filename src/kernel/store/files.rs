use crate::kernel::action::FilesAction;
use crate::kernel::files::{FileMutation, Requested};
use crate::kernel::Effect;
use crate::models::{now_millis, FileId, FilePatch, FileTreeError, ProjectId};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_files_action(&mut self, action: FilesAction) -> DispatchResult {
        let now_ms = now_millis();
        match action {
            FilesAction::Fetch { project_id } => match self.state.files.begin_fetch(&project_id) {
                Some(effect) => DispatchResult::effect(effect, true),
                None => DispatchResult::unchanged(),
            },
            FilesAction::Create { input } => {
                let project_id = input.project_id.clone();
                self.request_mutation(&project_id, FileMutation::Create(input), now_ms)
            }
            FilesAction::Update {
                project_id,
                id,
                patch,
            } => {
                if patch.content.is_some() {
                    self.state.drafts.discard(&project_id, &id);
                }
                self.request_mutation(&project_id, FileMutation::Update { id, patch }, now_ms)
            }
            FilesAction::Rename {
                project_id,
                id,
                name,
            } => self.request_mutation(
                &project_id,
                FileMutation::Update {
                    id,
                    patch: FilePatch::rename(name),
                },
                now_ms,
            ),
            FilesAction::Move {
                project_id,
                id,
                parent_id,
            } => self.request_mutation(
                &project_id,
                FileMutation::Update {
                    id,
                    patch: FilePatch::move_to(parent_id),
                },
                now_ms,
            ),
            FilesAction::Delete { project_id, id } => {
                self.request_mutation(&project_id, FileMutation::Delete { id }, now_ms)
            }
            FilesAction::EditContent {
                project_id,
                id,
                content,
                now,
            } => {
                match self.state.files.get(&project_id, &id) {
                    None => return DispatchResult::rejected(FileTreeError::NotFound),
                    Some(record) if record.is_folder() || record.is_binary() => {
                        return DispatchResult::rejected(FileTreeError::InvalidContent)
                    }
                    Some(_) => {}
                }
                self.state.drafts.edit(&project_id, &id, content, now);
                DispatchResult::changed(true)
            }
            FilesAction::Loaded { project_id, result } => {
                self.state.files.apply_loaded(&project_id, result);
                DispatchResult::changed(true)
            }
            FilesAction::Created { project_id, result } => {
                let next = self.state.files.apply_created(&project_id, result, now_ms);
                after_completion(next)
            }
            FilesAction::Updated {
                project_id, result, ..
            } => {
                let next = self.state.files.apply_updated(&project_id, result, now_ms);
                after_completion(next)
            }
            FilesAction::Deleted {
                project_id,
                ids,
                result,
            } => {
                if result.is_ok() {
                    self.forget_deleted(&project_id, &ids);
                }
                let next = self
                    .state
                    .files
                    .apply_deleted(&project_id, &ids, result, now_ms);
                after_completion(next)
            }
        }
    }

    fn request_mutation(
        &mut self,
        project_id: &ProjectId,
        mutation: FileMutation,
        now_ms: i64,
    ) -> DispatchResult {
        match self.state.files.request(project_id, mutation, now_ms) {
            Ok(Requested::Started(effect)) => DispatchResult::effect(effect, true),
            Ok(Requested::Queued) => DispatchResult::changed(true),
            Ok(Requested::Skipped) => DispatchResult::unchanged(),
            Err(err) => DispatchResult::rejected(err),
        }
    }

    /// Closes tabs and drops buffered edits of rows that no longer exist.
    fn forget_deleted(&mut self, project_id: &ProjectId, ids: &[FileId]) {
        for id in ids {
            self.state.drafts.discard(project_id, id);
            self.state.tabs.close_tab(project_id, id);
        }
    }
}

fn after_completion(next: Option<Effect>) -> DispatchResult {
    match next {
        Some(effect) => DispatchResult::effect(effect, true),
        None => DispatchResult::changed(true),
    }
}
