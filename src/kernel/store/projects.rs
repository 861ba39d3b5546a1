use crate::kernel::action::ProjectAction;
use crate::models::ProjectId;

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_project_action(&mut self, action: ProjectAction) -> DispatchResult {
        let projects = &mut self.state.projects;
        match action {
            ProjectAction::Fetch => {
                let was_loading = projects.loading;
                match projects.begin_fetch() {
                    Some(effect) => DispatchResult::effect(effect, true),
                    None => DispatchResult::changed(was_loading),
                }
            }
            ProjectAction::Create { name } => match projects.begin_create(name.as_deref()) {
                Ok(effect) => DispatchResult::effect(effect, false),
                Err(err) => DispatchResult::rejected(err),
            },
            ProjectAction::Rename { id, name } => match projects.begin_rename(&id, &name) {
                Ok(Some(effect)) => DispatchResult::effect(effect, true),
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => DispatchResult::rejected(err),
            },
            ProjectAction::Update { id, patch } => match projects.begin_update(&id, patch) {
                Ok(Some(effect)) => DispatchResult::effect(effect, false),
                Ok(None) => DispatchResult::unchanged(),
                Err(err) => DispatchResult::rejected(err),
            },
            ProjectAction::Delete { id } => match projects.begin_delete(&id) {
                Ok(effect) => DispatchResult::effect(effect, false),
                Err(err) => DispatchResult::rejected(err),
            },
            ProjectAction::Loaded { result } => {
                projects.apply_loaded(result);
                DispatchResult::changed(true)
            }
            ProjectAction::Created { result } => {
                projects.apply_created(result);
                DispatchResult::changed(true)
            }
            ProjectAction::Updated {
                id,
                previous_name,
                result,
            } => {
                projects.apply_updated(&id, previous_name, result);
                DispatchResult::changed(true)
            }
            ProjectAction::Deleted { id, result } => {
                if result.is_ok() {
                    self.forget_project(&id);
                }
                self.state.projects.apply_deleted(&id, result);
                DispatchResult::changed(true)
            }
        }
    }

    fn forget_project(&mut self, id: &ProjectId) {
        tracing::info!(project = %id, "project deleted, dropping its files and tabs");
        self.state.files.forget(id);
        self.state.tabs.forget(id);
        self.state.drafts.discard_project(id);
    }
}
