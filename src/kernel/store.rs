use std::fmt;

use crate::models::{now_millis, FileId, FilePatch, FileTreeError, ProjectId};

use super::files::{FileMutation, Requested};
use super::services::ports::Session;
use super::projects::ProjectError;
use super::{Action, AppState, Effect};

mod files;
mod projects;
mod tabs;

/// Why an action was refused before anything was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    File(FileTreeError),
    Project(ProjectError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::File(err) => err.fmt(f),
            Rejection::Project(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Rejection {}

impl From<FileTreeError> for Rejection {
    fn from(err: FileTreeError) -> Self {
        Rejection::File(err)
    }
}

impl From<ProjectError> for Rejection {
    fn from(err: ProjectError) -> Self {
        Rejection::Project(err)
    }
}

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
    pub rejected: Option<Rejection>,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            state_changed,
            ..Self::default()
        }
    }

    fn effect(effect: Effect, state_changed: bool) -> Self {
        Self {
            effects: vec![effect],
            state_changed,
            rejected: None,
        }
    }

    fn rejected(rejection: impl Into<Rejection>) -> Self {
        let rejection = rejection.into();
        tracing::debug!(reason = %rejection, "action rejected");
        Self {
            rejected: Some(rejection),
            ..Self::default()
        }
    }
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Files(action) => self.reduce_files_action(action),
            Action::Tabs(action) => self.reduce_tab_action(action),
            Action::Projects(action) => self.reduce_project_action(action),
            Action::SessionLoaded { result } => match result {
                Ok(session) => self.apply_session(session),
                Err(err) => {
                    tracing::warn!(error = %err, "session load failed");
                    DispatchResult::unchanged()
                }
            },
            Action::AuthChanged(session) => self.apply_session(session),
            Action::SignOut => {
                let mut effects = self.flush_all_drafts();
                effects.push(Effect::SignOut);
                DispatchResult {
                    state_changed: !effects.is_empty(),
                    effects,
                    rejected: None,
                }
            }
            Action::SignedOut { result } => match result {
                Ok(()) => {
                    tracing::info!("signed out");
                    self.apply_session(None)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sign out failed");
                    DispatchResult::unchanged()
                }
            },
            Action::SubmitJob(event) => DispatchResult::effect(Effect::SubmitJob(event), false),
            Action::JobSubmitted { name, result } => {
                match result {
                    Ok(()) => tracing::info!(job = %name, "job submitted"),
                    Err(err) => tracing::warn!(job = %name, error = %err, "job submit failed"),
                }
                DispatchResult::unchanged()
            }
            Action::FlushDrafts => {
                let effects = self.flush_all_drafts();
                DispatchResult {
                    state_changed: !effects.is_empty(),
                    effects,
                    rejected: None,
                }
            }
            Action::Tick { now } => {
                let due = self.state.drafts.take_due(now);
                let state_changed = !due.is_empty();
                let now_ms = now_millis();
                let effects = due
                    .into_iter()
                    .filter_map(|(project_id, file_id, content)| {
                        self.save_content(&project_id, file_id, content, now_ms)
                    })
                    .collect();
                DispatchResult {
                    effects,
                    state_changed,
                    rejected: None,
                }
            }
        }
    }

    fn apply_session(&mut self, session: Option<Session>) -> DispatchResult {
        let signed_in = session.is_some();
        if !self.state.projects.set_session(session) {
            return DispatchResult::unchanged();
        }
        if !signed_in {
            return DispatchResult::changed(true);
        }
        match self.state.projects.begin_fetch() {
            Some(effect) => DispatchResult::effect(effect, true),
            None => DispatchResult::changed(true),
        }
    }

    /// Writes back buffered content for the given files, if any is pending.
    fn flush_drafts_for(&mut self, project_id: &ProjectId, file_ids: &[FileId]) -> Vec<Effect> {
        let now_ms = now_millis();
        let mut effects = Vec::new();
        for file_id in file_ids {
            let Some(content) = self.state.drafts.take(project_id, file_id) else {
                continue;
            };
            effects.extend(self.save_content(project_id, file_id.clone(), content, now_ms));
        }
        effects
    }

    fn flush_all_drafts(&mut self) -> Vec<Effect> {
        let now_ms = now_millis();
        self.state
            .drafts
            .take_all()
            .into_iter()
            .filter_map(|(project_id, file_id, content)| {
                self.save_content(&project_id, file_id, content, now_ms)
            })
            .collect()
    }

    fn save_content(
        &mut self,
        project_id: &ProjectId,
        file_id: FileId,
        content: String,
        now_ms: i64,
    ) -> Option<Effect> {
        let mutation = FileMutation::Update {
            id: file_id,
            patch: FilePatch::content(content),
        };
        match self.state.files.request(project_id, mutation, now_ms) {
            Ok(Requested::Started(effect)) => Some(effect),
            Ok(Requested::Queued | Requested::Skipped) => None,
            Err(err) => {
                tracing::warn!(project = %project_id, error = %err, "draft dropped");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
