//! Project list owned by the signed-in user.
//!
//! Renames are applied locally before the datastore confirms them and are
//! rolled back if it refuses; every other change waits for the remote result.

use crate::kernel::services::ports::{DatastoreResult, Session};
use crate::kernel::Effect;
use crate::models::{NewProject, Project, ProjectId, ProjectPatch, UserId};
use rand::Rng;
use std::fmt;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "clever", "eager", "fancy", "gentle", "happy", "jolly", "kind", "lively",
    "lucky", "mighty", "nimble", "proud", "quiet", "rapid", "shy", "silly", "swift", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "camel", "crane", "dolphin", "falcon", "ferret", "gecko", "heron",
    "koala", "lemur", "lynx", "marmot", "otter", "panda", "puffin", "raven", "salmon", "tapir",
    "walrus",
];

const COLOURS: &[&str] = &[
    "amber", "aqua", "azure", "beige", "black", "blue", "bronze", "coral", "crimson", "gold",
    "green", "indigo", "ivory", "lime", "magenta", "olive", "orange", "purple", "silver", "teal",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectError {
    EmptyName,
    NotSignedIn,
    NotFound,
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::EmptyName => write!(f, "project name cannot be empty"),
            ProjectError::NotSignedIn => write!(f, "no signed-in user"),
            ProjectError::NotFound => write!(f, "project not found"),
        }
    }
}

impl std::error::Error for ProjectError {}

/// `adjective-animal-colour`, e.g. `swift-otter-teal`.
pub fn generate_project_name<R: Rng>(rng: &mut R) -> String {
    let mut pick = |words: &[&'static str]| words[rng.random_range(0..words.len())];
    let adjective = pick(ADJECTIVES);
    let animal = pick(ANIMALS);
    let colour = pick(COLOURS);
    format!("{adjective}-{animal}-{colour}")
}

#[derive(Debug, Default)]
pub struct ProjectsState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<String>,
    session: Option<Session>,
}

impl ProjectsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn owner_id(&self) -> Option<&UserId> {
        self.session.as_ref().map(|s| &s.user.id)
    }

    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| &p.id == id)
    }

    /// Returns true when the signed-in user changed.
    pub fn set_session(&mut self, session: Option<Session>) -> bool {
        let changed = self.owner_id() != session.as_ref().map(|s| &s.user.id);
        if session.is_none() {
            self.projects.clear();
            self.loading = false;
            self.error = None;
        }
        self.session = session;
        changed
    }

    pub fn begin_fetch(&mut self) -> Option<Effect> {
        let Some(owner_id) = self.owner_id().cloned() else {
            self.loading = false;
            return None;
        };
        self.loading = true;
        self.error = None;
        Some(Effect::FetchProjects { owner_id })
    }

    pub fn apply_loaded(&mut self, result: DatastoreResult<Vec<Project>>) {
        self.loading = false;
        match result {
            Ok(mut projects) => {
                projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                self.projects = projects;
                self.error = None;
            }
            Err(err) => {
                err.log("fetch projects");
                self.error = Some(err.message);
            }
        }
    }

    pub fn begin_create(&mut self, name: Option<&str>) -> Result<Effect, ProjectError> {
        let owner_id = self.owner_id().cloned().ok_or(ProjectError::NotSignedIn)?;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => generate_project_name(&mut rand::rng()),
        };
        Ok(Effect::InsertProject {
            input: NewProject { name, owner_id },
        })
    }

    pub fn apply_created(&mut self, result: DatastoreResult<Project>) {
        match result {
            Ok(project) => {
                tracing::info!(project = %project.id, name = %project.name, "project created");
                self.projects.insert(0, project);
                self.error = None;
            }
            Err(err) => {
                err.log("create project");
                self.error = Some(err.message);
            }
        }
    }

    /// Renames locally and returns the effect that persists it; the effect
    /// carries the old name so a failure can restore it.
    pub fn begin_rename(
        &mut self,
        id: &ProjectId,
        name: &str,
    ) -> Result<Option<Effect>, ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        let project = self.get_mut(id).ok_or(ProjectError::NotFound)?;
        if project.name == name {
            return Ok(None);
        }
        let previous_name = std::mem::replace(&mut project.name, name.to_string());
        Ok(Some(Effect::UpdateProject {
            id: id.clone(),
            patch: ProjectPatch::rename(name),
            previous_name: Some(previous_name),
        }))
    }

    pub fn begin_update(
        &mut self,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Option<Effect>, ProjectError> {
        if self.get(id).is_none() {
            return Err(ProjectError::NotFound);
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ProjectError::EmptyName);
            }
        }
        if patch.is_empty() {
            return Ok(None);
        }
        Ok(Some(Effect::UpdateProject {
            id: id.clone(),
            patch,
            previous_name: None,
        }))
    }

    pub fn apply_updated(
        &mut self,
        id: &ProjectId,
        previous_name: Option<String>,
        result: DatastoreResult<Project>,
    ) {
        match result {
            Ok(updated) => {
                if let Some(project) = self.get_mut(id) {
                    *project = updated;
                }
                self.error = None;
            }
            Err(err) => {
                err.log("update project");
                if let (Some(name), Some(project)) = (previous_name, self.get_mut(id)) {
                    project.name = name;
                }
                self.error = Some(err.message);
            }
        }
    }

    pub fn begin_delete(&self, id: &ProjectId) -> Result<Effect, ProjectError> {
        if self.get(id).is_none() {
            return Err(ProjectError::NotFound);
        }
        Ok(Effect::DeleteProject { id: id.clone() })
    }

    /// Returns true when the project was removed.
    pub fn apply_deleted(&mut self, id: &ProjectId, result: DatastoreResult<()>) -> bool {
        match result {
            Ok(()) => {
                let before = self.projects.len();
                self.projects.retain(|p| &p.id != id);
                self.error = None;
                self.projects.len() != before
            }
            Err(err) => {
                err.log("delete project");
                self.error = Some(err.message);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/projects.rs"]
mod tests;
