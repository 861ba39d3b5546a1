//! Remote datastore contract: the `projects` and `files` collections.

use super::runtime::BoxFuture;
use crate::models::{
    FileId, FilePatch, FileRecord, NewFile, NewProject, Project, ProjectId, ProjectPatch, UserId,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl DatastoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn log(&self, op: &'static str) {
        tracing::warn!(
            op,
            code = ?self.code,
            details = ?self.details,
            hint = ?self.hint,
            "{}",
            self.message
        );
    }
}

impl fmt::Display for DatastoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DatastoreError {}

pub type DatastoreResult<T> = std::result::Result<T, DatastoreError>;

/// Generic query surface over the two collections. Every call is a single
/// remote round trip; implementations assign ids and creation timestamps.
pub trait Datastore: Send + Sync {
    /// All rows of a project, folders first, then by name.
    fn select_files<'a>(
        &'a self,
        project_id: &'a ProjectId,
    ) -> BoxFuture<'a, DatastoreResult<Vec<FileRecord>>>;

    fn insert_file<'a>(
        &'a self,
        input: &'a NewFile,
        updated_at: i64,
    ) -> BoxFuture<'a, DatastoreResult<FileRecord>>;

    fn update_file<'a>(
        &'a self,
        id: &'a FileId,
        patch: &'a FilePatch,
        updated_at: i64,
    ) -> BoxFuture<'a, DatastoreResult<FileRecord>>;

    /// Removes every listed row in one batch.
    fn delete_files<'a>(&'a self, ids: &'a [FileId]) -> BoxFuture<'a, DatastoreResult<()>>;

    /// Projects of an owner, most recently updated first.
    fn select_projects<'a>(
        &'a self,
        owner_id: &'a UserId,
    ) -> BoxFuture<'a, DatastoreResult<Vec<Project>>>;

    fn insert_project<'a>(
        &'a self,
        input: &'a NewProject,
    ) -> BoxFuture<'a, DatastoreResult<Project>>;

    fn update_project<'a>(
        &'a self,
        id: &'a ProjectId,
        patch: &'a ProjectPatch,
    ) -> BoxFuture<'a, DatastoreResult<Project>>;

    fn delete_project<'a>(&'a self, id: &'a ProjectId) -> BoxFuture<'a, DatastoreResult<()>>;
}
