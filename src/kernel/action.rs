use std::time::Instant;

use crate::kernel::services::ports::{
    AuthError, DatastoreResult, JobError, JobEvent, Session,
};
use crate::models::{
    FileId, FilePatch, FileRecord, NewFile, Project, ProjectId, ProjectPatch,
};

#[derive(Debug, Clone)]
pub enum Action {
    Files(FilesAction),
    Tabs(TabAction),
    Projects(ProjectAction),
    SessionLoaded {
        result: Result<Option<Session>, AuthError>,
    },
    AuthChanged(Option<Session>),
    SignOut,
    SignedOut {
        result: Result<(), AuthError>,
    },
    SubmitJob(JobEvent),
    JobSubmitted {
        name: String,
        result: Result<(), JobError>,
    },
    /// Flushes every buffered edit regardless of its deadline.
    FlushDrafts,
    Tick {
        now: Instant,
    },
}

#[derive(Debug, Clone)]
pub enum FilesAction {
    Fetch {
        project_id: ProjectId,
    },
    Create {
        input: NewFile,
    },
    Update {
        project_id: ProjectId,
        id: FileId,
        patch: FilePatch,
    },
    Rename {
        project_id: ProjectId,
        id: FileId,
        name: String,
    },
    Move {
        project_id: ProjectId,
        id: FileId,
        parent_id: Option<FileId>,
    },
    Delete {
        project_id: ProjectId,
        id: FileId,
    },
    EditContent {
        project_id: ProjectId,
        id: FileId,
        content: String,
        now: Instant,
    },
    Loaded {
        project_id: ProjectId,
        result: DatastoreResult<Vec<FileRecord>>,
    },
    Created {
        project_id: ProjectId,
        result: DatastoreResult<FileRecord>,
    },
    Updated {
        project_id: ProjectId,
        id: FileId,
        result: DatastoreResult<FileRecord>,
    },
    Deleted {
        project_id: ProjectId,
        ids: Vec<FileId>,
        result: DatastoreResult<()>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    Open {
        project_id: ProjectId,
        file_id: FileId,
        pinned: bool,
    },
    Close {
        project_id: ProjectId,
        file_id: FileId,
    },
    CloseAll {
        project_id: ProjectId,
    },
    SetActive {
        project_id: ProjectId,
        file_id: FileId,
    },
}

#[derive(Debug, Clone)]
pub enum ProjectAction {
    Fetch,
    Create {
        name: Option<String>,
    },
    Rename {
        id: ProjectId,
        name: String,
    },
    Update {
        id: ProjectId,
        patch: ProjectPatch,
    },
    Delete {
        id: ProjectId,
    },
    Loaded {
        result: DatastoreResult<Vec<Project>>,
    },
    Created {
        result: DatastoreResult<Project>,
    },
    Updated {
        id: ProjectId,
        previous_name: Option<String>,
        result: DatastoreResult<Project>,
    },
    Deleted {
        id: ProjectId,
        result: DatastoreResult<()>,
    },
}

impl TabAction {
    pub fn project_id(&self) -> &ProjectId {
        match self {
            TabAction::Open { project_id, .. }
            | TabAction::Close { project_id, .. }
            | TabAction::CloseAll { project_id }
            | TabAction::SetActive { project_id, .. } => project_id,
        }
    }
}
