use crate::kernel::action::{FilesAction, ProjectAction};
use crate::kernel::services::ports::{AuthError, DatastoreResult, JobError, Session};
use crate::kernel::Action;
use crate::models::{FileId, FileRecord, Project, ProjectId};

/// Results posted back by the runtime. Every effect produces exactly one
/// completion; auth changes arrive unprompted.
#[derive(Debug)]
pub enum AppMessage {
    SessionLoaded {
        result: Result<Option<Session>, AuthError>,
    },
    AuthChanged(Option<Session>),
    SignedOut {
        result: Result<(), AuthError>,
    },
    FilesLoaded {
        project_id: ProjectId,
        result: DatastoreResult<Vec<FileRecord>>,
    },
    FileCreated {
        project_id: ProjectId,
        result: DatastoreResult<FileRecord>,
    },
    FileUpdated {
        project_id: ProjectId,
        id: FileId,
        result: DatastoreResult<FileRecord>,
    },
    FilesDeleted {
        project_id: ProjectId,
        ids: Vec<FileId>,
        result: DatastoreResult<()>,
    },
    ProjectsLoaded {
        result: DatastoreResult<Vec<Project>>,
    },
    ProjectCreated {
        result: DatastoreResult<Project>,
    },
    ProjectUpdated {
        id: ProjectId,
        previous_name: Option<String>,
        result: DatastoreResult<Project>,
    },
    ProjectDeleted {
        id: ProjectId,
        result: DatastoreResult<()>,
    },
    JobSubmitted {
        name: String,
        result: Result<(), JobError>,
    },
}

impl AppMessage {
    /// False for messages that do not answer an effect.
    pub fn is_completion(&self) -> bool {
        !matches!(self, AppMessage::AuthChanged(_))
    }

    pub fn into_action(self) -> Action {
        match self {
            AppMessage::SessionLoaded { result } => Action::SessionLoaded { result },
            AppMessage::AuthChanged(session) => Action::AuthChanged(session),
            AppMessage::SignedOut { result } => Action::SignedOut { result },
            AppMessage::FilesLoaded { project_id, result } => {
                Action::Files(FilesAction::Loaded { project_id, result })
            }
            AppMessage::FileCreated { project_id, result } => {
                Action::Files(FilesAction::Created { project_id, result })
            }
            AppMessage::FileUpdated {
                project_id,
                id,
                result,
            } => Action::Files(FilesAction::Updated {
                project_id,
                id,
                result,
            }),
            AppMessage::FilesDeleted {
                project_id,
                ids,
                result,
            } => Action::Files(FilesAction::Deleted {
                project_id,
                ids,
                result,
            }),
            AppMessage::ProjectsLoaded { result } => {
                Action::Projects(ProjectAction::Loaded { result })
            }
            AppMessage::ProjectCreated { result } => {
                Action::Projects(ProjectAction::Created { result })
            }
            AppMessage::ProjectUpdated {
                id,
                previous_name,
                result,
            } => Action::Projects(ProjectAction::Updated {
                id,
                previous_name,
                result,
            }),
            AppMessage::ProjectDeleted { id, result } => {
                Action::Projects(ProjectAction::Deleted { id, result })
            }
            AppMessage::JobSubmitted { name, result } => Action::JobSubmitted { name, result },
        }
    }
}
