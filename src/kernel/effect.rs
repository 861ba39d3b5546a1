use crate::kernel::services::ports::JobEvent;
use crate::models::{FileId, FilePatch, NewFile, NewProject, ProjectId, ProjectPatch, UserId};

/// Remote work requested by a reducer. Each effect yields exactly one
/// completion message.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadSession,
    SignOut,
    FetchFiles {
        project_id: ProjectId,
    },
    InsertFile {
        project_id: ProjectId,
        input: NewFile,
        updated_at: i64,
    },
    UpdateFile {
        project_id: ProjectId,
        id: FileId,
        patch: FilePatch,
        updated_at: i64,
    },
    DeleteFiles {
        project_id: ProjectId,
        ids: Vec<FileId>,
    },
    FetchProjects {
        owner_id: UserId,
    },
    InsertProject {
        input: NewProject,
    },
    UpdateProject {
        id: ProjectId,
        patch: ProjectPatch,
        previous_name: Option<String>,
    },
    DeleteProject {
        id: ProjectId,
    },
    SubmitJob(JobEvent),
}
