//! In-process datastore holding both collections behind a mutex.
//!
//! Behaves like the hosted tables the kernel talks to: ids and creation
//! timestamps are assigned here, a file's parent must exist in the same
//! project, and deleting a project removes its rows. Failures can be injected
//! per operation for tests and demos.

use crate::kernel::services::ports::{BoxFuture, Datastore, DatastoreError, DatastoreResult};
use crate::models::{
    listing_order, now_millis, FileId, FilePatch, FileRecord, NewFile, NewProject, Project,
    ProjectId, ProjectPatch, UserId,
};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatastoreOp {
    SelectFiles,
    InsertFile,
    UpdateFile,
    DeleteFiles,
    SelectProjects,
    InsertProject,
    UpdateProject,
    DeleteProject,
}

#[derive(Debug, Default)]
struct Tables {
    files: Vec<FileRecord>,
    projects: Vec<Project>,
    next_id: u64,
    failures: FxHashMap<DatastoreOp, VecDeque<DatastoreError>>,
    calls: Vec<DatastoreOp>,
}

impl Tables {
    fn begin(&mut self, op: DatastoreOp) -> DatastoreResult<()> {
        self.calls.push(op);
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

fn row_not_found(table: &str) -> DatastoreError {
    DatastoreError::new(format!("no {table} row matched"))
        .with_code("PGRST116")
        .with_details("The result contains 0 rows")
        .with_hint(format!("the {table} row may have been deleted or belong to another owner"))
}

#[derive(Debug, Default)]
pub struct MemoryDatastore {
    tables: Mutex<Tables>,
    latency: Option<Duration>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits this long before touching the tables.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn seed_project(&self, project: Project) {
        self.lock().projects.push(project);
    }

    pub fn seed_file(&self, record: FileRecord) {
        self.lock().files.push(record);
    }

    /// The next call of `op` fails with `err`. Queued failures are consumed in
    /// order.
    pub fn fail_next(&self, op: DatastoreOp, err: DatastoreError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    pub fn calls(&self) -> Vec<DatastoreOp> {
        self.lock().calls.clone()
    }

    pub fn files(&self, project_id: &ProjectId) -> Vec<FileRecord> {
        let mut files: Vec<FileRecord> = self
            .lock()
            .files
            .iter()
            .filter(|f| &f.project_id == project_id)
            .cloned()
            .collect();
        files.sort_by(listing_order);
        files
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }
}

impl Datastore for MemoryDatastore {
    fn select_files<'a>(
        &'a self,
        project_id: &'a ProjectId,
    ) -> BoxFuture<'a, DatastoreResult<Vec<FileRecord>>> {
        Box::pin(async move {
            self.pause().await;
            self.lock().begin(DatastoreOp::SelectFiles)?;
            Ok(self.files(project_id))
        })
    }

    fn insert_file<'a>(
        &'a self,
        input: &'a NewFile,
        updated_at: i64,
    ) -> BoxFuture<'a, DatastoreResult<FileRecord>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::InsertFile)?;

            if let Some(parent) = &input.parent_id {
                let parent_ok = tables
                    .files
                    .iter()
                    .any(|f| &f.id == parent && f.project_id == input.project_id);
                if !parent_ok {
                    return Err(DatastoreError::new(
                        "insert or update on table \"files\" violates foreign key constraint",
                    )
                    .with_code("23503"));
                }
            }

            let record = FileRecord {
                id: FileId::from(tables.next_id("file")),
                project_id: input.project_id.clone(),
                parent_id: input.parent_id.clone(),
                name: input.name.clone(),
                kind: input.kind,
                content: input.content.clone(),
                storage_id: input.storage_id.clone(),
                updated_at,
                created_at: now_millis(),
            };
            tables.files.push(record.clone());
            Ok(record)
        })
    }

    fn update_file<'a>(
        &'a self,
        id: &'a FileId,
        patch: &'a FilePatch,
        updated_at: i64,
    ) -> BoxFuture<'a, DatastoreResult<FileRecord>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::UpdateFile)?;
            let record = tables
                .files
                .iter_mut()
                .find(|f| &f.id == id)
                .ok_or_else(|| row_not_found("files"))?;
            patch.apply_to(record);
            record.updated_at = updated_at;
            Ok(record.clone())
        })
    }

    fn delete_files<'a>(&'a self, ids: &'a [FileId]) -> BoxFuture<'a, DatastoreResult<()>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::DeleteFiles)?;
            tables.files.retain(|f| !ids.contains(&f.id));
            Ok(())
        })
    }

    fn select_projects<'a>(
        &'a self,
        owner_id: &'a UserId,
    ) -> BoxFuture<'a, DatastoreResult<Vec<Project>>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::SelectProjects)?;
            let mut projects: Vec<Project> = tables
                .projects
                .iter()
                .filter(|p| &p.owner_id == owner_id)
                .cloned()
                .collect();
            projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(projects)
        })
    }

    fn insert_project<'a>(
        &'a self,
        input: &'a NewProject,
    ) -> BoxFuture<'a, DatastoreResult<Project>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::InsertProject)?;
            let now = now_millis();
            let project = Project {
                id: ProjectId::from(tables.next_id("project")),
                name: input.name.clone(),
                owner_id: input.owner_id.clone(),
                created_at: now,
                updated_at: now,
                import_status: None,
                export_status: None,
                export_repo_url: None,
            };
            tables.projects.push(project.clone());
            Ok(project)
        })
    }

    fn update_project<'a>(
        &'a self,
        id: &'a ProjectId,
        patch: &'a ProjectPatch,
    ) -> BoxFuture<'a, DatastoreResult<Project>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::UpdateProject)?;
            let project = tables
                .projects
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| row_not_found("projects"))?;
            patch.apply_to(project);
            project.updated_at = now_millis();
            Ok(project.clone())
        })
    }

    fn delete_project<'a>(&'a self, id: &'a ProjectId) -> BoxFuture<'a, DatastoreResult<()>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.lock();
            tables.begin(DatastoreOp::DeleteProject)?;
            tables.projects.retain(|p| &p.id != id);
            tables.files.retain(|f| &f.project_id != id);
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/memory.rs"]
mod tests;
