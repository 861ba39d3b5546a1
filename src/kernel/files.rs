//! File registry: per-project file rows plus loading/error flags.
//!
//! Local state only changes when a remote call reports back. Mutations of a
//! project are serialized: while one is in flight, later ones wait in a FIFO
//! and are re-validated against the then-current rows before being sent.

use crate::kernel::services::ports::DatastoreResult;
use crate::kernel::Effect;
use crate::models::{
    listing_order, FileId, FileKind, FilePatch, FileRecord, FileTree, FileTreeError, NewFile,
    ProjectId, TreeNode,
};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMutation {
    Create(NewFile),
    Update { id: FileId, patch: FilePatch },
    Delete { id: FileId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Requested {
    Started(Effect),
    Queued,
    /// Nothing to do: unknown target or a patch that changes nothing.
    Skipped,
}

#[derive(Debug, Default)]
pub struct ProjectFiles {
    pub tree: FileTree,
    pub loading: bool,
    pub error: Option<String>,
    pub fetched: bool,
    in_flight: bool,
    queued: VecDeque<FileMutation>,
}

impl ProjectFiles {
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.tree.iter()
    }

    pub fn mutation_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn queued_mutations(&self) -> usize {
        self.queued.len()
    }
}

static EMPTY_PROJECT_FILES: LazyLock<ProjectFiles> = LazyLock::new(ProjectFiles::default);

#[derive(Debug, Default)]
pub struct FileRegistry {
    projects: FxHashMap<ProjectId, ProjectFiles>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a project; unknown projects read as empty and not fetched.
    pub fn project(&self, project_id: &ProjectId) -> &ProjectFiles {
        self.projects
            .get(project_id)
            .unwrap_or(&*EMPTY_PROJECT_FILES)
    }

    fn project_mut(&mut self, project_id: &ProjectId) -> &mut ProjectFiles {
        self.projects.entry(project_id.clone()).or_default()
    }

    pub fn forget(&mut self, project_id: &ProjectId) -> bool {
        self.projects.remove(project_id).is_some()
    }

    pub fn get(&self, project_id: &ProjectId, id: &FileId) -> Option<&FileRecord> {
        self.project(project_id).tree.get(id)
    }

    pub fn children_of(&self, project_id: &ProjectId, parent: Option<&FileId>) -> Vec<&FileRecord> {
        self.project(project_id).tree.children_of(parent)
    }

    pub fn is_name_taken(
        &self,
        project_id: &ProjectId,
        name: &str,
        parent: Option<&FileId>,
        exclude: Option<&FileId>,
    ) -> bool {
        self.project(project_id)
            .tree
            .is_name_taken(name, parent, exclude)
    }

    pub fn path_to(&self, project_id: &ProjectId, id: &FileId) -> Vec<&FileRecord> {
        self.project(project_id).tree.path_to(id)
    }

    pub fn build_tree(&self, project_id: &ProjectId) -> Vec<TreeNode> {
        self.project(project_id).tree.build_tree()
    }

    /// Validates a name the way a create or rename would, without sending.
    pub fn validate_name(
        &self,
        project_id: &ProjectId,
        name: &str,
        parent: Option<&FileId>,
        exclude: Option<&FileId>,
    ) -> Result<String, FileTreeError> {
        let name = validated_name(name)?;
        if self.is_name_taken(project_id, &name, parent, exclude) {
            return Err(FileTreeError::NameExists);
        }
        Ok(name)
    }

    pub fn begin_fetch(&mut self, project_id: &ProjectId) -> Option<Effect> {
        let files = self.project_mut(project_id);
        if files.loading {
            tracing::debug!(project = %project_id, "fetch already in flight");
            return None;
        }
        files.loading = true;
        files.error = None;
        Some(Effect::FetchFiles {
            project_id: project_id.clone(),
        })
    }

    pub fn apply_loaded(
        &mut self,
        project_id: &ProjectId,
        result: DatastoreResult<Vec<FileRecord>>,
    ) {
        let files = self.project_mut(project_id);
        files.loading = false;
        files.fetched = true;
        match result {
            Ok(records) => {
                let mut records: Vec<FileRecord> =
                    records.into_iter().map(FileRecord::normalized).collect();
                records.sort_by(listing_order);
                files.tree = FileTree::from_records(records);
                files.error = None;
            }
            Err(err) => {
                err.log("fetch files");
                files.error = Some(err.message);
            }
        }
    }

    pub fn request(
        &mut self,
        project_id: &ProjectId,
        mutation: FileMutation,
        now_ms: i64,
    ) -> Result<Requested, FileTreeError> {
        let files = self.project_mut(project_id);
        let Some(mutation) = prepare(&files.tree, mutation)? else {
            return Ok(Requested::Skipped);
        };

        if files.in_flight {
            tracing::debug!(
                project = %project_id,
                queued = files.queued.len() + 1,
                "file mutation queued"
            );
            files.queued.push_back(mutation);
            return Ok(Requested::Queued);
        }

        files.in_flight = true;
        Ok(Requested::Started(into_effect(
            &files.tree,
            project_id,
            mutation,
            now_ms,
        )))
    }

    pub fn apply_created(
        &mut self,
        project_id: &ProjectId,
        result: DatastoreResult<FileRecord>,
        now_ms: i64,
    ) -> Option<Effect> {
        let files = self.project_mut(project_id);
        match result {
            Ok(record) => {
                files.tree.upsert(record.normalized());
                files.error = None;
            }
            Err(err) => {
                err.log("create file");
                files.error = Some(err.message);
            }
        }
        self.advance(project_id, now_ms)
    }

    pub fn apply_updated(
        &mut self,
        project_id: &ProjectId,
        result: DatastoreResult<FileRecord>,
        now_ms: i64,
    ) -> Option<Effect> {
        let files = self.project_mut(project_id);
        match result {
            Ok(record) => {
                files.tree.replace(record.normalized());
                files.error = None;
            }
            Err(err) => {
                err.log("update file");
                files.error = Some(err.message);
            }
        }
        self.advance(project_id, now_ms)
    }

    pub fn apply_deleted(
        &mut self,
        project_id: &ProjectId,
        ids: &[FileId],
        result: DatastoreResult<()>,
        now_ms: i64,
    ) -> Option<Effect> {
        let files = self.project_mut(project_id);
        match result {
            Ok(()) => {
                for id in ids {
                    files.tree.remove(id);
                }
                files.error = None;
            }
            Err(err) => {
                err.log("delete files");
                files.error = Some(err.message);
            }
        }
        self.advance(project_id, now_ms)
    }

    /// Releases the in-flight slot and starts the next queued mutation that
    /// still makes sense.
    fn advance(&mut self, project_id: &ProjectId, now_ms: i64) -> Option<Effect> {
        let files = self.project_mut(project_id);
        files.in_flight = false;

        while let Some(mutation) = files.queued.pop_front() {
            match prepare(&files.tree, mutation) {
                Ok(Some(mutation)) => {
                    files.in_flight = true;
                    return Some(into_effect(&files.tree, project_id, mutation, now_ms));
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        project = %project_id,
                        error = %err,
                        "queued file mutation dropped"
                    );
                    files.error = Some(err.to_string());
                }
            }
        }
        None
    }
}

fn validated_name(name: &str) -> Result<String, FileTreeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FileTreeError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn check_parent(tree: &FileTree, parent: &FileId) -> Result<(), FileTreeError> {
    match tree.get(parent) {
        Some(record) if record.is_folder() => Ok(()),
        _ => Err(FileTreeError::ParentNotFolder),
    }
}

/// Normalizes a mutation against the current rows. `Ok(None)` means the
/// mutation is a no-op (unknown target, or nothing would change).
fn prepare(tree: &FileTree, mutation: FileMutation) -> Result<Option<FileMutation>, FileTreeError> {
    match mutation {
        FileMutation::Create(mut input) => {
            let name = validated_name(&input.name)?;
            if let Some(parent) = &input.parent_id {
                check_parent(tree, parent)?;
            }
            let content_ok = match input.kind {
                FileKind::Folder => input.content.is_none() && input.storage_id.is_none(),
                FileKind::File => input.content.is_none() || input.storage_id.is_none(),
            };
            if !content_ok {
                return Err(FileTreeError::InvalidContent);
            }
            if tree.is_name_taken(&name, input.parent_id.as_ref(), None) {
                return Err(FileTreeError::NameExists);
            }
            input.name = name;
            Ok(Some(FileMutation::Create(input)))
        }
        FileMutation::Update { id, mut patch } => {
            let Some(current) = tree.get(&id) else {
                return Ok(None);
            };

            if let Some(name) = patch.name.take() {
                let name = validated_name(&name)?;
                if name != current.name {
                    patch.name = Some(name);
                }
            }

            if patch.parent_id.as_ref() == Some(&current.parent_id) {
                patch.parent_id = None;
            }
            if let Some(Some(parent)) = &patch.parent_id {
                if tree.is_within(parent, &id) {
                    return Err(FileTreeError::MoveIntoDescendant);
                }
                check_parent(tree, parent)?;
            }

            if patch.content.is_some() && (current.is_folder() || current.is_binary()) {
                return Err(FileTreeError::InvalidContent);
            }

            if patch.name.is_some() || patch.parent_id.is_some() {
                let name = patch.name.as_deref().unwrap_or(&current.name);
                let parent = match &patch.parent_id {
                    Some(parent) => parent.as_ref(),
                    None => current.parent_id.as_ref(),
                };
                if tree.is_name_taken(name, parent, Some(&id)) {
                    return Err(FileTreeError::NameExists);
                }
            }

            if patch.is_empty() {
                return Ok(None);
            }
            Ok(Some(FileMutation::Update { id, patch }))
        }
        FileMutation::Delete { id } => {
            if tree.contains(&id) {
                Ok(Some(FileMutation::Delete { id }))
            } else {
                Ok(None)
            }
        }
    }
}

fn into_effect(
    tree: &FileTree,
    project_id: &ProjectId,
    mutation: FileMutation,
    now_ms: i64,
) -> Effect {
    let project_id = project_id.clone();
    match mutation {
        FileMutation::Create(input) => Effect::InsertFile {
            project_id,
            input,
            updated_at: now_ms,
        },
        FileMutation::Update { id, patch } => Effect::UpdateFile {
            project_id,
            id,
            patch,
            updated_at: now_ms,
        },
        FileMutation::Delete { id } => {
            let mut ids = vec![id.clone()];
            ids.extend(tree.descendants(&id));
            Effect::DeleteFiles { project_id, ids }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/files.rs"]
mod tests;
