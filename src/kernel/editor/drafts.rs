//! Debounced content edits waiting to be written back.

use crate::models::{FileId, ProjectId};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Draft {
    content: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Drafts {
    delay: Duration,
    pending: FxHashMap<(ProjectId, FileId), Draft>,
}

impl Drafts {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: FxHashMap::default(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Buffers the latest content and restarts the idle timer.
    pub fn edit(
        &mut self,
        project_id: &ProjectId,
        file_id: &FileId,
        content: String,
        now: Instant,
    ) {
        self.pending.insert(
            (project_id.clone(), file_id.clone()),
            Draft {
                content,
                deadline: now + self.delay,
            },
        );
    }

    pub fn is_pending(&self, project_id: &ProjectId, file_id: &FileId) -> bool {
        self.pending
            .contains_key(&(project_id.clone(), file_id.clone()))
    }

    pub fn content(&self, project_id: &ProjectId, file_id: &FileId) -> Option<&str> {
        self.pending
            .get(&(project_id.clone(), file_id.clone()))
            .map(|d| d.content.as_str())
    }

    pub fn take(&mut self, project_id: &ProjectId, file_id: &FileId) -> Option<String> {
        self.pending
            .remove(&(project_id.clone(), file_id.clone()))
            .map(|d| d.content)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|d| d.deadline).min()
    }

    /// Removes and returns every draft whose idle window has elapsed, oldest
    /// deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(ProjectId, FileId, String)> {
        let mut due: Vec<((ProjectId, FileId), Instant)> = self
            .pending
            .iter()
            .filter(|(_, d)| d.deadline <= now)
            .map(|(key, d)| (key.clone(), d.deadline))
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        due.into_iter()
            .filter_map(|(key, _)| {
                let draft = self.pending.remove(&key)?;
                Some((key.0, key.1, draft.content))
            })
            .collect()
    }

    pub fn take_all(&mut self) -> Vec<(ProjectId, FileId, String)> {
        let mut all: Vec<(ProjectId, FileId, String)> = self
            .pending
            .drain()
            .map(|((project_id, file_id), d)| (project_id, file_id, d.content))
            .collect();
        all.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        all
    }

    pub fn discard(&mut self, project_id: &ProjectId, file_id: &FileId) -> bool {
        self.pending
            .remove(&(project_id.clone(), file_id.clone()))
            .is_some()
    }

    pub fn discard_project(&mut self, project_id: &ProjectId) {
        self.pending.retain(|(p, _), _| p != project_id);
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/drafts.rs"]
mod tests;
