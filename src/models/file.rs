//! File and folder rows as stored in the `files` collection.

use super::ids::{FileId, ProjectId};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamps below this are taken to be in seconds.
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

impl FileKind {
    pub fn is_folder(self) -> bool {
        matches!(self, FileKind::Folder)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FileId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: i64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: i64,
}

impl FileRecord {
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_binary(&self) -> bool {
        self.storage_id.is_some()
    }

    pub fn normalized(mut self) -> Self {
        self.updated_at = normalize_updated_at(self.updated_at);
        self
    }

    /// Character range to preselect when renaming: the stem of a file name
    /// with an extension, `None` for "select everything".
    pub fn rename_selection(&self) -> Option<Range<usize>> {
        rename_selection(&self.name, self.kind)
    }
}

pub fn rename_selection(name: &str, kind: FileKind) -> Option<Range<usize>> {
    if kind.is_folder() {
        return None;
    }
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    Some(0..name[..dot].chars().count())
}

pub fn normalize_updated_at(value: i64) -> i64 {
    if value < MILLIS_THRESHOLD {
        value.saturating_mul(1000)
    } else {
        value
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

fn normalize_fractional(value: f64) -> i64 {
    if value < MILLIS_THRESHOLD as f64 {
        (value * 1000.0) as i64
    } else {
        value as i64
    }
}

/// Numeric strings are epoch values; anything else must be an RFC 3339
/// timestamp, or one without an offset, which is read as UTC.
fn parse_timestamp_text(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(value) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Some(normalize_fractional(value));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Accepts epoch seconds or milliseconds (integer, float or numeric string)
/// and ISO-8601 strings; always yields milliseconds.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(v) => Ok(normalize_updated_at(v)),
        RawTimestamp::Float(v) if v.is_finite() => Ok(normalize_fractional(v)),
        RawTimestamp::Float(v) => Err(serde::de::Error::custom(format!("invalid timestamp {v}"))),
        RawTimestamp::Text(s) => parse_timestamp_text(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {s:?}"))),
    }
}

/// Input for creating a row; id and timestamps are assigned remotely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FileId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
}

impl NewFile {
    pub fn file(project_id: ProjectId, parent_id: Option<FileId>, name: impl Into<String>) -> Self {
        Self {
            project_id,
            parent_id,
            name: name.into(),
            kind: FileKind::File,
            content: None,
            storage_id: None,
        }
    }

    pub fn folder(
        project_id: ProjectId,
        parent_id: Option<FileId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: FileKind::Folder,
            ..Self::file(project_id, parent_id, name)
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Partial update. `parent_id: Some(None)` moves the row to the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<FileId>>,
}

impl FilePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn move_to(parent_id: Option<FileId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.parent_id.is_none()
    }

    /// Applies the patch to a local copy, the way the remote row would change.
    pub fn apply_to(&self, record: &mut FileRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(content) = &self.content {
            record.content = Some(content.clone());
        }
        if let Some(parent_id) = &self.parent_id {
            record.parent_id = parent_id.clone();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file.rs"]
mod tests;
