use super::runtime::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named event handed to the out-of-process job runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl JobEvent {
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    pub message: String,
}

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job submit failed: {}", self.message)
    }
}

impl std::error::Error for JobError {}

pub trait JobQueue: Send + Sync {
    /// Accepts the event for asynchronous execution; does not wait for it.
    fn submit(&self, event: JobEvent) -> BoxFuture<'_, Result<(), JobError>>;
}
