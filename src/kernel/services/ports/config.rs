use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Idle time before buffered content edits are written back.
    pub save_debounce_ms: u64,
    pub worker_threads: usize,
    pub log_filter: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 1500,
            worker_threads: 2,
            log_filter: "webcode=info".to_string(),
        }
    }
}

impl WorkspaceConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
