//! Holds the active workspace configuration.

use super::settings::load_settings;
use crate::kernel::services::ports::WorkspaceConfig;

#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    config: WorkspaceConfig,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    /// Reads the settings file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load() -> Self {
        Self::with_config(load_settings().unwrap_or_default())
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WorkspaceConfig {
        &mut self.config
    }

    pub fn set_save_debounce_ms(&mut self, ms: u64) {
        self.config.save_debounce_ms = ms;
    }

    pub fn set_log_filter(&mut self, filter: impl Into<String>) {
        self.config.log_filter = filter.into();
    }

    pub fn into_config(self) -> WorkspaceConfig {
        self.config
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/config.rs"]
mod tests;
