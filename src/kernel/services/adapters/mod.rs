//! Service adapters: runtime and in-process implementations of the ports.

pub mod auth;
pub mod config;
pub mod jobs;
pub mod memory;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use auth::MemoryAuthProvider;
pub use config::ConfigService;
pub use jobs::ChannelJobQueue;
pub use memory::{DatastoreOp, MemoryDatastore};
pub use paths::{ensure_log_dir, get_app_data_dir, get_log_dir};
pub use runtime::{AppMessage, AsyncRuntime, RuntimeServices};
pub use settings::{
    ensure_settings_file, ensure_settings_file_at, get_settings_path, load_settings,
    load_settings_from,
};
