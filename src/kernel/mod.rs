//! Headless application core (state/action/effect).

pub mod action;
pub mod editor;
pub mod effect;
pub mod files;
pub mod projects;
pub mod services;
pub mod state;
pub mod store;

pub use action::{Action, FilesAction, ProjectAction, TabAction};
pub use editor::{Drafts, EditorTabs, TabState};
pub use effect::Effect;
pub use files::{FileMutation, FileRegistry, ProjectFiles, Requested};
pub use projects::{generate_project_name, ProjectError, ProjectsState};
pub use state::AppState;
pub use store::{DispatchResult, Rejection, Store};
