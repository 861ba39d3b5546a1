//! Application layer.

mod workspace;

pub use workspace::Workspace;
