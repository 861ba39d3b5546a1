//! webcode - headless core of a browser code editor
//!
//! Module layout:
//! - models: file/project rows, identifiers, the file tree index
//! - kernel: state, actions, reducers and effects; service ports and adapters
//! - app: the `Workspace` driver tying the store to the async runtime

pub mod app;
pub mod kernel;
pub mod models;
