//! Service ports: traits + data contracts for the external collaborators.

pub mod auth;
pub mod config;
pub mod datastore;
pub mod jobs;
pub mod runtime;

pub use auth::{AuthError, AuthProvider, Session, User};
pub use config::WorkspaceConfig;
pub use datastore::{Datastore, DatastoreError, DatastoreResult};
pub use jobs::{JobError, JobEvent, JobQueue};
pub use runtime::BoxFuture;
