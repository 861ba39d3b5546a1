use super::message::AppMessage;
use crate::kernel::services::ports::{AuthProvider, Datastore, JobQueue};
use crate::kernel::Effect;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// The remote collaborators effects are executed against.
#[derive(Clone)]
pub struct RuntimeServices {
    pub datastore: Arc<dyn Datastore>,
    pub auth: Arc<dyn AuthProvider>,
    pub jobs: Arc<dyn JobQueue>,
}

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    services: RuntimeServices,
}

impl AsyncRuntime {
    pub fn new(
        tx: Sender<AppMessage>,
        services: RuntimeServices,
        worker_threads: usize,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            services,
        })
    }

    /// Forwards auth state changes as they happen. The value current at
    /// subscription time is not replayed; `Effect::LoadSession` covers it.
    pub fn watch_auth(&self) {
        let tx = self.tx.clone();
        let mut rx = self.services.auth.subscribe();
        rx.borrow_and_update();
        self.runtime.spawn(async move {
            while rx.changed().await.is_ok() {
                let session = rx.borrow_and_update().clone();
                if tx.send(AppMessage::AuthChanged(session)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn run(&self, effect: Effect) {
        let tx = self.tx.clone();
        let services = self.services.clone();
        self.runtime.spawn(async move {
            let message = execute(&services, effect).await;
            let _ = tx.send(message);
        });
    }
}

async fn execute(services: &RuntimeServices, effect: Effect) -> AppMessage {
    let datastore = services.datastore.as_ref();
    match effect {
        Effect::LoadSession => AppMessage::SessionLoaded {
            result: services.auth.session().await,
        },
        Effect::SignOut => AppMessage::SignedOut {
            result: services.auth.sign_out().await,
        },
        Effect::FetchFiles { project_id } => {
            let result = datastore.select_files(&project_id).await;
            AppMessage::FilesLoaded { project_id, result }
        }
        Effect::InsertFile {
            project_id,
            input,
            updated_at,
        } => {
            let result = datastore.insert_file(&input, updated_at).await;
            AppMessage::FileCreated { project_id, result }
        }
        Effect::UpdateFile {
            project_id,
            id,
            patch,
            updated_at,
        } => {
            let result = datastore.update_file(&id, &patch, updated_at).await;
            AppMessage::FileUpdated {
                project_id,
                id,
                result,
            }
        }
        Effect::DeleteFiles { project_id, ids } => {
            let result = datastore.delete_files(&ids).await;
            AppMessage::FilesDeleted {
                project_id,
                ids,
                result,
            }
        }
        Effect::FetchProjects { owner_id } => AppMessage::ProjectsLoaded {
            result: datastore.select_projects(&owner_id).await,
        },
        Effect::InsertProject { input } => AppMessage::ProjectCreated {
            result: datastore.insert_project(&input).await,
        },
        Effect::UpdateProject {
            id,
            patch,
            previous_name,
        } => {
            let result = datastore.update_project(&id, &patch).await;
            AppMessage::ProjectUpdated {
                id,
                previous_name,
                result,
            }
        }
        Effect::DeleteProject { id } => {
            let result = datastore.delete_project(&id).await;
            AppMessage::ProjectDeleted { id, result }
        }
        Effect::SubmitJob(event) => {
            let name = event.name.clone();
            let result = services.jobs.submit(event).await;
            AppMessage::JobSubmitted { name, result }
        }
    }
}
