//! Headless session over the in-process adapters: signs in, creates a
//! project with a few files, edits one and prints the resulting tree.

mod logging;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use webcode::app::Workspace;
use webcode::kernel::services::adapters::{
    ensure_settings_file, ChannelJobQueue, ConfigService, MemoryAuthProvider, MemoryDatastore,
    RuntimeServices,
};
use webcode::kernel::services::ports::{JobEvent, Session, User};
use webcode::kernel::{Action, FilesAction, ProjectAction, TabAction};
use webcode::models::{NewFile, ProjectId, UserId};

const WAIT: Duration = Duration::from_secs(10);

fn settle(workspace: &mut Workspace) -> io::Result<()> {
    if workspace.wait_idle(WAIT) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "datastore did not answer in time",
        ))
    }
}

fn reject(err: webcode::kernel::Rejection) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    if let Err(e) = ensure_settings_file() {
        eprintln!("settings file unavailable: {e}");
    }
    let config = ConfigService::load().into_config();
    let logging = logging::init(&config);
    if let Some(guard) = &logging {
        eprintln!("logs: {}", guard.log_dir().display());
    }

    let (jobs, mut job_rx) = ChannelJobQueue::new();
    let auth = MemoryAuthProvider::signed_in(Session {
        user: User {
            id: UserId::from("local-user"),
            email: None,
        },
        access_token: String::new(),
        expires_at: None,
    });
    let services = RuntimeServices {
        datastore: Arc::new(MemoryDatastore::new()),
        auth: Arc::new(auth),
        jobs: Arc::new(jobs),
    };

    let mut workspace = Workspace::new(config, services)?;
    settle(&mut workspace)?;

    workspace
        .dispatch(Action::Projects(ProjectAction::Create { name: None }))
        .map_err(reject)?;
    settle(&mut workspace)?;
    let project_id: ProjectId = workspace
        .state()
        .projects
        .projects
        .first()
        .map(|p| p.id.clone())
        .ok_or_else(|| io::Error::other("project was not created"))?;

    workspace
        .dispatch(Action::Files(FilesAction::Fetch {
            project_id: project_id.clone(),
        }))
        .map_err(reject)?;
    workspace
        .dispatch(Action::Files(FilesAction::Create {
            input: NewFile::folder(project_id.clone(), None, "src"),
        }))
        .map_err(reject)?;
    settle(&mut workspace)?;

    let src = workspace
        .state()
        .files
        .children_of(&project_id, None)
        .first()
        .map(|r| r.id.clone())
        .ok_or_else(|| io::Error::other("folder was not created"))?;
    for name in ["main.ts", "util.ts"] {
        workspace
            .dispatch(Action::Files(FilesAction::Create {
                input: NewFile::file(project_id.clone(), Some(src.clone()), name).with_content(""),
            }))
            .map_err(reject)?;
    }
    settle(&mut workspace)?;

    if let Some(main_ts) = workspace
        .state()
        .files
        .children_of(&project_id, Some(&src))
        .iter()
        .find(|r| r.name == "main.ts")
        .map(|r| r.id.clone())
    {
        workspace
            .dispatch(Action::Tabs(TabAction::Open {
                project_id: project_id.clone(),
                file_id: main_ts.clone(),
                pinned: true,
            }))
            .map_err(reject)?;
        workspace
            .dispatch(Action::Files(FilesAction::EditContent {
                project_id: project_id.clone(),
                id: main_ts,
                content: "console.log(\"hello\");\n".to_string(),
                now: Instant::now(),
            }))
            .map_err(reject)?;
    }

    workspace
        .dispatch(Action::SubmitJob(JobEvent::new(
            "demo/generate",
            serde_json::json!({ "project_id": project_id.as_str() }),
        )))
        .map_err(reject)?;

    if !workspace.flush(WAIT) {
        tracing::warn!("pending writes did not settle");
    }
    while let Ok(event) = job_rx.try_recv() {
        tracing::info!(job = %event.name, "job received by runner");
    }

    let tree = workspace.state().files.build_tree(&project_id);
    let json = serde_json::to_string_pretty(&tree).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}
