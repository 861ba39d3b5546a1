use super::*;
use crate::kernel::action::{FilesAction, ProjectAction, TabAction};
use crate::kernel::services::ports::{DatastoreError, User};
use crate::models::{FileKind, FileRecord, NewFile, Project, UserId};
use std::time::{Duration, Instant};

fn pid() -> ProjectId {
    ProjectId::from("p1")
}

fn id(s: &str) -> FileId {
    FileId::from(s)
}

fn row(file_id: &str, parent: Option<&str>, name: &str, kind: FileKind) -> FileRecord {
    FileRecord {
        id: id(file_id),
        project_id: pid(),
        parent_id: parent.map(FileId::from),
        name: name.to_string(),
        kind,
        content: Some(String::new()).filter(|_| kind == FileKind::File),
        storage_id: None,
        updated_at: 1_700_000_000_000,
        created_at: 1_700_000_000_000,
    }
}

fn session(user: &str) -> Session {
    Session {
        user: User {
            id: UserId::from(user),
            email: None,
        },
        access_token: "t".to_string(),
        expires_at: None,
    }
}

/// dir{a.txt, b.txt, c.txt}
fn store() -> Store {
    let mut store = Store::new(AppState::default());
    store.dispatch(Action::Files(FilesAction::Fetch { project_id: pid() }));
    store.dispatch(Action::Files(FilesAction::Loaded {
        project_id: pid(),
        result: Ok(vec![
            row("dir", None, "dir", FileKind::Folder),
            row("a", Some("dir"), "a.txt", FileKind::File),
            row("b", Some("dir"), "b.txt", FileKind::File),
            row("c", Some("dir"), "c.txt", FileKind::File),
        ]),
    }));
    store
}

fn open(store: &mut Store, file: &str, pinned: bool) -> DispatchResult {
    store.dispatch(Action::Tabs(TabAction::Open {
        project_id: pid(),
        file_id: id(file),
        pinned,
    }))
}

fn edit(store: &mut Store, file: &str, content: &str, now: Instant) -> DispatchResult {
    store.dispatch(Action::Files(FilesAction::EditContent {
        project_id: pid(),
        id: id(file),
        content: content.to_string(),
        now,
    }))
}

fn updated_content(effect: &Effect) -> Option<(&str, &str)> {
    match effect {
        Effect::UpdateFile { id, patch, .. } => {
            Some((id.as_str(), patch.content.as_deref()?))
        }
        _ => None,
    }
}

#[test]
fn fetch_emits_effect_once() {
    let mut store = Store::new(AppState::default());
    let first = store.dispatch(Action::Files(FilesAction::Fetch { project_id: pid() }));
    assert_eq!(first.effects, vec![Effect::FetchFiles { project_id: pid() }]);
    assert!(first.state_changed);

    let second = store.dispatch(Action::Files(FilesAction::Fetch { project_id: pid() }));
    assert!(second.effects.is_empty());
    assert!(!second.state_changed);
}

#[test]
fn rejected_create_reports_reason() {
    let mut store = store();
    let result = store.dispatch(Action::Files(FilesAction::Create {
        input: NewFile::file(pid(), Some(id("dir")), "A.TXT"),
    }));
    assert_eq!(result.rejected, Some(Rejection::File(FileTreeError::NameExists)));
    assert!(result.effects.is_empty());
    assert!(!result.state_changed);
}

#[test]
fn second_mutation_waits_for_the_first() {
    let mut store = store();
    let first = store.dispatch(Action::Files(FilesAction::Rename {
        project_id: pid(),
        id: id("a"),
        name: "x.txt".to_string(),
    }));
    assert_eq!(first.effects.len(), 1);

    let second = store.dispatch(Action::Files(FilesAction::Rename {
        project_id: pid(),
        id: id("b"),
        name: "y.txt".to_string(),
    }));
    assert!(second.effects.is_empty());
    assert!(second.state_changed);

    let mut renamed = row("a", Some("dir"), "x.txt", FileKind::File);
    renamed.updated_at = 1_700_000_000;
    let done = store.dispatch(Action::Files(FilesAction::Updated {
        project_id: pid(),
        id: id("a"),
        result: Ok(renamed),
    }));
    assert!(matches!(
        done.effects.as_slice(),
        [Effect::UpdateFile { id, .. }] if id.as_str() == "b"
    ));
}

#[test]
fn edits_flush_after_the_debounce_window() {
    let mut store = store();
    let start = Instant::now();
    assert!(edit(&mut store, "a", "one", start).state_changed);
    edit(&mut store, "a", "two", start + Duration::from_millis(1000));

    let early = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(2000),
    });
    assert!(early.effects.is_empty());

    let due = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(2500),
    });
    assert_eq!(due.effects.len(), 1);
    assert_eq!(updated_content(&due.effects[0]), Some(("a", "two")));
}

#[test]
fn edit_of_unknown_file_is_rejected() {
    let mut store = store();
    let result = edit(&mut store, "ghost", "x", Instant::now());
    assert_eq!(result.rejected, Some(Rejection::File(FileTreeError::NotFound)));
}

#[test]
fn switching_tabs_flushes_the_previous_file() {
    let mut store = store();
    open(&mut store, "a", true);
    edit(&mut store, "a", "draft", Instant::now());

    let result = open(&mut store, "b", true);
    assert_eq!(result.effects.len(), 1);
    assert_eq!(updated_content(&result.effects[0]), Some(("a", "draft")));
    assert!(!store.state().drafts.is_pending(&pid(), &id("a")));
}

#[test]
fn preview_replacement_flushes_the_replaced_file() {
    let mut store = store();
    open(&mut store, "a", false);
    edit(&mut store, "a", "draft", Instant::now());

    let result = open(&mut store, "b", false);
    assert_eq!(
        store.state().tabs.tab_state(&pid()).open,
        vec![id("b")]
    );
    assert_eq!(updated_content(&result.effects[0]), Some(("a", "draft")));
}

#[test]
fn close_all_flushes_every_open_draft() {
    let mut store = store();
    open(&mut store, "a", true);
    open(&mut store, "b", true);
    let now = Instant::now();
    edit(&mut store, "a", "da", now);
    edit(&mut store, "b", "db", now);

    let result = store.dispatch(Action::Tabs(TabAction::CloseAll { project_id: pid() }));
    // Only one write is in flight at a time; the other waits in the queue.
    assert_eq!(result.effects.len(), 1);
    assert!(store.state().drafts.is_empty());
    assert_eq!(store.state().files.project(&pid()).queued_mutations(), 1);
}

#[test]
fn draft_of_inactive_tab_is_kept_on_unrelated_switch() {
    let mut store = store();
    open(&mut store, "a", true);
    open(&mut store, "b", true);
    open(&mut store, "c", true);
    edit(&mut store, "a", "draft", Instant::now());

    let result = store.dispatch(Action::Tabs(TabAction::SetActive {
        project_id: pid(),
        file_id: id("b"),
    }));
    assert!(result.effects.is_empty());
    assert!(store.state().drafts.is_pending(&pid(), &id("a")));
}

#[test]
fn flush_drafts_writes_everything() {
    let mut store = store();
    edit(&mut store, "c", "text", Instant::now());
    let result = store.dispatch(Action::FlushDrafts);
    assert_eq!(updated_content(&result.effects[0]), Some(("c", "text")));
    assert!(store.dispatch(Action::FlushDrafts).effects.is_empty());
}

#[test]
fn successful_delete_closes_tabs_and_drops_drafts() {
    let mut store = store();
    open(&mut store, "a", true);
    open(&mut store, "b", true);
    open(&mut store, "c", true);
    store.dispatch(Action::Tabs(TabAction::SetActive {
        project_id: pid(),
        file_id: id("a"),
    }));
    edit(&mut store, "a", "lost", Instant::now());

    let result = store.dispatch(Action::Files(FilesAction::Delete {
        project_id: pid(),
        id: id("dir"),
    }));
    let Some(Effect::DeleteFiles { ids, .. }) = result.effects.first().cloned() else {
        panic!("expected delete effect");
    };
    assert_eq!(ids.len(), 4);

    store.dispatch(Action::Files(FilesAction::Deleted {
        project_id: pid(),
        ids,
        result: Ok(()),
    }));

    let tabs = store.state().tabs.tab_state(&pid());
    assert!(tabs.open.is_empty());
    assert_eq!(tabs.active, None);
    assert!(store.state().drafts.is_empty());
    assert!(store.state().files.project(&pid()).tree.is_empty());
}

#[test]
fn failed_delete_keeps_everything() {
    let mut store = store();
    open(&mut store, "a", true);
    store.dispatch(Action::Files(FilesAction::Delete {
        project_id: pid(),
        id: id("a"),
    }));
    store.dispatch(Action::Files(FilesAction::Deleted {
        project_id: pid(),
        ids: vec![id("a")],
        result: Err(DatastoreError::new("denied")),
    }));
    assert!(store.state().tabs.tab_state(&pid()).is_open(&id("a")));
    assert!(store.state().files.get(&pid(), &id("a")).is_some());
}

#[test]
fn signing_in_fetches_projects() {
    let mut store = Store::new(AppState::default());
    let result = store.dispatch(Action::AuthChanged(Some(session("u1"))));
    assert_eq!(
        result.effects,
        vec![Effect::FetchProjects {
            owner_id: UserId::from("u1")
        }]
    );

    let again = store.dispatch(Action::AuthChanged(Some(session("u1"))));
    assert!(again.effects.is_empty());
}

#[test]
fn create_project_without_session_is_rejected() {
    let mut store = Store::new(AppState::default());
    let result = store.dispatch(Action::Projects(ProjectAction::Create { name: None }));
    assert_eq!(
        result.rejected,
        Some(Rejection::Project(ProjectError::NotSignedIn))
    );
}

#[test]
fn project_delete_forgets_project_state() {
    let mut store = store();
    store.dispatch(Action::AuthChanged(Some(session("u1"))));
    store.dispatch(Action::Projects(ProjectAction::Loaded {
        result: Ok(vec![Project {
            id: pid(),
            name: "demo".to_string(),
            owner_id: UserId::from("u1"),
            created_at: 1,
            updated_at: 1,
            import_status: None,
            export_status: None,
            export_repo_url: None,
        }]),
    }));
    open(&mut store, "a", true);
    edit(&mut store, "b", "x", Instant::now());

    let result = store.dispatch(Action::Projects(ProjectAction::Delete { id: pid() }));
    assert_eq!(result.effects, vec![Effect::DeleteProject { id: pid() }]);
    store.dispatch(Action::Projects(ProjectAction::Deleted {
        id: pid(),
        result: Ok(()),
    }));

    assert!(store.state().projects.projects.is_empty());
    assert!(store.state().files.project(&pid()).tree.is_empty());
    assert!(store.state().tabs.tab_state(&pid()).open.is_empty());
    assert!(store.state().drafts.is_empty());
}

#[test]
fn sign_out_flushes_drafts_first() {
    let mut store = store();
    edit(&mut store, "a", "x", Instant::now());
    let result = store.dispatch(Action::SignOut);
    assert_eq!(result.effects.len(), 2);
    assert_eq!(updated_content(&result.effects[0]), Some(("a", "x")));
    assert_eq!(result.effects[1], Effect::SignOut);
}
