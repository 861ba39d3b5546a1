use super::*;
use crate::kernel::services::ports::DatastoreError;

const NOW: i64 = 1_700_000_000_000;

fn pid() -> ProjectId {
    ProjectId::from("p1")
}

fn row(id: &str, parent: Option<&str>, name: &str, kind: FileKind) -> FileRecord {
    FileRecord {
        id: FileId::from(id),
        project_id: pid(),
        parent_id: parent.map(FileId::from),
        name: name.to_string(),
        kind,
        content: None,
        storage_id: None,
        updated_at: NOW,
        created_at: NOW,
    }
}

fn folder(id: &str, parent: Option<&str>, name: &str) -> FileRecord {
    row(id, parent, name, FileKind::Folder)
}

fn file(id: &str, parent: Option<&str>, name: &str) -> FileRecord {
    row(id, parent, name, FileKind::File)
}

/// A{B, C{D}} plus a root file.
fn loaded_registry() -> FileRegistry {
    let mut registry = FileRegistry::new();
    registry.begin_fetch(&pid());
    registry.apply_loaded(
        &pid(),
        Ok(vec![
            folder("a", None, "A"),
            file("b", Some("a"), "b.txt"),
            folder("c", Some("a"), "C"),
            file("d", Some("c"), "d.txt"),
            file("readme", None, "README.md"),
        ]),
    );
    registry
}

fn started(requested: Requested) -> Effect {
    match requested {
        Requested::Started(effect) => effect,
        other => panic!("expected a started mutation, got {other:?}"),
    }
}

#[test]
fn unknown_project_reads_as_empty() {
    let registry = FileRegistry::new();
    let files = registry.project(&ProjectId::from("nope"));
    assert!(files.tree.is_empty());
    assert!(!files.loading);
    assert!(!files.fetched);
    assert!(registry.children_of(&ProjectId::from("nope"), None).is_empty());
}

#[test]
fn fetch_is_skipped_while_loading() {
    let mut registry = FileRegistry::new();
    assert_eq!(
        registry.begin_fetch(&pid()),
        Some(Effect::FetchFiles { project_id: pid() })
    );
    assert!(registry.project(&pid()).loading);
    assert_eq!(registry.begin_fetch(&pid()), None);
}

#[test]
fn loaded_rows_are_normalized_and_listed_folders_first() {
    let mut registry = FileRegistry::new();
    registry.begin_fetch(&pid());
    let mut seconds = file("z", None, "zeta.txt");
    seconds.updated_at = 1_700_000_000;
    registry.apply_loaded(
        &pid(),
        Ok(vec![seconds, folder("f", None, "src"), file("a", None, "Alpha.md")]),
    );

    let files = registry.project(&pid());
    assert!(!files.loading);
    assert!(files.fetched);
    assert_eq!(files.error, None);

    let names: Vec<&str> = registry
        .children_of(&pid(), None)
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["src", "Alpha.md", "zeta.txt"]);
    assert_eq!(
        registry.get(&pid(), &FileId::from("z")).map(|r| r.updated_at),
        Some(1_700_000_000_000)
    );
}

#[test]
fn failed_fetch_records_error_and_keeps_rows() {
    let mut registry = loaded_registry();
    registry.begin_fetch(&pid());
    registry.apply_loaded(&pid(), Err(DatastoreError::new("offline")));

    let files = registry.project(&pid());
    assert!(!files.loading);
    assert_eq!(files.error.as_deref(), Some("offline"));
    assert_eq!(files.tree.len(), 5);
}

#[test]
fn create_trims_name_and_starts_insert() {
    let mut registry = loaded_registry();
    let effect = started(
        registry
            .request(
                &pid(),
                FileMutation::Create(NewFile::file(pid(), Some(FileId::from("a")), "  new.rs ")),
                NOW,
            )
            .unwrap(),
    );
    match effect {
        Effect::InsertFile { input, updated_at, .. } => {
            assert_eq!(input.name, "new.rs");
            assert_eq!(updated_at, NOW);
        }
        other => panic!("unexpected effect {other:?}"),
    }
    assert!(registry.project(&pid()).mutation_in_flight());
    // Nothing is applied locally until the datastore answers.
    assert_eq!(registry.children_of(&pid(), Some(&FileId::from("a"))).len(), 2);
}

#[test]
fn create_rejects_invalid_input() {
    let mut registry = loaded_registry();
    let mut request = |input: NewFile| registry.request(&pid(), FileMutation::Create(input), NOW);

    assert_eq!(
        request(NewFile::file(pid(), None, "   ")),
        Err(FileTreeError::EmptyName)
    );
    assert_eq!(
        request(NewFile::file(pid(), None, "README.md")),
        Err(FileTreeError::NameExists)
    );
    assert_eq!(
        request(NewFile::file(pid(), Some(FileId::from("readme")), "x")),
        Err(FileTreeError::ParentNotFolder)
    );
    assert_eq!(
        request(NewFile::folder(pid(), None, "docs").with_content("nope")),
        Err(FileTreeError::InvalidContent)
    );
    assert!(!registry.project(&pid()).mutation_in_flight());
}

#[test]
fn same_name_in_another_folder_is_allowed() {
    let mut registry = loaded_registry();
    let result = registry.request(
        &pid(),
        FileMutation::Create(NewFile::file(pid(), Some(FileId::from("c")), "b.txt")),
        NOW,
    );
    assert!(matches!(result, Ok(Requested::Started(_))));
}

#[test]
fn mutations_are_serialized_per_project() {
    let mut registry = loaded_registry();
    let first = registry.request(
        &pid(),
        FileMutation::Create(NewFile::file(pid(), None, "one.txt")),
        NOW,
    );
    assert!(matches!(first, Ok(Requested::Started(_))));

    let second = registry.request(
        &pid(),
        FileMutation::Create(NewFile::file(pid(), None, "two.txt")),
        NOW,
    );
    assert_eq!(second, Ok(Requested::Queued));
    assert_eq!(registry.project(&pid()).queued_mutations(), 1);

    let mut created = file("one", None, "one.txt");
    created.updated_at = 1_700_000_001;
    let next = registry.apply_created(&pid(), Ok(created), NOW + 10);

    match next {
        Some(Effect::InsertFile { input, updated_at, .. }) => {
            assert_eq!(input.name, "two.txt");
            assert_eq!(updated_at, NOW + 10);
        }
        other => panic!("unexpected effect {other:?}"),
    }
    assert_eq!(
        registry.get(&pid(), &FileId::from("one")).map(|r| r.updated_at),
        Some(1_700_000_001_000)
    );
    assert!(registry.project(&pid()).mutation_in_flight());
    assert_eq!(registry.project(&pid()).queued_mutations(), 0);
}

#[test]
fn queued_mutation_is_revalidated_when_dequeued() {
    let mut registry = loaded_registry();
    registry
        .request(
            &pid(),
            FileMutation::Create(NewFile::file(pid(), None, "dup.txt")),
            NOW,
        )
        .unwrap();
    // Accepted now, but the first create takes the name before it runs.
    assert_eq!(
        registry.request(
            &pid(),
            FileMutation::Create(NewFile::file(pid(), None, "dup.txt")),
            NOW,
        ),
        Ok(Requested::Queued)
    );

    let next = registry.apply_created(&pid(), Ok(file("dup", None, "dup.txt")), NOW);
    assert_eq!(next, None);
    assert!(!registry.project(&pid()).mutation_in_flight());
    assert!(registry.project(&pid()).error.is_some());
}

#[test]
fn delete_cascades_to_descendants() {
    let mut registry = loaded_registry();
    let effect = started(
        registry
            .request(&pid(), FileMutation::Delete { id: FileId::from("a") }, NOW)
            .unwrap(),
    );
    let Effect::DeleteFiles { ids, .. } = effect else {
        panic!("expected delete effect");
    };
    let mut ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    assert_eq!(ids[0], "a");
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);

    let deleted: Vec<FileId> = ["a", "b", "c", "d"].into_iter().map(FileId::from).collect();
    assert_eq!(registry.apply_deleted(&pid(), &deleted, Ok(()), NOW), None);
    let remaining: Vec<&str> = registry
        .project(&pid())
        .files()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(remaining, vec!["readme"]);
}

#[test]
fn delete_of_unknown_file_is_skipped() {
    let mut registry = loaded_registry();
    assert_eq!(
        registry.request(&pid(), FileMutation::Delete { id: FileId::from("ghost") }, NOW),
        Ok(Requested::Skipped)
    );
}

#[test]
fn move_into_own_subtree_is_rejected() {
    let mut registry = loaded_registry();
    let into_child = FileMutation::Update {
        id: FileId::from("a"),
        patch: FilePatch::move_to(Some(FileId::from("c"))),
    };
    assert_eq!(
        registry.request(&pid(), into_child, NOW),
        Err(FileTreeError::MoveIntoDescendant)
    );

    let into_self = FileMutation::Update {
        id: FileId::from("a"),
        patch: FilePatch::move_to(Some(FileId::from("a"))),
    };
    assert_eq!(
        registry.request(&pid(), into_self, NOW),
        Err(FileTreeError::MoveIntoDescendant)
    );
}

#[test]
fn move_to_root_and_into_file() {
    let mut registry = loaded_registry();
    let into_file = FileMutation::Update {
        id: FileId::from("d"),
        patch: FilePatch::move_to(Some(FileId::from("b"))),
    };
    assert_eq!(
        registry.request(&pid(), into_file, NOW),
        Err(FileTreeError::ParentNotFolder)
    );

    let to_root = FileMutation::Update {
        id: FileId::from("d"),
        patch: FilePatch::move_to(None),
    };
    let effect = started(registry.request(&pid(), to_root, NOW).unwrap());
    let Effect::UpdateFile { id, patch, .. } = effect else {
        panic!("expected update effect");
    };
    assert_eq!(id, FileId::from("d"));
    assert_eq!(patch.parent_id, Some(None));
}

#[test]
fn rename_rules() {
    let mut registry = loaded_registry();

    let unchanged = FileMutation::Update {
        id: FileId::from("b"),
        patch: FilePatch::rename(" b.txt "),
    };
    assert_eq!(registry.request(&pid(), unchanged, NOW), Ok(Requested::Skipped));

    let clash = FileMutation::Update {
        id: FileId::from("b"),
        patch: FilePatch::rename("C"),
    };
    assert_eq!(
        registry.request(&pid(), clash, NOW),
        Err(FileTreeError::NameExists)
    );

    let case_only = FileMutation::Update {
        id: FileId::from("b"),
        patch: FilePatch::rename("B.txt"),
    };
    assert!(matches!(
        registry.request(&pid(), case_only, NOW),
        Ok(Requested::Started(_))
    ));
}

#[test]
fn content_edit_on_folder_is_rejected() {
    let mut registry = loaded_registry();
    let edit = FileMutation::Update {
        id: FileId::from("a"),
        patch: FilePatch::content("text"),
    };
    assert_eq!(
        registry.request(&pid(), edit, NOW),
        Err(FileTreeError::InvalidContent)
    );
}

#[test]
fn update_of_unknown_file_is_skipped() {
    let mut registry = loaded_registry();
    let edit = FileMutation::Update {
        id: FileId::from("ghost"),
        patch: FilePatch::rename("x"),
    };
    assert_eq!(registry.request(&pid(), edit, NOW), Ok(Requested::Skipped));
}

#[test]
fn remote_failure_leaves_rows_untouched() {
    let mut registry = loaded_registry();
    registry
        .request(
            &pid(),
            FileMutation::Update {
                id: FileId::from("b"),
                patch: FilePatch::rename("renamed.txt"),
            },
            NOW,
        )
        .unwrap();

    let next = registry.apply_updated(
        &pid(),
        Err(DatastoreError::new("denied").with_code("42501")),
        NOW,
    );
    assert_eq!(next, None);

    let files = registry.project(&pid());
    assert_eq!(files.error.as_deref(), Some("denied"));
    assert!(!files.mutation_in_flight());
    assert_eq!(
        registry.get(&pid(), &FileId::from("b")).map(|r| r.name.as_str()),
        Some("b.txt")
    );
}

#[test]
fn updated_row_is_relinked_under_new_parent() {
    let mut registry = loaded_registry();
    let mut moved = file("d", None, "d.txt");
    moved.updated_at = NOW + 5;
    registry.apply_updated(&pid(), Ok(moved), NOW);

    assert!(registry
        .children_of(&pid(), Some(&FileId::from("c")))
        .is_empty());
    assert!(registry
        .children_of(&pid(), None)
        .iter()
        .any(|r| r.id == FileId::from("d")));
}

/// Every row shows up under exactly one parent listing, and only there.
fn assert_partitioned(registry: &FileRegistry) {
    let files = registry.project(&pid());
    let mut seen: Vec<&FileId> = Vec::new();
    let mut parents: Vec<Option<&FileId>> = vec![None];
    parents.extend(files.files().map(|r| Some(&r.id)));

    for parent in parents {
        for child in registry.children_of(&pid(), parent) {
            assert_eq!(
                child.parent_id.as_ref(),
                parent,
                "{} listed under the wrong parent",
                child.id
            );
            assert!(!seen.contains(&&child.id), "{} listed twice", child.id);
            seen.push(&child.id);
        }
    }
    assert_eq!(seen.len(), files.files().count());
}

/// Starts `mutation` and feeds the datastore's answer straight back.
fn round_trip(registry: &mut FileRegistry, mutation: FileMutation, stored: Option<FileRecord>) {
    let effect = started(registry.request(&pid(), mutation, NOW).unwrap());
    let next = match (effect, stored) {
        (Effect::InsertFile { .. }, Some(record)) => {
            registry.apply_created(&pid(), Ok(record), NOW)
        }
        (Effect::UpdateFile { .. }, Some(record)) => {
            registry.apply_updated(&pid(), Ok(record), NOW)
        }
        (Effect::DeleteFiles { ids, .. }, None) => {
            registry.apply_deleted(&pid(), &ids, Ok(()), NOW)
        }
        (other, _) => panic!("unexpected effect {other:?}"),
    };
    assert_eq!(next, None);
}

#[test]
fn listings_partition_rows_across_edits() {
    let mut registry = loaded_registry();
    assert_partitioned(&registry);

    round_trip(
        &mut registry,
        FileMutation::Create(NewFile::folder(pid(), None, "notes")),
        Some(folder("n", None, "notes")),
    );
    assert_partitioned(&registry);

    round_trip(
        &mut registry,
        FileMutation::Create(NewFile::file(pid(), Some(FileId::from("n")), "todo.md")),
        Some(file("t", Some("n"), "todo.md")),
    );
    assert_partitioned(&registry);

    round_trip(
        &mut registry,
        FileMutation::Update {
            id: FileId::from("b"),
            patch: FilePatch::rename("bee.txt"),
        },
        Some(file("b", Some("a"), "bee.txt")),
    );
    assert_partitioned(&registry);

    round_trip(
        &mut registry,
        FileMutation::Update {
            id: FileId::from("d"),
            patch: FilePatch::move_to(Some(FileId::from("n"))),
        },
        Some(file("d", Some("n"), "d.txt")),
    );
    assert_partitioned(&registry);

    round_trip(
        &mut registry,
        FileMutation::Update {
            id: FileId::from("c"),
            patch: FilePatch::move_to(None),
        },
        Some(folder("c", None, "C")),
    );
    assert_partitioned(&registry);

    round_trip(&mut registry, FileMutation::Delete { id: FileId::from("a") }, None);
    assert_partitioned(&registry);

    round_trip(&mut registry, FileMutation::Delete { id: FileId::from("n") }, None);
    assert_partitioned(&registry);

    let names: Vec<&str> = registry
        .children_of(&pid(), None)
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["C", "README.md"]);
    assert_eq!(registry.project(&pid()).files().count(), 2);
}

#[test]
fn validate_name_matches_create_rules() {
    let registry = loaded_registry();
    assert_eq!(
        registry.validate_name(&pid(), " fresh ", None, None),
        Ok("fresh".to_string())
    );
    assert_eq!(
        registry.validate_name(&pid(), "b.txt", Some(&FileId::from("a")), None),
        Err(FileTreeError::NameExists)
    );
    assert_eq!(
        registry.validate_name(
            &pid(),
            "b.txt",
            Some(&FileId::from("a")),
            Some(&FileId::from("b"))
        ),
        Ok("b.txt".to_string())
    );
}

#[test]
fn forget_drops_project_state() {
    let mut registry = loaded_registry();
    assert!(registry.forget(&pid()));
    assert!(registry.project(&pid()).tree.is_empty());
    assert!(!registry.forget(&pid()));
}
