use std::fs;

use stagefile_core::{EntryKind, ErrorKind, FileStore, SessionConfig, StoreError};
use stagefile_ops::{
    AlwaysOverwrite, Conflict, NeverOverwrite, OperationKind, OpsError, PendingOperation, Session,
    SessionEvent, SessionHandle,
};
use stagefile_store::{LocalStore, MemoryStore};
use tempfile::TempDir;

fn session_at(store: MemoryStore, dir: &str) -> Session<MemoryStore> {
    Session::new(store, SessionConfig::new(dir)).unwrap()
}

fn sample_store() -> MemoryStore {
    MemoryStore::new()
        .with_file("/a/x.txt", "x contents")
        .with_file("/a/y.txt", "y contents")
        .with_dir("/a/b")
        .with_dir("/c")
}

fn names(session: &Session<MemoryStore>) -> Vec<String> {
    session
        .listing()
        .iter()
        .map(|e| e.name.to_string())
        .collect()
}

#[test]
fn test_listing_puts_directories_first() {
    let store = MemoryStore::new()
        .with_file("/d/Zeta.txt", "")
        .with_file("/d/alpha.txt", "")
        .with_dir("/d/beta")
        .with_dir("/d/Alpha");
    let session = session_at(store, "/d");

    assert_eq!(names(&session), vec!["Alpha", "beta", "alpha.txt", "Zeta.txt"]);
}

#[test]
fn test_unreadable_child_is_listed_as_inaccessible() {
    let mut store = sample_store();
    store.mark_unreadable("/a/y.txt");
    let session = session_at(store, "/a");

    let entry = session.listing().get("y.txt").unwrap();
    assert_eq!(entry.kind, EntryKind::Inaccessible);
    assert_eq!(session.listing().len(), 3);
}

#[test]
fn test_copy_into_subdirectory() {
    let store = MemoryStore::new()
        .with_file("/a/x.txt", "original")
        .with_dir("/a/b");
    let mut session = session_at(store, "/a");

    session.select_name("x.txt", true).unwrap();
    assert_eq!(session.mark(OperationKind::Copy).unwrap(), 1);
    session.navigate("/a/b").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.bytes_processed, 8);
    assert_eq!(session.store().read_file("/a/b/x.txt").unwrap(), b"original");
    assert_eq!(session.store().read_file("/a/x.txt").unwrap(), b"original");
    assert!(session.pending().is_idle());
    assert!(session.listing().get("x.txt").is_some());
}

#[test]
fn test_copy_tree_reproduces_structure() {
    let store = MemoryStore::new()
        .with_file("/src/tree/one.txt", "1")
        .with_file("/src/tree/deep/two.txt", "22")
        .with_dir("/src/tree/deep/empty")
        .with_dir("/dest");
    let mut session = session_at(store, "/src");

    session.select_name("tree", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/dest").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();
    assert!(report.is_success());

    let copied: Vec<&str> = session
        .store()
        .paths()
        .filter_map(|p| p.strip_prefix("/dest/tree"))
        .collect();
    let original: Vec<&str> = session
        .store()
        .paths()
        .filter_map(|p| p.strip_prefix("/src/tree"))
        .collect();
    assert_eq!(copied, original);
    assert_eq!(session.store().read_file("/dest/tree/deep/two.txt").unwrap(), b"22");
}

#[test]
fn test_pending_batch_survives_navigation() {
    let store = sample_store().with_dir("/deep/er/still");
    let mut session = session_at(store, "/a");

    session.select_name("x.txt", true).unwrap();
    session.select_name("y.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();

    for dir in ["/c", "/", "deep", "er", "..", "er/still"] {
        session.navigate(dir).unwrap();
    }
    assert_eq!(session.current_dir(), "/deep/er/still");
    assert_eq!(session.pending().len(), 2);

    session.commit_pending(&mut AlwaysOverwrite).unwrap();
    assert_eq!(names(&session), vec!["x.txt", "y.txt"]);
}

#[test]
fn test_remark_discards_previous_batch() {
    let mut session = session_at(sample_store(), "/a");
    let mut events = session.subscribe();

    session.select_name("x.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.select_name("y.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();

    assert_eq!(
        session.pending(),
        &PendingOperation::CopyPending(vec!["/a/y.txt".into()])
    );

    let mut discarded = None;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::PendingDiscarded { count } = event {
            discarded = Some(count);
        }
    }
    assert_eq!(discarded, Some(1));

    session.navigate("/c").unwrap();
    session.commit_pending(&mut AlwaysOverwrite).unwrap();
    assert_eq!(names(&session), vec!["y.txt"]);
}

#[test]
fn test_strict_mode_rejects_remark() {
    let config = SessionConfig {
        reject_remark_while_pending: true,
        ..SessionConfig::new("/a")
    };
    let mut session = Session::new(sample_store(), config).unwrap();

    session.select_name("x.txt", true).unwrap();
    session.mark(OperationKind::Move).unwrap();
    session.select_name("y.txt", true).unwrap();

    let err = session.mark(OperationKind::Copy).unwrap_err();
    assert_eq!(err, OpsError::PendingBatchExists { count: 1 });
    assert_eq!(session.pending().kind(), Some(OperationKind::Move));
    assert!(session.selection().contains("/a/y.txt"));
}

#[test]
fn test_commit_without_batch() {
    let mut session = session_at(sample_store(), "/a");
    let err = session.commit_pending(&mut AlwaysOverwrite).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NothingPending);
}

#[test]
fn test_commit_in_source_directory_skips() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    session.mark(OperationKind::Move).unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded, 0);
    assert!(session.store().exists("/a/x.txt"));
    assert!(session.pending().is_idle());
}

#[test]
fn test_declined_conflict_skips_only_that_item() {
    let store = sample_store().with_file("/c/x.txt", "already here");
    let mut session = session_at(store, "/a");

    session.select_name("x.txt", true).unwrap();
    session.select_name("y.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/c").unwrap();

    let mut asked = Vec::new();
    let mut policy = |conflict: &Conflict| {
        asked.push(conflict.destination.clone());
        false
    };
    let report = session.commit_pending(&mut policy).unwrap();

    assert_eq!(asked, vec!["/c/x.txt"]);
    assert_eq!((report.succeeded, report.skipped), (1, 1));
    assert_eq!(session.store().read_file("/c/x.txt").unwrap(), b"already here");
    assert_eq!(session.store().read_file("/c/y.txt").unwrap(), b"y contents");
}

#[test]
fn test_accepted_conflict_overwrites() {
    let store = sample_store().with_file("/c/x.txt", "old");
    let mut session = session_at(store, "/a");

    session.select_name("x.txt", true).unwrap();
    session.mark(OperationKind::Move).unwrap();
    session.navigate("/c").unwrap();
    session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(session.store().read_file("/c/x.txt").unwrap(), b"x contents");
    assert!(!session.store().exists("/a/x.txt"));
}

#[test]
fn test_failed_item_does_not_stop_batch() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    session.select_name("y.txt", true).unwrap();
    session.mark(OperationKind::Move).unwrap();
    session.store_mut().unlink("/a/x.txt").unwrap();

    session.navigate("/c").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert_eq!(report.errors[0].path, "/a/x.txt");
    assert!(session.pending().is_idle());
    assert_eq!(names(&session), vec!["y.txt"]);
}

#[test]
fn test_copy_into_own_subtree_is_rejected() {
    let mut session = session_at(sample_store(), "/");

    session.select_name("a", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/a/b").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(report.failed, 1);
    assert!(!session.store().exists("/a/b/a"));
}

#[test]
fn test_delete_non_empty_directory_fails() {
    let mut session = session_at(sample_store(), "/");

    session.select_name("a", true).unwrap();
    session.select_name("c", true).unwrap();
    let report = session.delete().unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert_eq!(report.errors[0].path, "/a");
    assert!(report.errors[0].message.contains("not empty"));
    assert_eq!(session.store().read_file("/a/x.txt").unwrap(), b"x contents");
    assert!(!session.store().exists("/c"));
    assert!(session.selection().is_empty());
}

#[test]
fn test_delete_inaccessible_entry() {
    let mut store = sample_store().with_file("/a/bad", "unreadable");
    store.mark_unreadable("/a/bad");
    let mut session = session_at(store, "/a");
    assert!(session.listing().get("bad").unwrap().kind.is_inaccessible());

    session.select_name("bad", true).unwrap();
    let report = session.delete().unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 0));
    assert!(!session.store().paths().any(|p| p == "/a/bad"));
    assert!(session.listing().get("bad").is_none());
}

#[test]
fn test_copy_merges_into_existing_directory() {
    let store = MemoryStore::new()
        .with_file("/src/tree/new.txt", "new")
        .with_file("/src/tree/shared.txt", "from source")
        .with_file("/dest/tree/old.txt", "old")
        .with_file("/dest/tree/shared.txt", "from dest");
    let mut session = session_at(store, "/src");

    session.select_name("tree", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/dest").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(report.succeeded, 1);
    let store = session.store();
    assert_eq!(store.read_file("/dest/tree/old.txt").unwrap(), b"old");
    assert_eq!(store.read_file("/dest/tree/new.txt").unwrap(), b"new");
    assert_eq!(store.read_file("/dest/tree/shared.txt").unwrap(), b"from source");
}

#[test]
fn test_failure_inside_tree_keeps_partial_copy() {
    let mut store = MemoryStore::new()
        .with_file("/src/tree/a.txt", "a")
        .with_file("/src/tree/b.txt", "b")
        .with_file("/src/tree/c.txt", "c")
        .with_file("/src/zeta.txt", "sibling")
        .with_dir("/dest");
    store.mark_unreadable("/src/tree/b.txt");
    let mut session = session_at(store, "/src");

    session.select_name("tree", true).unwrap();
    session.select_name("zeta.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/dest").unwrap();
    let report = session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert_eq!(report.errors[0].path, "/src/tree");

    let store = session.store();
    assert_eq!(store.read_file("/dest/tree/a.txt").unwrap(), b"a");
    assert!(!store.exists("/dest/tree/b.txt"));
    assert!(!store.exists("/dest/tree/c.txt"));
    assert_eq!(store.read_file("/dest/zeta.txt").unwrap(), b"sibling");
    assert!(session.pending().is_idle());
}

#[test]
fn test_move_directory_commit() {
    let store = MemoryStore::new()
        .with_file("/src/tree/deep/f.txt", "payload")
        .with_dir("/src/tree/empty")
        .with_dir("/dest");
    let mut session = session_at(store, "/src");

    session.select_name("tree", true).unwrap();
    session.mark(OperationKind::Move).unwrap();
    session.navigate("/dest").unwrap();
    let report = session.commit_pending(&mut NeverOverwrite).unwrap();

    assert_eq!(report.succeeded, 1);
    let store = session.store();
    assert_eq!(store.read_file("/dest/tree/deep/f.txt").unwrap(), b"payload");
    assert!(store.is_dir_path("/dest/tree/empty"));
    assert!(!store.exists("/src/tree"));
    assert_eq!(names(&session), vec!["tree"]);
}

#[test]
fn test_delete_requires_selection() {
    let mut session = session_at(sample_store(), "/a");
    assert_eq!(session.delete().unwrap_err(), OpsError::NoSelection);
}

#[test]
fn test_rename_in_place() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    let report = session.rename(" renamed.txt ", &mut NeverOverwrite).unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(session.store().read_file("/a/renamed.txt").unwrap(), b"x contents");
    assert!(session.selection().is_empty());
}

#[test]
fn test_rename_with_path_moves() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    session.rename("../c/moved.txt", &mut NeverOverwrite).unwrap();

    assert!(session.store().exists("/c/moved.txt"));
    assert!(!session.store().exists("/a/x.txt"));
}

#[test]
fn test_rename_needs_exactly_one_item() {
    let mut session = session_at(sample_store(), "/a");
    let err = session.rename("z", &mut AlwaysOverwrite).unwrap_err();
    assert_eq!(err, OpsError::InvalidSelection { expected: 1, actual: 0 });

    session.select_name("x.txt", true).unwrap();
    session.select_name("y.txt", true).unwrap();
    let err = session.rename("z", &mut AlwaysOverwrite).unwrap_err();
    assert_eq!(err, OpsError::InvalidSelection { expected: 1, actual: 2 });
}

#[test]
fn test_rename_declined_conflict_keeps_both() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    let report = session.rename("y.txt", &mut NeverOverwrite).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(session.store().read_file("/a/y.txt").unwrap(), b"y contents");
    assert!(session.store().exists("/a/x.txt"));
}

#[test]
fn test_rename_failure_keeps_selection() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    let err = session.rename("/missing/x.txt", &mut AlwaysOverwrite).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(session.selection().contains("/a/x.txt"));
}

#[test]
fn test_mkdir() {
    let mut session = session_at(sample_store(), "/a");

    assert_eq!(session.mkdir("new").unwrap(), "/a/new");
    assert!(session.listing().get("new").unwrap().is_dir());

    let err = session.mkdir("b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let err = session.mkdir("..").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidName);
}

#[test]
fn test_import_overwrites_and_uses_base_name() {
    let mut session = session_at(sample_store(), "/a");

    let path = session.import_bytes("C:/Users/me/x.txt", b"imported").unwrap();
    assert_eq!(path, "/a/x.txt");
    assert_eq!(session.store().read_file("/a/x.txt").unwrap(), b"imported");
}

#[test]
fn test_export_selected() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("y.txt", true).unwrap();
    let exported = session.export_selected().unwrap();
    assert_eq!(exported.name, "y.txt");
    assert_eq!(exported.data, b"y contents");

    session.clear_selection();
    session.select_name("b", true).unwrap();
    let err = session.export_selected().unwrap_err();
    assert_eq!(err, OpsError::Store(StoreError::IsADirectory { path: "/a/b".into() }));
}

#[test]
fn test_navigation_clears_selection_only() {
    let mut session = session_at(sample_store(), "/a");

    session.select_name("x.txt", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.select_name("y.txt", true).unwrap();
    session.navigate("b").unwrap();

    assert!(session.selection().is_empty());
    assert_eq!(session.pending().len(), 1);
}

#[test]
fn test_navigate_failures_leave_state_alone() {
    let mut session = session_at(sample_store(), "/a");
    session.select_name("x.txt", true).unwrap();

    let err = session.navigate("x.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotADirectory);
    let err = session.navigate("/nowhere").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(session.current_dir(), "/a");
    assert!(session.selection().contains("/a/x.txt"));
}

#[test]
fn test_go_up_stops_at_root() {
    let mut session = session_at(sample_store(), "/a/b");
    session.go_up().unwrap();
    assert_eq!(session.current_dir(), "/a");
    session.go_up().unwrap();
    session.go_up().unwrap();
    assert_eq!(session.current_dir(), "/");
}

#[test]
fn test_select_requires_listed_path() {
    let mut session = session_at(sample_store(), "/a");
    let err = session.toggle_select("/c", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSelection);
    session.toggle_select("/c", false).unwrap();
}

#[test]
fn test_listing_events() {
    let mut session = session_at(sample_store(), "/a");
    let mut events = session.subscribe();

    session.navigate("/c").unwrap();

    match events.try_recv().unwrap() {
        SessionEvent::ListingChanged(listing) => assert_eq!(listing.directory, "/c"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_local_store_end_to_end() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("saves")).unwrap();
    fs::create_dir_all(temp.path().join("backup")).unwrap();
    fs::write(temp.path().join("saves/slot1.srm"), b"save data").unwrap();

    let store = LocalStore::new(temp.path()).unwrap();
    let mut session = Session::new(store, SessionConfig::new("/saves")).unwrap();

    session.select_name("slot1.srm", true).unwrap();
    session.mark(OperationKind::Copy).unwrap();
    session.navigate("/backup").unwrap();
    session.commit_pending(&mut AlwaysOverwrite).unwrap();

    assert_eq!(
        fs::read(temp.path().join("backup/slot1.srm")).unwrap(),
        b"save data"
    );
    assert_eq!(session.listing().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_commands_are_refused() {
    let handle = SessionHandle::new(session_at(sample_store(), "/a"));
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move {
            handle
                .run(move |s| {
                    let _ = release_rx.recv();
                    s.mkdir("slow")
                })
                .await
        })
    };

    while !handle.is_busy() {
        tokio::task::yield_now().await;
    }

    assert!(matches!(handle.delete().await, Err(OpsError::Busy)));
    assert!(matches!(handle.mkdir("other").await, Err(OpsError::Busy)));
    assert!(matches!(
        handle.read(|s| s.current_dir().to_string()),
        Err(OpsError::Busy)
    ));

    release_tx.send(()).unwrap();
    assert_eq!(first.await.unwrap().unwrap(), "/a/slow");
    assert!(!handle.is_busy());

    let listed = handle.read(|s| s.listing().get("other").is_none()).unwrap();
    assert!(listed);
}

#[tokio::test]
async fn test_handle_runs_commands() {
    let handle = SessionHandle::new(session_at(sample_store(), "/a"));

    handle.toggle_select("/a/x.txt", true).await.unwrap();
    handle.mark(OperationKind::Copy).await.unwrap();
    handle.navigate("/c").await.unwrap();
    let report = handle
        .commit_pending(Box::new(AlwaysOverwrite))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    let names = handle
        .read(|s| s.listing().iter().map(|e| e.name.to_string()).collect::<Vec<_>>())
        .unwrap();
    assert_eq!(names, vec!["x.txt"]);
}
