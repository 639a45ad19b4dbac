//! Commit and cleanup failures

use crate::common::*;
use pail::testing::{FaultPoint, FaultyBackend};
use std::sync::Arc;

fn faulty_store() -> (Arc<FaultyBackend>, VersionStore) {
    init_tracing();
    let backend = Arc::new(FaultyBackend::new(Arc::new(InMemoryBackend::new())));
    let store =
        VersionStore::with_config("/pail", backend.clone(), StoreConfig::for_testing()).unwrap();
    (backend, store)
}

#[test]
fn collision_on_commit_is_fatal_and_not_retried() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    std::fs::create_dir_all(ts.root().join(staged.id().to_string())).unwrap();

    let err = ts.store.succeed_version(&staged).unwrap_err();
    assert!(matches!(err, Error::Commit { .. }));
    assert!(err.is_fatal());
    assert!(staged.path().exists());

    ts.store.fail_version(&staged).unwrap();
    assert!(!staged.path().exists());
}

#[test]
fn vanished_staged_version_is_commit_error() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    std::fs::remove_dir_all(staged.path()).unwrap();

    let err = ts.store.succeed_version(&staged).unwrap_err();
    assert!(matches!(err, Error::Commit { .. }));
    assert_eq!(ts.store.most_recent_version().unwrap(), None);
}

#[test]
fn rename_failure_is_commit_error() {
    let (backend, store) = faulty_store();
    let staged = store.create_version().unwrap();
    backend.set_fault(FaultPoint::Rename, true);

    let err = store.succeed_version(&staged).unwrap_err();
    assert!(matches!(err, Error::Commit { .. }));
    assert_eq!(backend.injected(), 1);
    assert!(store.all_versions().unwrap().is_empty());
}

#[test]
fn artifact_cleanup_failure_does_not_fail_commit() {
    let (backend, store) = faulty_store();
    let staged = store.create_version().unwrap();
    backend.create_dir_all(&staged.path().join("_logs")).unwrap();

    backend.only_for(&["_logs"]);
    backend.set_fault(FaultPoint::Remove, true);
    let id = store.succeed_version(&staged).unwrap();

    assert_eq!(store.most_recent_version().unwrap(), Some(id));
    assert_eq!(backend.injected(), 1);
}

#[test]
fn listing_failure_propagates() {
    let (backend, store) = faulty_store();
    let staged = store.create_version().unwrap();
    store.succeed_version(&staged).unwrap();

    backend.set_fault(FaultPoint::List, true);
    let err = store.most_recent_version().unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
