//! Stage, commit and roll back on a real directory

use crate::common::*;
use pail::StagedVersion;

#[test]
fn root_is_created_on_first_stage() {
    let ts = TestStore::new();
    assert!(!ts.root().exists());
    assert_eq!(ts.store.most_recent_version().unwrap(), None);

    let staged = ts.store.create_version().unwrap();
    assert!(ts.root().is_dir());
    assert!(staged.path().is_dir());
    assert!(staged.path().starts_with(ts.root()));
}

#[test]
fn staged_version_is_invisible_until_commit() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    std::fs::write(staged.path().join("r0"), b"x").unwrap();

    assert_eq!(ts.store.most_recent_version().unwrap(), None);
    assert!(ts.store.most_recent_version_path().unwrap_err().is_empty_store());

    let id = ts.store.succeed_version(&staged).unwrap();
    assert_eq!(ts.store.most_recent_version().unwrap(), Some(id));
    assert!(!staged.path().exists());
}

#[test]
fn commit_leaves_only_record_data() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    std::fs::create_dir_all(staged.path().join("cat")).unwrap();
    std::fs::write(staged.path().join("cat/r0"), b"x").unwrap();
    for scratch in ["_temporary/attempt_1", "_temporary2", "_logs/history"] {
        std::fs::create_dir_all(staged.path().join(scratch)).unwrap();
        std::fs::write(staged.path().join(scratch).join("junk"), b"j").unwrap();
    }

    let id = ts.store.succeed_version(&staged).unwrap();
    let version_dir = ts.store.version_path(id).unwrap();
    assert_eq!(ts.list(&version_dir), vec!["cat"]);
    assert_eq!(ts.files_below(&version_dir), vec!["cat/r0"]);
}

#[test]
fn fail_version_removes_everything_and_is_idempotent() {
    let ts = TestStore::new();
    let first = ts.store.create_version().unwrap();
    let kept = ts.store.succeed_version(&first).unwrap();

    let staged = ts.store.create_version().unwrap();
    std::fs::create_dir_all(staged.path().join("a/b")).unwrap();
    std::fs::write(staged.path().join("a/b/r"), b"partial").unwrap();

    ts.store.fail_version(&staged).unwrap();
    assert!(!staged.path().exists());
    assert_eq!(ts.store.all_versions().unwrap(), vec![kept]);

    ts.store.fail_version(&staged).unwrap();
    assert_eq!(ts.store.all_versions().unwrap(), vec![kept]);
}

#[test]
fn staged_version_recovered_from_path() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    let recovered = StagedVersion::from_path(staged.path()).unwrap();
    assert_eq!(recovered, staged);
    ts.store.succeed_version(&recovered).unwrap();
}

#[test]
fn identifiers_strictly_increase_across_commits() {
    let ts = TestStore::new();
    let mut last = None;
    for _ in 0..5 {
        let staged = ts.store.create_version().unwrap();
        let id = ts.store.succeed_version(&staged).unwrap();
        if let Some(prev) = last {
            assert!(id > prev);
        }
        last = Some(id);
    }
    assert_eq!(ts.store.all_versions().unwrap().len(), 5);
}

#[test]
fn orphaned_staged_directory_does_not_block_allocation() {
    let ts = TestStore::new();
    let far = VersionId::now().as_u64() + 10_000_000;
    std::fs::create_dir_all(ts.root().join(format!(".{}.tmp", far))).unwrap();

    let staged = ts.store.create_version().unwrap();
    assert_eq!(staged.id(), VersionId::new(far + 1));

    let abandoned = ts.store.abandoned_staged().unwrap();
    assert_eq!(abandoned.len(), 2);
    assert_eq!(ts.store.purge_staged().unwrap(), 2);
    assert!(ts.store.abandoned_staged().unwrap().is_empty());
}

#[test]
fn concurrent_staging_gets_distinct_identifiers() {
    let ts = TestStore::new();
    let ids: Vec<VersionId> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| ts.store.create_version().unwrap().id()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn destroy_removes_store() {
    let ts = TestStore::new();
    let staged = ts.store.create_version().unwrap();
    ts.store.succeed_version(&staged).unwrap();

    assert!(ts.store.destroy().unwrap());
    assert!(!ts.root().exists());
    assert_eq!(ts.store.most_recent_version().unwrap(), None);
}
