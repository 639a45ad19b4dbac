//! Resolving versions for reads

use crate::common::*;
use pail::StagedVersion;

/// Stage every id in ascending order, then commit them in the given order
fn commit_ids(store: &VersionStore, ids: &[u64]) {
    let mut ascending = ids.to_vec();
    ascending.sort_unstable();
    let staged: Vec<StagedVersion> = ascending
        .into_iter()
        .map(|id| store.create_version_with(VersionId::new(id)).unwrap())
        .collect();

    for id in ids {
        let version = staged
            .iter()
            .find(|s| s.id() == VersionId::new(*id))
            .unwrap();
        store.succeed_version(version).unwrap();
    }
}

#[test]
fn most_recent_is_maximum_identifier_not_commit_order() {
    let ts = TestStore::new();
    commit_ids(&ts.store, &[5, 12, 7]);

    assert_eq!(ts.store.most_recent_version().unwrap(), Some(VersionId::new(12)));
    assert_eq!(ts.store.most_recent_version_path().unwrap(), ts.root().join("12"));
    assert_eq!(
        ts.store.all_versions().unwrap(),
        vec![VersionId::new(5), VersionId::new(7), VersionId::new(12)]
    );
}

#[test]
fn most_recent_follows_each_commit() {
    let ts = TestStore::new();
    let s5 = ts.store.create_version_with(VersionId::new(5)).unwrap();
    let s7 = ts.store.create_version_with(VersionId::new(7)).unwrap();
    let s12 = ts.store.create_version_with(VersionId::new(12)).unwrap();
    assert_eq!(ts.store.most_recent_version().unwrap(), None);

    ts.store.succeed_version(&s5).unwrap();
    assert_eq!(ts.store.most_recent_version().unwrap(), Some(VersionId::new(5)));
    ts.store.succeed_version(&s12).unwrap();
    assert_eq!(ts.store.most_recent_version().unwrap(), Some(VersionId::new(12)));
    ts.store.succeed_version(&s7).unwrap();
    assert_eq!(ts.store.most_recent_version().unwrap(), Some(VersionId::new(12)));
}

#[test]
fn explicit_version_resolution() {
    let ts = TestStore::new();
    commit_ids(&ts.store, &[3]);

    assert_eq!(ts.store.version_path(VersionId::new(3)).unwrap(), ts.root().join("3"));
    let err = ts.store.version_path(VersionId::new(4)).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::VersionNotFound { version, .. } if version == VersionId::new(4)));
}

#[test]
fn empty_store_errors() {
    let ts = TestStore::new();
    let err = ts.store.most_recent_version_path().unwrap_err();
    assert!(err.is_empty_store());
    assert!(err.to_string().contains(&ts.root().display().to_string()));
}

#[test]
fn non_canonical_and_foreign_entries_are_ignored() {
    let ts = TestStore::new();
    commit_ids(&ts.store, &[9]);
    for dir in ["007", "abc", "_temporary", ".20.tmp", "+3"] {
        std::fs::create_dir_all(ts.root().join(dir)).unwrap();
    }
    std::fs::write(ts.root().join("42"), b"a file, not a version").unwrap();

    assert_eq!(ts.store.all_versions().unwrap(), vec![VersionId::new(9)]);
    assert_eq!(ts.store.most_recent_version().unwrap(), Some(VersionId::new(9)));
}

#[test]
fn create_version_with_must_exceed_existing() {
    let ts = TestStore::new();
    commit_ids(&ts.store, &[10]);

    let err = ts.store.create_version_with(VersionId::new(10)).unwrap_err();
    assert!(matches!(err, Error::InvalidUsage(_)));
    let staged = ts.store.create_version_with(VersionId::new(11)).unwrap();
    assert_eq!(ts.store.succeed_version(&staged).unwrap(), VersionId::new(11));
}
