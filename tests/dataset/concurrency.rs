//! Many tasks writing into one staged version

use crate::common::*;
use pail::{CategoryRouter, DefaultRouter};
use proptest::prelude::*;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

fn concurrent_job(
    dataset: &PartitionedDataset,
    tasks: usize,
    per_task: usize,
    path_of: impl Fn(usize) -> String + Sync,
) -> (VersionId, Vec<String>) {
    let staged = dataset.store().create_version().unwrap();
    let keys: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..tasks)
            .map(|task| {
                let staged = &staged;
                let path_of = &path_of;
                s.spawn(move || {
                    let mut writer = dataset.open_for_write(staged).unwrap();
                    let mut keys = Vec::new();
                    for i in 0..per_task {
                        let n = (task * per_task + i) as i64;
                        keys.push(writer.write(&event(&path_of(i), n)).unwrap());
                    }
                    writer.commit().unwrap();
                    keys
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    let id = dataset.store().succeed_version(&staged).unwrap();
    (id, keys)
}

#[test]
fn default_router_writers_never_collide() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default());
    let (id, keys) = concurrent_job(&dataset, 8, 25, |_| String::new());

    let unique: HashSet<&String> = keys.iter().collect();
    assert_eq!(unique.len(), 8 * 25);

    let read = collect(dataset.open_for_read(Some(id), None).unwrap());
    assert_eq!(read.len(), 8 * 25);
    assert_eq!(sorted_ns(&read), (0..200).collect::<Vec<i64>>());
}

#[test]
fn partitioned_writers_never_collide() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default().with_router(path_router()));
    // Every task writes into the same few categories
    let (id, keys) = concurrent_job(&dataset, 6, 30, |i| ["a/b", "a/c", "x"][i % 3].to_string());

    let unique: HashSet<&String> = keys.iter().collect();
    assert_eq!(unique.len(), 6 * 30);

    let version_dir = ts.store.version_path(id).unwrap();
    assert_eq!(ts.files_below(&version_dir).len(), 6 * 30);
    assert_eq!(ts.list(&version_dir), vec!["a", "x"]);
}

#[test]
fn random_categories_under_contention() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default().with_router(path_router()));
    let paths: Vec<String> = {
        let mut rng = rand::thread_rng();
        (0..40)
            .map(|_| format!("p{}/q{}", rng.gen_range(0..3), rng.gen_range(0..3)))
            .collect()
    };
    let (id, keys) = concurrent_job(&dataset, 4, 40, |i| paths[i].clone());

    assert_eq!(keys.iter().collect::<HashSet<_>>().len(), 160);
    let read = collect(dataset.open_for_read(Some(id), None).unwrap());
    assert_eq!(read.len(), 160);
}

#[test]
fn writer_ids_are_embedded_in_keys() {
    let (_, store) = memory_store();
    let dataset = PartitionedDataset::open(store, DatasetOptions::default()).unwrap();
    let staged = dataset.store().create_version().unwrap();

    let mut a = dataset.open_for_write(&staged).unwrap();
    let mut b = dataset.open_for_write(&staged).unwrap();
    assert_ne!(a.writer_id(), b.writer_id());

    let ka = a.write(&event("", 1)).unwrap();
    let kb = b.write(&event("", 1)).unwrap();
    assert!(ka.starts_with(&a.writer_id().to_string()));
    assert!(kb.starts_with(&b.writer_id().to_string()));
    assert_ne!(ka, kb);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_keys_unique_for_any_router(
        tasks in 1usize..5,
        per_task in 1usize..10,
        partitioned in any::<bool>(),
    ) {
        let (_, store) = memory_store();
        let router: Arc<dyn CategoryRouter> = if partitioned {
            path_router()
        } else {
            Arc::new(DefaultRouter)
        };
        let dataset =
            PartitionedDataset::open(store, DatasetOptions::default().with_router(router)).unwrap();
        let (_, keys) = concurrent_job(&dataset, tasks, per_task, |i| format!("c{}", i % 2));
        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(unique.len(), tasks * per_task);
    }
}
