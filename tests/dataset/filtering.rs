//! Attribute-restricted reads

use crate::common::*;

fn layered_dataset(ts: &TestStore) -> (PartitionedDataset, VersionId) {
    let dataset = ts.dataset(DatasetOptions::default().with_router(path_router()));
    let staged = ts.store.create_version().unwrap();
    let mut writer = dataset.open_for_write(&staged).unwrap();
    for n in 0..12 {
        writer.write(&event(["a/b", "a/c", "x"][n as usize % 3], n)).unwrap();
    }
    writer.commit().unwrap();
    let id = ts.store.succeed_version(&staged).unwrap();
    (dataset, id)
}

fn paths_of(records: &[StoredRecord]) -> Vec<String> {
    let mut paths: Vec<String> = records
        .iter()
        .map(|s| {
            s.record
                .as_value()
                .and_then(|v| v.get("path"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        })
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

#[test]
fn exact_path_reads_only_that_category() {
    let ts = TestStore::new();
    let (dataset, id) = layered_dataset(&ts);

    let filter = AttributeFilter::parse(["a/b"]);
    let read = collect(dataset.open_for_read(Some(id), Some(&filter)).unwrap());
    assert_eq!(read.len(), 4);
    assert_eq!(paths_of(&read), vec!["a/b"]);
    assert!(read.iter().all(|s| s.key.starts_with("a/b/")));
}

#[test]
fn prefix_path_covers_nested_categories() {
    let ts = TestStore::new();
    let (dataset, id) = layered_dataset(&ts);

    let filter = AttributeFilter::parse(["a"]);
    let read = collect(dataset.open_for_read(Some(id), Some(&filter)).unwrap());
    assert_eq!(read.len(), 8);
    assert_eq!(paths_of(&read), vec!["a/b", "a/c"]);
}

#[test]
fn overlapping_paths_read_each_record_once() {
    let ts = TestStore::new();
    let (dataset, id) = layered_dataset(&ts);

    let filter = AttributeFilter::parse(["a", "a/b", "x"]);
    let read = collect(dataset.open_for_read(Some(id), Some(&filter)).unwrap());
    assert_eq!(sorted_ns(&read), (0..12).collect::<Vec<i64>>());
}

#[test]
fn missing_path_reads_nothing() {
    let ts = TestStore::new();
    let (dataset, id) = layered_dataset(&ts);

    let filter = AttributeFilter::parse(["nope/never"]);
    let reader = dataset.open_for_read(Some(id), Some(&filter)).unwrap();
    assert_eq!(reader.remaining(), 0);
    assert!(collect(reader).is_empty());
}

#[test]
fn empty_filter_reads_whole_version() {
    let ts = TestStore::new();
    let (dataset, id) = layered_dataset(&ts);

    let filter = AttributeFilter::default();
    let read = collect(dataset.open_for_read(Some(id), Some(&filter)).unwrap());
    assert_eq!(read.len(), 12);
}

#[test]
fn options_attributes_apply_to_reads() {
    let ts = TestStore::new();
    let (_, id) = layered_dataset(&ts);

    let reader_ds = ts.dataset(
        DatasetOptions::default()
            .with_router(path_router())
            .with_attributes([Category::parse("x")]),
    );
    let read = collect(reader_ds.open_for_read(Some(id), None).unwrap());
    assert_eq!(paths_of(&read), vec!["x"]);

    // An explicit filter wins over the options
    let all = AttributeFilter::default();
    let read = collect(reader_ds.open_for_read(Some(id), Some(&all)).unwrap());
    assert_eq!(read.len(), 12);
}

#[test]
fn attributes_on_write_are_rejected_before_any_write() {
    let (backend, store) = memory_store();
    let dataset = PartitionedDataset::open(
        store.clone(),
        DatasetOptions::default().with_attributes([Category::parse("a")]),
    )
    .unwrap();
    let staged = store.create_version().unwrap();

    let err = dataset.open_for_write(&staged).unwrap_err();
    assert!(matches!(err, Error::InvalidUsage(_)), "{err:?}");
    assert_eq!(backend.file_count(), 0);
}

#[test]
fn filtered_read_of_older_version() {
    let ts = TestStore::new();
    let (dataset, first) = layered_dataset(&ts);

    let staged = ts.store.create_version().unwrap();
    let mut writer = dataset.open_for_write(&staged).unwrap();
    writer.write(&event("x", 100)).unwrap();
    writer.commit().unwrap();
    let second = ts.store.succeed_version(&staged).unwrap();
    assert!(second > first);

    let filter = AttributeFilter::parse(["x"]);
    let latest = collect(dataset.open_for_read(None, Some(&filter)).unwrap());
    assert_eq!(sorted_ns(&latest), vec![100]);
    let older = collect(dataset.open_for_read(Some(first), Some(&filter)).unwrap());
    assert_eq!(sorted_ns(&older), vec![2, 5, 8, 11]);
}
