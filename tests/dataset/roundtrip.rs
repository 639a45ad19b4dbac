//! Records come back exactly as written

use crate::common::*;
use pail::{AttributeRouter, RecordFormat};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn write_and_commit(dataset: &PartitionedDataset, records: &[Record]) -> VersionId {
    let staged = dataset.store().create_version().unwrap();
    let mut writer = dataset.open_for_write(&staged).unwrap();
    writer.write_all(records).unwrap();
    writer.commit().unwrap();
    dataset.store().succeed_version(&staged).unwrap()
}

#[test]
fn committed_version_holds_exactly_the_written_records() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default().with_router(path_router()));
    let records: Vec<Record> = (0..20)
        .map(|n| event(["a", "b/c", ""][n as usize % 3], n))
        .collect();

    let id = write_and_commit(&dataset, &records);

    let version_dir = ts.store.version_path(id).unwrap();
    let files = ts.files_below(&version_dir);
    assert_eq!(files.len(), records.len());
    assert!(files.iter().all(|f| !f.starts_with('_') && !f.contains("/_")));

    let read = collect(dataset.open_for_read(Some(id), None).unwrap());
    assert_eq!(sorted_ns(&read), (0..20).collect::<Vec<_>>());
    for stored in &read {
        let original = &records[n_of(&stored.record) as usize];
        assert_eq!(&stored.record, original);
        assert!(version_dir.join(&stored.key).is_file());
    }
}

#[test]
fn json_serializer_roundtrip() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default().with_serializer("json"));
    let value = Value::object([
        ("bytes", Value::Bytes(vec![0, 1, 255])),
        ("float", Value::Float(1.5)),
        ("nested", Value::object([("list", Value::Array(vec![Value::Null, Value::Bool(true)]))])),
    ]);
    write_and_commit(&dataset, &[Record::from(value.clone())]);

    let read = collect(dataset.open_for_read(None, None).unwrap());
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].record.as_value(), Some(&value));
}

#[test]
fn json_dataset_refuses_non_finite_floats() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default().with_serializer("json"));
    let staged = ts.store.create_version().unwrap();
    let mut writer = dataset.open_for_write(&staged).unwrap();

    let bad = Record::from(Value::object([("x", Value::Float(f64::INFINITY))]));
    let err = writer.write(&bad).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)), "{err:?}");

    writer.write(&event("", 1)).unwrap();
    writer.commit().unwrap();
    let id = ts.store.succeed_version(&staged).unwrap();

    let read = collect(dataset.open_for_read(Some(id), None).unwrap());
    assert_eq!(sorted_ns(&read), vec![1]);
}

#[test]
fn binary_records_are_stored_verbatim() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::binary());
    let blob = b"\x89PNG\r\n\x1a\n".to_vec();
    let id = write_and_commit(&dataset, &[Record::Raw(blob.clone())]);

    let version_dir = ts.store.version_path(id).unwrap();
    let files = ts.files_below(&version_dir);
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read(version_dir.join(&files[0])).unwrap(), blob);

    let read = collect(dataset.open_for_read(None, None).unwrap());
    assert_eq!(read[0].record, Record::Raw(blob));
    assert_eq!(dataset.options().format, RecordFormat::Binary);
}

#[test]
fn attribute_router_lays_out_categories() {
    let ts = TestStore::new();
    let router = AttributeRouter::new(["country", "kind"]);
    let dataset = ts.dataset(DatasetOptions::default().with_router(Arc::new(router)));
    let record = |country: &str, kind: &str| {
        Record::from(Value::object([
            ("country", Value::from(country)),
            ("kind", Value::from(kind)),
        ]))
    };
    let id = write_and_commit(
        &dataset,
        &[record("se", "click"), record("se", "view"), record("us", "click")],
    );

    let version_dir = ts.store.version_path(id).unwrap();
    assert_eq!(ts.list(&version_dir), vec!["se", "us"]);
    assert_eq!(ts.list(&version_dir.join("se")), vec!["click", "view"]);
}

#[test]
fn manifest_pins_dataset_settings() {
    let ts = TestStore::new();
    let dataset = ts.dataset(DatasetOptions::default());
    write_and_commit(&dataset, &[event("", 1)]);
    assert!(ts.root().join("MANIFEST").is_file());

    let err = PartitionedDataset::open(
        ts.store.clone(),
        DatasetOptions::default().with_serializer("json"),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ManifestMismatch { .. }));

    // MANIFEST is not mistaken for a version
    assert_eq!(ts.store.all_versions().unwrap().len(), 1);
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m: BTreeMap<String, Value>| Value::Object(m)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_decode_encode_through_store(values in prop::collection::vec(arb_value(), 1..8)) {
        let (_, store) = memory_store();
        let dataset = PartitionedDataset::open(store, DatasetOptions::default()).unwrap();
        let staged = dataset.store().create_version().unwrap();
        let mut writer = dataset.open_for_write(&staged).unwrap();
        let mut expected = BTreeMap::new();
        for value in &values {
            let key = writer.write(&Record::from(value.clone())).unwrap();
            expected.insert(key, value.clone());
        }
        writer.commit().unwrap();
        dataset.store().succeed_version(&staged).unwrap();

        let read = collect(dataset.open_for_read(None, None).unwrap());
        prop_assert_eq!(read.len(), values.len());
        for stored in read {
            prop_assert_eq!(stored.record.as_value(), expected.get(&stored.key));
        }
    }
}
