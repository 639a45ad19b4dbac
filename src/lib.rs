//! Pail - append-only versioned datasets
//!
//! A pail is a directory of immutable versions. Batch jobs write records
//! into a staged version that becomes visible in one atomic rename; readers
//! resolve either an explicit version or the most recent committed one.
//! Records are routed into category sub-directories so reads can be
//! restricted to the categories they need.
//!
//! # Quick Start
//!
//! ```ignore
//! use pail::{DatasetOptions, PartitionedDataset, Record, Value, VersionStore};
//!
//! let store = VersionStore::local("/data/events")?;
//! let dataset = PartitionedDataset::open(store, DatasetOptions::default())?;
//!
//! let staged = dataset.store().create_version()?;
//! let mut writer = dataset.open_for_write(&staged)?;
//! writer.write(&Record::from(Value::from("hello")))?;
//! writer.commit()?;
//! dataset.store().succeed_version(&staged)?;
//!
//! for stored in dataset.open_for_read(None, None)? {
//!     let stored = stored?;
//!     println!("{}: {:?}", stored.key, stored.record);
//! }
//! ```
//!
//! # Crates
//!
//! - `pail-core`: values, identifiers, errors
//! - `pail-storage`: backends, serializers, the version store
//! - `pail-engine`: routers, partitioned datasets, taps

pub use pail_core::{AttributePath, Category, Error, Result, Value, VersionId, WriterId};
pub use pail_engine::{
    AttributeFilter, AttributeRouter, CategoryRouter, DatasetOptions, DefaultRouter, FnRouter,
    JobOutcome, NullTap, PartitionedDataset, Record, RecordFormat, RecordReader, RecordStream,
    RecordWriter, Sink, Source, StoredRecord, Tap, TapMode, TaskWriter, VersionedTap,
};
pub use pail_storage::{
    get_serializer, DatasetManifest, DirEntry, InMemoryBackend, LocalBackend, RetentionPolicy,
    Serializer, StagedVersion, StorageBackend, StoreConfig, VersionStore,
};

/// Failure injection for tests
pub mod testing {
    pub use pail_storage::testing::*;
}
