//! Partitioned datasets for pail
//!
//! This crate sits on top of the versioned store:
//! - Record / RecordFormat: structured values or raw blobs
//! - CategoryRouter: maps records to category sub-paths
//! - AttributeFilter: restricts reads to categories
//! - PartitionedDataset: per-task writers and filtered readers over one
//!   version
//! - Taps: the source/sink surface a batch engine drives
//!
//! The dataset never touches version directories itself; staging, commit
//! and rollback all go through `pail_storage::VersionStore`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dataset;
pub mod filter;
pub mod options;
pub mod record;
pub mod router;
pub mod tap;

pub use dataset::{PartitionedDataset, RecordReader, RecordWriter};
pub use filter::AttributeFilter;
pub use options::{DatasetOptions, TapMode};
pub use record::{Record, RecordFormat, StoredRecord};
pub use router::{AttributeRouter, CategoryRouter, DefaultRouter, FnRouter};
pub use tap::{JobOutcome, NullTap, RecordStream, Sink, Source, Tap, TaskWriter, VersionedTap};
