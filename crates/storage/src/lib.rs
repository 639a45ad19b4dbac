//! Storage layer for pail
//!
//! This crate implements the versioned store and everything below it:
//! - StorageBackend: hierarchical storage (local filesystem, in-memory)
//! - Serializer: pluggable record codecs (msgpack, json)
//! - Directory layout and the dataset MANIFEST
//! - RetentionPolicy: pruning of old committed versions
//! - VersionStore: staged write, atomic commit, rollback
//!
//! # Commit protocol
//!
//! A version is staged under a hidden name, filled by any number of
//! writers, then published by renaming the directory. The rename is the
//! only step readers can observe, so a version is either fully visible or
//! not visible at all.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod codec;
pub mod config;
pub mod format;
pub mod retention;
pub mod testing;
pub mod version_store;

pub use backend::{DirEntry, InMemoryBackend, LocalBackend, StorageBackend};
pub use codec::{get_serializer, CodecError, JsonSerializer, MsgpackSerializer, Serializer};
pub use config::{StoreConfig, StoreConfigError};
pub use format::{DatasetManifest, ManifestError};
pub use retention::{RetentionPolicy, RetentionPolicyError};
pub use version_store::{StagedVersion, VersionStore};
