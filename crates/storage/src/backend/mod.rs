//! Hierarchical storage abstraction
//!
//! The version store never talks to a filesystem directly. Everything it
//! needs (listing, directory creation, rename, recursive delete, whole-file
//! read/write) goes through [`StorageBackend`], which has two
//! implementations:
//!
//! - [`LocalBackend`]: the local filesystem via `std::fs`
//! - [`InMemoryBackend`]: an ordered in-memory tree, for tests
//!
//! # Rename contract
//!
//! `rename` is the commit point of a version, so both implementations
//! refuse to overwrite: if the destination exists the call fails with
//! `ErrorKind::AlreadyExists`, and if the source is missing it fails with
//! `ErrorKind::NotFound`. A directory rename is a single operation; no
//! implementation may fall back to copy-then-delete.

mod local;
mod memory;

pub use local::LocalBackend;
pub use memory::InMemoryBackend;

use std::fmt;
use std::io;
use std::path::Path;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    /// File or directory name (last path component)
    pub name: String,
    /// True if the entry is a directory
    pub is_dir: bool,
}

impl DirEntry {
    /// Entry for a directory
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    /// Entry for a file
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Names starting with `_` or `.` hold scratch data and markers
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('_') || self.name.starts_with('.')
    }
}

/// Storage backend trait for abstracting hierarchical storage
///
/// All calls are synchronous and may block on remote-storage latency.
/// None of them retry internally.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Check whether a file or directory exists
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Check whether `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// List the direct children of a directory, sorted by name
    ///
    /// # Errors
    ///
    /// `NotFound` if the directory does not exist.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Create a single directory
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if anything exists at `path`; `NotFound` if the
    /// parent is missing. Callers rely on this to allocate names without
    /// races.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing ancestors
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move `from` to `to` without overwriting
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if `to` exists; `NotFound` if `from` is missing.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file or a directory tree
    ///
    /// Returns `Ok(false)` if nothing existed at `path`.
    fn remove_all(&self, path: &Path) -> io::Result<bool>;

    /// Write a whole file, replacing any previous content
    ///
    /// The parent directory must exist.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Read a whole file
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Make a completed rename in `dir` durable
    fn sync_dir(&self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }
}
