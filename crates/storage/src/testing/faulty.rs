//! Failure-injecting storage backend
//!
//! Wraps another backend and fails selected operations on demand, to
//! exercise commit errors and best-effort cleanup paths.

use crate::backend::{DirEntry, StorageBackend};
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Operation classes that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// `rename`
    Rename,
    /// `remove_all`
    Remove,
    /// `write_file`
    Write,
    /// `list_dir`
    List,
}

/// Backend wrapper that injects I/O errors
#[derive(Debug)]
pub struct FaultyBackend {
    inner: Arc<dyn StorageBackend>,
    fail_rename: AtomicBool,
    fail_remove: AtomicBool,
    fail_write: AtomicBool,
    fail_list: AtomicBool,
    /// Only paths ending with one of these names fail (empty = all paths)
    only_names: Mutex<Vec<String>>,
    injected: AtomicUsize,
}

impl FaultyBackend {
    /// Wrap `inner` with no faults armed
    pub fn new(inner: Arc<dyn StorageBackend>) -> Self {
        FaultyBackend {
            inner,
            fail_rename: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            only_names: Mutex::new(Vec::new()),
            injected: AtomicUsize::new(0),
        }
    }

    fn flag(&self, point: FaultPoint) -> &AtomicBool {
        match point {
            FaultPoint::Rename => &self.fail_rename,
            FaultPoint::Remove => &self.fail_remove,
            FaultPoint::Write => &self.fail_write,
            FaultPoint::List => &self.fail_list,
        }
    }

    /// Arm or disarm a fault
    pub fn set_fault(&self, point: FaultPoint, armed: bool) {
        self.flag(point).store(armed, Ordering::SeqCst);
    }

    /// Restrict faults to paths whose last component is in `names`
    pub fn only_for(&self, names: &[&str]) {
        *self.only_names.lock() = names.iter().map(|n| n.to_string()).collect();
    }

    /// Number of errors injected so far
    pub fn injected(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    fn check(&self, point: FaultPoint, path: &Path) -> io::Result<()> {
        if !self.flag(point).load(Ordering::SeqCst) {
            return Ok(());
        }
        let names = self.only_names.lock();
        let matches = names.is_empty()
            || path
                .file_name()
                .map(|n| names.iter().any(|name| n == name.as_str()))
                .unwrap_or(false);
        if !matches {
            return Ok(());
        }
        self.injected.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("injected {:?} fault at {}", point, path.display()),
        ))
    }
}

impl StorageBackend for FaultyBackend {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        self.inner.is_dir(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.check(FaultPoint::List, path)?;
        self.inner.list_dir(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(FaultPoint::Rename, to)?;
        self.inner.rename(from, to)
    }

    fn remove_all(&self, path: &Path) -> io::Result<bool> {
        self.check(FaultPoint::Remove, path)?;
        self.inner.remove_all(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.check(FaultPoint::Write, path)?;
        self.inner.write_file(path, data)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn sync_dir(&self, dir: &Path) -> io::Result<()> {
        self.inner.sync_dir(dir)
    }
}

/// Convenience: a faulty wrapper around a fresh in-memory backend
pub fn faulty_memory_backend() -> (Arc<FaultyBackend>, PathBuf) {
    let backend = Arc::new(FaultyBackend::new(Arc::new(
        crate::backend::InMemoryBackend::new(),
    )));
    (backend, PathBuf::from("/store"))
}
