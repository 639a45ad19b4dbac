//! Local filesystem backend

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use super::{DirEntry, StorageBackend};

/// Local filesystem backend
///
/// With `sync` enabled, written files are fsynced before `write_file`
/// returns and `sync_dir` fsyncs the directory, following the
/// write-fsync-rename pattern used for snapshots and the MANIFEST.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend {
    sync: bool,
}

impl LocalBackend {
    /// Backend without fsync (fast, for tests and scratch data)
    pub fn new() -> Self {
        Self { sync: false }
    }

    /// Backend that fsyncs files and directories
    pub fn durable() -> Self {
        Self { sync: true }
    }

    /// Whether writes are fsynced
    pub fn is_durable(&self) -> bool {
        self.sync
    }
}

impl StorageBackend for LocalBackend {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntry { name, is_dir });
        }
        entries.sort();
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if fs::symlink_metadata(from)?.is_file() {
            // Linking fails atomically if `to` exists; rename would replace it.
            fs::hard_link(from, to)?;
            return fs::remove_file(from);
        }
        // POSIX rename silently replaces an empty destination directory.
        if to.try_exists()? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("rename destination {} already exists", to.display()),
            ));
        }
        fs::rename(from, to)
    }

    fn remove_all(&self, path: &Path) -> io::Result<bool> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        let result = if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match result {
            Ok(()) => Ok(true),
            // Lost a race with another remover
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn sync_dir(&self, dir: &Path) -> io::Result<()> {
        if self.sync {
            File::open(dir)?.sync_all()?;
        }
        Ok(())
    }
}
