//! In-memory storage backend for testing.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{DirEntry, StorageBackend};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory storage backend for testing.
///
/// Holds a tree of directories and files keyed by absolute path. All data
/// is lost when the backend is dropped. The filesystem root (and any path
/// without a parent) always exists.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files (directories excluded)
    pub fn file_count(&self) -> usize {
        self.nodes
            .read()
            .values()
            .filter(|n| matches!(n, Node::File(_)))
            .count()
    }

    fn is_implicit_root(path: &Path) -> bool {
        path.parent().is_none()
    }

    fn parent_is_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() || Self::is_implicit_root(parent) => {
                true
            }
            Some(parent) => matches!(nodes.get(parent), Some(Node::Dir)),
        }
    }

    /// Keys of `path` and everything below it
    fn subtree(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> Vec<PathBuf> {
        nodes
            .range(path.to_path_buf()..)
            .take_while(|(k, _)| k.starts_with(path))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn already_exists(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} already exists", path.display()),
    )
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(Self::is_implicit_root(path) || self.nodes.read().contains_key(path))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(Self::is_implicit_root(path) || matches!(self.nodes.read().get(path), Some(Node::Dir)))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let nodes = self.nodes.read();
        if !Self::is_implicit_root(path) {
            match nodes.get(path) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("{} is not a directory", path.display()),
                    ))
                }
                None => return Err(not_found(path)),
            }
        }
        let mut entries: Vec<DirEntry> = nodes
            .range(path.to_path_buf()..)
            .take_while(|(k, _)| k.starts_with(path))
            .filter(|(k, _)| k.parent() == Some(path))
            .filter_map(|(k, node)| {
                let name = k.file_name()?.to_string_lossy().to_string();
                Some(DirEntry {
                    name,
                    is_dir: matches!(node, Node::Dir),
                })
            })
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        if Self::is_implicit_root(path) || nodes.contains_key(path) {
            return Err(already_exists(path));
        }
        if !Self::parent_is_dir(&nodes, path) {
            return Err(not_found(path.parent().unwrap_or(path)));
        }
        nodes.insert(path.to_path_buf(), Node::Dir);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        for ancestor in path.ancestors().collect::<Vec<_>>().into_iter().rev() {
            if ancestor.as_os_str().is_empty() || Self::is_implicit_root(ancestor) {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(already_exists(ancestor)),
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(from) {
            return Err(not_found(from));
        }
        if nodes.contains_key(to) {
            return Err(already_exists(to));
        }
        if !Self::parent_is_dir(&nodes, to) {
            return Err(not_found(to.parent().unwrap_or(to)));
        }
        // All-or-nothing under the write lock
        for key in Self::subtree(&nodes, from) {
            if let Some(node) = nodes.remove(&key) {
                let suffix = key.strip_prefix(from).unwrap_or(Path::new(""));
                let target = if suffix.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(suffix)
                };
                nodes.insert(target, node);
            }
        }
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> io::Result<bool> {
        let mut nodes = self.nodes.write();
        let keys = Self::subtree(&nodes, path);
        if keys.is_empty() {
            return Ok(false);
        }
        for key in keys {
            nodes.remove(&key);
        }
        Ok(true)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(already_exists(path));
        }
        if !Self::parent_is_dir(&nodes, path) {
            return Err(not_found(path.parent().unwrap_or(path)));
        }
        nodes.insert(path.to_path_buf(), Node::File(data.to_vec()));
        Ok(())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.nodes.read().get(path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }
}
