//! Record reader over one committed version
//!
//! The reader lists its input files when it is opened and decodes them
//! lazily as it is iterated. Entries whose names start with `_` or `.`
//! are skipped at every level.

use crate::filter::AttributeFilter;
use crate::record::{Record, RecordFormat, StoredRecord};
use pail_core::{Result, VersionId};
use pail_storage::{Serializer, StorageBackend};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, Span};

/// Iterator over the records of one version
#[derive(Debug)]
pub struct RecordReader {
    backend: Arc<dyn StorageBackend>,
    version: VersionId,
    root: PathBuf,
    pending: VecDeque<String>,
    format: RecordFormat,
    serializer: Arc<dyn Serializer>,
    span: Span,
}

impl RecordReader {
    pub(crate) fn open(
        backend: Arc<dyn StorageBackend>,
        version: VersionId,
        root: PathBuf,
        filter: &AttributeFilter,
        format: RecordFormat,
        serializer: Arc<dyn Serializer>,
        span: Span,
    ) -> Result<Self> {
        let mut keys = Vec::new();
        for category in filter.roots() {
            let prefix = category.to_path();
            let dir = if prefix.is_empty() {
                root.clone()
            } else {
                root.join(&prefix)
            };
            if !backend.is_dir(&dir)? {
                debug!(
                    target: "pail::dataset",
                    parent: &span,
                    path = %prefix,
                    "Attribute path absent, contributes no records"
                );
                continue;
            }
            debug!(
                target: "pail::dataset",
                parent: &span,
                path = %dir.display(),
                "Adding input path"
            );
            collect_keys(backend.as_ref(), &dir, &prefix, &mut keys)?;
        }
        keys.sort();

        Ok(RecordReader {
            backend,
            version,
            root,
            pending: keys.into(),
            format,
            serializer,
            span,
        })
    }

    /// Version being read
    pub fn version(&self) -> VersionId {
        self.version
    }

    /// Records not yet yielded
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn read_key(&self, key: String) -> Result<StoredRecord> {
        let data = self.backend.read_file(&self.root.join(&key))?;
        trace!(
            target: "pail::dataset",
            parent: &self.span,
            key = %key,
            len = data.len(),
            "Record read"
        );
        let record = Record::decode(data, self.format, self.serializer.as_ref())?;
        Ok(StoredRecord { key, record })
    }
}

impl Iterator for RecordReader {
    type Item = Result<StoredRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.pending.pop_front()?;
        Some(self.read_key(key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

/// Depth-first listing of visible files under `dir`
fn collect_keys(
    backend: &dyn StorageBackend,
    dir: &Path,
    prefix: &str,
    keys: &mut Vec<String>,
) -> Result<()> {
    let entries = match backend.list_dir(dir) {
        Ok(entries) => entries,
        // Raced with a prune
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        if entry.is_hidden() {
            continue;
        }
        let key = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix, entry.name)
        };
        if entry.is_dir {
            collect_keys(backend, &dir.join(&entry.name), &key, keys)?;
        } else {
            keys.push(key);
        }
    }
    Ok(())
}
