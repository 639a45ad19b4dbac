//! Per-task record writer
//!
//! Each parallel task gets its own [`RecordWriter`] with a fresh
//! [`WriterId`]. Records are written into the task's scratch directory
//! `<staged>/_temporary/<writer>/<category>/<leaf>` and only moved into
//! the staged version on [`RecordWriter::commit`]. A task that fails calls
//! [`RecordWriter::abort`]; scratch left by a task that died without
//! either is removed when the version is committed.
//!
//! Leaf names are `<writer>-<seq>[-<suffix>]`. The writer id makes keys
//! from different tasks disjoint without any coordination.

use crate::record::{Record, RecordFormat};
use crate::router::CategoryRouter;
use pail_core::{Category, Error, Result, WriterId};
use pail_storage::format::writer_scratch_path;
use pail_storage::{Serializer, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, Span};

/// Writes records for one task into a staged version
#[derive(Debug)]
pub struct RecordWriter {
    backend: Arc<dyn StorageBackend>,
    staged: PathBuf,
    scratch: PathBuf,
    writer_id: WriterId,
    seq: u64,
    format: RecordFormat,
    serializer: Arc<dyn Serializer>,
    router: Arc<dyn CategoryRouter>,
    keys: Vec<String>,
    span: Span,
}

impl RecordWriter {
    pub(crate) fn new(
        backend: Arc<dyn StorageBackend>,
        staged: &Path,
        format: RecordFormat,
        serializer: Arc<dyn Serializer>,
        router: Arc<dyn CategoryRouter>,
        parent: &Span,
    ) -> Result<Self> {
        let writer_id = WriterId::new();
        let scratch = writer_scratch_path(staged, &writer_id.to_string());
        backend.create_dir_all(&scratch)?;

        let span = tracing::debug_span!(parent: parent, "writer", writer = %writer_id);
        debug!(
            target: "pail::dataset",
            parent: &span,
            scratch = %scratch.display(),
            "Record writer opened"
        );

        Ok(RecordWriter {
            backend,
            staged: staged.to_path_buf(),
            scratch,
            writer_id,
            seq: 0,
            format,
            serializer,
            router,
            keys: Vec::new(),
            span,
        })
    }

    /// Identifier embedded in every key this writer produces
    pub fn writer_id(&self) -> WriterId {
        self.writer_id
    }

    /// Keys written so far, relative to the version root
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn leaf_name(&self, record: &Record) -> String {
        let mut leaf = format!("{}-{:010}", self.writer_id, self.seq);
        if let Some(suffix) = self.router.suffix(record) {
            leaf.push('-');
            leaf.push_str(&Category::encode_segment(&suffix));
        }
        leaf
    }

    /// Route, encode and write one record
    ///
    /// Returns the record's key relative to the version root.
    pub fn write(&mut self, record: &Record) -> Result<String> {
        let bytes = record.encode(self.format, self.serializer.as_ref())?;
        let category = self.router.categorize(record);
        let leaf = self.leaf_name(record);

        let dir = if category.is_empty() {
            self.scratch.clone()
        } else {
            self.scratch.join(category.to_path())
        };
        self.backend.create_dir_all(&dir)?;
        self.backend.write_file(&dir.join(&leaf), &bytes)?;

        let key = if category.is_empty() {
            leaf
        } else {
            format!("{}/{}", category.to_path(), leaf)
        };
        trace!(
            target: "pail::dataset",
            parent: &self.span,
            key = %key,
            len = bytes.len(),
            "Record written"
        );
        self.seq += 1;
        self.keys.push(key.clone());
        Ok(key)
    }

    /// Write every record from an iterator
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut count = 0;
        for record in records {
            self.write(record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Move this task's records into the staged version
    ///
    /// Returns the number of records promoted.
    ///
    /// # Errors
    ///
    /// `Error::Corruption` if a key already exists in the staged version,
    /// which means two writers shared an id.
    pub fn commit(self) -> Result<usize> {
        for key in &self.keys {
            let from = self.scratch.join(key);
            let to = self.staged.join(key);
            if let Some(parent) = to.parent() {
                self.backend.create_dir_all(parent)?;
            }
            match self.backend.rename(&from, &to) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    return Err(Error::Corruption(format!(
                        "record key {} already exists in {}",
                        key,
                        self.staged.display()
                    )))
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.backend.remove_all(&self.scratch)?;

        debug!(
            target: "pail::dataset",
            parent: &self.span,
            records = self.keys.len(),
            "Record writer committed"
        );
        Ok(self.keys.len())
    }

    /// Discard everything this task wrote
    pub fn abort(self) -> Result<()> {
        self.backend.remove_all(&self.scratch)?;
        debug!(
            target: "pail::dataset",
            parent: &self.span,
            discarded = self.keys.len(),
            "Record writer aborted"
        );
        Ok(())
    }
}
