//! Sink that discards everything

use super::{RecordStream, Sink, Source, Tap, TaskWriter};
use crate::options::TapMode;
use crate::record::Record;
use pail_core::{Error, Result, VersionId};
use std::path::PathBuf;

/// Sink that accepts and discards all records
///
/// Never exists and cannot be read from.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTap;

impl NullTap {
    /// Create a null tap
    pub fn new() -> Self {
        NullTap
    }
}

#[derive(Debug, Default)]
struct DiscardWriter {
    discarded: usize,
}

impl TaskWriter for DiscardWriter {
    fn write(&mut self, _record: &Record) -> Result<()> {
        self.discarded += 1;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<usize> {
        Ok(self.discarded)
    }

    fn abort(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

impl Tap for NullTap {
    fn identifier(&self) -> String {
        "/dev/null".to_string()
    }

    fn mode(&self) -> TapMode {
        TapMode::Sink
    }

    fn resource_exists(&self) -> Result<bool> {
        Ok(false)
    }

    fn modified_time(&self) -> Result<u64> {
        Ok(VersionId::now().as_u64())
    }
}

impl Source for NullTap {
    fn prepare_read(&self) -> Result<RecordStream> {
        Err(Error::invalid_usage("cannot use a null tap as a source"))
    }
}

impl Sink for NullTap {
    fn prepare_write(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn open_writer(&self) -> Result<Box<dyn TaskWriter>> {
        Ok(Box::new(DiscardWriter::default()))
    }

    fn complete(&self, _outcome: super::JobOutcome) -> Result<()> {
        Ok(())
    }
}
