//! Dataflow adapter
//!
//! The narrow interface an external batch engine drives. A job registers a
//! tap as a [`Source`] or a [`Sink`]; for sinks it calls
//! [`Sink::prepare_write`] once, opens one [`TaskWriter`] per parallel
//! task, and after every task has finished calls [`Sink::complete`] with
//! the job's terminal [`JobOutcome`].
//!
//! - [`VersionedTap`]: reads and writes versions of a partitioned dataset
//! - [`NullTap`]: discards everything written to it

mod null;
mod versioned;

pub use null::NullTap;
pub use versioned::VersionedTap;

use crate::dataset::RecordWriter;
use crate::options::TapMode;
use crate::record::{Record, StoredRecord};
use pail_core::Result;
use std::fmt;
use std::path::PathBuf;

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobOutcome {
    /// Every task finished successfully
    Succeeded,
    /// At least one task failed
    Failed,
    /// The job was cancelled
    Aborted,
}

impl JobOutcome {
    /// True only for `Succeeded`
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Succeeded => f.write_str("succeeded"),
            JobOutcome::Failed => f.write_str("failed"),
            JobOutcome::Aborted => f.write_str("aborted"),
        }
    }
}

/// Records yielded by a source
pub type RecordStream = Box<dyn Iterator<Item = Result<StoredRecord>> + Send>;

/// Writer used by one task of a job
pub trait TaskWriter: Send {
    /// Write one record
    fn write(&mut self, record: &Record) -> Result<()>;

    /// Task finished; make its records part of the job output
    fn commit(self: Box<Self>) -> Result<usize>;

    /// Task failed; discard its records
    fn abort(self: Box<Self>) -> Result<()>;
}

impl TaskWriter for RecordWriter {
    fn write(&mut self, record: &Record) -> Result<()> {
        RecordWriter::write(self, record).map(|_| ())
    }

    fn commit(self: Box<Self>) -> Result<usize> {
        RecordWriter::commit(*self)
    }

    fn abort(self: Box<Self>) -> Result<()> {
        RecordWriter::abort(*self)
    }
}

/// Common tap surface
pub trait Tap: Send + Sync + fmt::Debug {
    /// Stable identifier for logging and equality
    fn identifier(&self) -> String;

    /// Whether the tap reads or writes
    fn mode(&self) -> TapMode;

    /// Whether the resource behind the tap exists
    fn resource_exists(&self) -> Result<bool>;

    /// Modification time in milliseconds
    fn modified_time(&self) -> Result<u64>;
}

/// A tap a job reads from
pub trait Source: Tap {
    /// Open the records the job should read
    fn prepare_read(&self) -> Result<RecordStream>;
}

/// A tap a job writes to
pub trait Sink: Tap {
    /// Allocate the job's output; returns the staged directory, if any
    ///
    /// Calling it again before `complete` returns the same output.
    fn prepare_write(&self) -> Result<Option<PathBuf>>;

    /// Open a writer for one task
    fn open_writer(&self) -> Result<Box<dyn TaskWriter>>;

    /// Publish or discard the job's output
    ///
    /// Called once after every task has finished. Repeated calls are
    /// no-ops.
    fn complete(&self, outcome: JobOutcome) -> Result<()>;
}
