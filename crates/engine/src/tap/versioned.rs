//! Tap over a versioned partitioned dataset
//!
//! As a source it reads one committed version (explicit or latest),
//! optionally restricted to attribute paths. As a sink it stages a fresh
//! version per job, hands out per-task writers, and on completion commits
//! or rolls back the staged version exactly once.

use super::{JobOutcome, RecordStream, Sink, Source, Tap, TaskWriter};
use crate::dataset::PartitionedDataset;
use crate::filter::AttributeFilter;
use crate::options::TapMode;
use pail_core::{Error, Result, VersionId};
use pail_storage::{RetentionPolicy, StagedVersion, VersionStore};
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tracing::{debug, info, warn, Span};

/// Source or sink over a [`PartitionedDataset`]
pub struct VersionedTap {
    dataset: PartitionedDataset,
    mode: TapMode,
    version: Option<VersionId>,
    filter: AttributeFilter,
    pending: Mutex<Option<StagedVersion>>,
    span: Span,
}

impl VersionedTap {
    /// Tap reading `version`, or the most recent version for `None`
    pub fn source(dataset: PartitionedDataset, version: Option<VersionId>) -> Result<Self> {
        Self::new(dataset, TapMode::Source, version)
    }

    /// Tap writing a new version per job
    ///
    /// # Errors
    ///
    /// `Error::InvalidUsage` if the dataset options declare attributes.
    pub fn sink(dataset: PartitionedDataset) -> Result<Self> {
        Self::new(dataset, TapMode::Sink, None)
    }

    fn new(dataset: PartitionedDataset, mode: TapMode, version: Option<VersionId>) -> Result<Self> {
        dataset.options().validate_for(mode)?;
        let filter = dataset.options().filter();
        let span = tracing::info_span!(parent: dataset.span(), "tap", %mode);
        let tap = VersionedTap {
            dataset,
            mode,
            version,
            filter,
            pending: Mutex::new(None),
            span,
        };
        debug!(target: "pail::tap", parent: &tap.span, id = %tap.identifier(), "Tap created");
        Ok(tap)
    }

    /// Dataset behind the tap
    pub fn dataset(&self) -> &PartitionedDataset {
        &self.dataset
    }

    fn store(&self) -> &VersionStore {
        self.dataset.store()
    }

    /// Requested version (None = latest); always None for sinks
    pub fn version(&self) -> Option<VersionId> {
        self.version
    }

    /// Attribute paths reads are restricted to
    pub fn filter(&self) -> &AttributeFilter {
        &self.filter
    }

    /// Staged version of the running job, if any
    pub fn pending(&self) -> Option<StagedVersion> {
        self.pending.lock().clone()
    }

    fn require_sink(&self, op: &str) -> Result<()> {
        if self.mode != TapMode::Sink {
            return Err(Error::invalid_usage(format!(
                "{} on source tap {}",
                op,
                self.identifier()
            )));
        }
        Ok(())
    }

    fn staged(&self) -> Result<StagedVersion> {
        let mut pending = self.pending.lock();
        if let Some(staged) = pending.as_ref() {
            return Ok(staged.clone());
        }
        let staged = self.store().create_version()?;
        info!(
            target: "pail::tap",
            parent: &self.span,
            staged = %staged,
            "Job output staged"
        );
        *pending = Some(staged.clone());
        Ok(staged)
    }

    fn apply_retention(&self) {
        let policy = &self.store().config().retention;
        if *policy == RetentionPolicy::KeepAll {
            return;
        }
        if let Err(e) = self.store().cleanup(policy) {
            warn!(
                target: "pail::tap",
                parent: &self.span,
                error = %e,
                "Retention cleanup after commit failed"
            );
        }
    }
}

impl Tap for VersionedTap {
    fn identifier(&self) -> String {
        let root = self.store().root().display();
        match self.mode {
            TapMode::Sink => format!("versioned:{}", root),
            TapMode::Source => match self.version {
                Some(version) => format!("versioned:{}:{}", root, version),
                None => format!("versioned:{}:LATEST", root),
            },
        }
    }

    fn mode(&self) -> TapMode {
        self.mode
    }

    /// True if the store has at least one committed version
    ///
    /// Attribute paths are not checked; a missing one reads as empty.
    fn resource_exists(&self) -> Result<bool> {
        Ok(self.store().most_recent_version()?.is_some())
    }

    /// Identifier of the version a source reads
    ///
    /// Sinks report the current time.
    fn modified_time(&self) -> Result<u64> {
        match self.mode {
            TapMode::Source => {
                let (id, _) = self.store().resolve(self.version)?;
                Ok(id.as_u64())
            }
            TapMode::Sink => Ok(VersionId::now().as_u64()),
        }
    }
}

impl Source for VersionedTap {
    fn prepare_read(&self) -> Result<RecordStream> {
        if self.mode != TapMode::Source {
            return Err(Error::invalid_usage(format!(
                "read from sink tap {}",
                self.identifier()
            )));
        }
        let reader = self.dataset.open_for_read(self.version, Some(&self.filter))?;
        Ok(Box::new(reader))
    }
}

impl Sink for VersionedTap {
    fn prepare_write(&self) -> Result<Option<PathBuf>> {
        self.require_sink("prepare_write")?;
        Ok(Some(self.staged()?.path().to_path_buf()))
    }

    fn open_writer(&self) -> Result<Box<dyn TaskWriter>> {
        self.require_sink("open_writer")?;
        let staged = self.staged()?;
        Ok(Box::new(self.dataset.open_for_write(&staged)?))
    }

    fn complete(&self, outcome: JobOutcome) -> Result<()> {
        if self.mode != TapMode::Sink {
            return Ok(());
        }
        let mut pending = self.pending.lock();
        let Some(staged) = pending.as_ref() else {
            debug!(
                target: "pail::tap",
                parent: &self.span,
                %outcome,
                "No pending output, completion ignored"
            );
            return Ok(());
        };

        if outcome.is_success() {
            // On a commit error the staged version stays pending so a
            // later Failed completion can still discard it.
            let id = self.store().succeed_version(staged)?;
            *pending = None;
            drop(pending);
            info!(target: "pail::tap", parent: &self.span, version = %id, "Job output committed");
            self.apply_retention();
        } else {
            self.store().fail_version(staged)?;
            info!(target: "pail::tap", parent: &self.span, %outcome, "Job output rolled back");
            *pending = None;
        }
        Ok(())
    }
}

impl fmt::Debug for VersionedTap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedTap")
            .field("id", &self.identifier())
            .field("filter", &self.filter)
            .field("pending", &self.pending.lock())
            .finish()
    }
}

/// Taps are equal when root, mode and attribute set are equal
impl PartialEq for VersionedTap {
    fn eq(&self, other: &Self) -> bool {
        self.store().root() == other.store().root()
            && self.mode == other.mode
            && self.filter == other.filter
    }
}

impl Eq for VersionedTap {}

/// Hashes root and mode only, so equal taps always hash alike
impl Hash for VersionedTap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store().root().hash(state);
        self.mode.hash(state);
    }
}
