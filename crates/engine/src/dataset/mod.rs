//! Partitioned dataset
//!
//! Composes a [`VersionStore`] with a serializer and a category router.
//! The dataset encodes, routes and decodes records; every directory
//! lifecycle operation (stage, commit, roll back) stays with the store.
//!
//! # Example
//!
//! ```ignore
//! let dataset = PartitionedDataset::open(store, DatasetOptions::default())?;
//! let staged = dataset.store().create_version()?;
//!
//! let mut writer = dataset.open_for_write(&staged)?;
//! writer.write(&Record::from(value))?;
//! writer.commit()?;
//! dataset.store().succeed_version(&staged)?;
//!
//! for stored in dataset.open_for_read(None, None)? {
//!     let stored = stored?;
//! }
//! ```

mod reader;
mod writer;

pub use reader::RecordReader;
pub use writer::RecordWriter;

use crate::filter::AttributeFilter;
use crate::options::{DatasetOptions, TapMode};
use pail_core::{Result, VersionId};
use pail_storage::{DatasetManifest, Serializer, StagedVersion, VersionStore};
use std::sync::Arc;
use tracing::{debug, Span};

/// Record-level view of a version store
#[derive(Debug, Clone)]
pub struct PartitionedDataset {
    store: VersionStore,
    options: DatasetOptions,
    serializer: Arc<dyn Serializer>,
    span: Span,
}

impl PartitionedDataset {
    /// Open a dataset over `store`
    ///
    /// If the store already has a MANIFEST it must match `options`.
    /// Nothing is created on disk.
    pub fn open(store: VersionStore, options: DatasetOptions) -> Result<Self> {
        let serializer = options.serializer()?;
        let expected = options.manifest();
        if let Some(existing) = DatasetManifest::load(store.backend().as_ref(), store.root())? {
            if !existing.same_settings(&expected) {
                return Err(pail_core::Error::ManifestMismatch {
                    expected: existing.describe(),
                    actual: expected.describe(),
                });
            }
        }

        let span = tracing::debug_span!(
            parent: store.span(),
            "dataset",
            root = %store.root().display(),
            format = %options.format
        );
        Ok(PartitionedDataset {
            store,
            options,
            serializer,
            span,
        })
    }

    /// Underlying version store
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Options the dataset was opened with
    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// Span dataset events are recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Open a writer for one task into a staged version
    ///
    /// Each call returns an independent writer; parallel tasks each open
    /// their own. Writes the store MANIFEST on first use.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUsage` if the options declare attributes, before
    /// anything is written.
    pub fn open_for_write(&self, staged: &StagedVersion) -> Result<RecordWriter> {
        self.options.validate_for(TapMode::Sink)?;
        self.options.manifest().open_or_create(
            self.store.backend().as_ref(),
            self.store.root(),
            &self.span,
        )?;

        RecordWriter::new(
            self.store.backend().clone(),
            staged.path(),
            self.options.format,
            self.serializer.clone(),
            self.options.router.clone(),
            &self.span,
        )
    }

    /// Open a reader over a committed version
    ///
    /// `version = None` reads the most recent version. `filter = None`
    /// uses the attributes from the options. A filter path with no
    /// directory in the version yields no records.
    ///
    /// # Errors
    ///
    /// `Error::EmptyStore` or `Error::VersionNotFound` if the version
    /// cannot be resolved.
    pub fn open_for_read(
        &self,
        version: Option<VersionId>,
        filter: Option<&AttributeFilter>,
    ) -> Result<RecordReader> {
        let (id, path) = self.store.resolve(version)?;
        let filter = match filter {
            Some(filter) => filter.clone(),
            None => self.options.filter(),
        };
        debug!(
            target: "pail::dataset",
            parent: &self.span,
            version = %id,
            filter = %filter,
            "Opening version for read"
        );

        RecordReader::open(
            self.store.backend().clone(),
            id,
            path,
            &filter,
            self.options.format,
            self.serializer.clone(),
            self.span.clone(),
        )
    }
}
