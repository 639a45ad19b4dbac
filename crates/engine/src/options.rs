//! Dataset options
//!
//! Everything needed to open a dataset over a version store: which
//! serializer encodes records, which router partitions them, and, for
//! reads, which attribute paths to restrict to.

use crate::filter::AttributeFilter;
use crate::record::RecordFormat;
use crate::router::{CategoryRouter, DefaultRouter};
use pail_core::{AttributePath, Error, Result};
use pail_storage::codec::DEFAULT_SERIALIZER_ID;
use pail_storage::{get_serializer, DatasetManifest, Serializer};
use std::fmt;
use std::sync::Arc;

/// Whether a tap reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapMode {
    /// Reads committed versions
    Source,
    /// Stages and commits new versions
    Sink,
}

impl fmt::Display for TapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapMode::Source => f.write_str("source"),
            TapMode::Sink => f.write_str("sink"),
        }
    }
}

/// Options for a partitioned dataset
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Serializer identifier (default: "msgpack")
    pub serializer_id: String,
    /// Record payload kind (default: structured)
    pub format: RecordFormat,
    /// Name of the record field in identifiers and logs (default: "bytes")
    pub field_name: String,
    /// Attribute paths reads are restricted to; sources only
    pub attributes: Option<Vec<AttributePath>>,
    /// Category router (default: no partitioning)
    pub router: Arc<dyn CategoryRouter>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        DatasetOptions {
            serializer_id: DEFAULT_SERIALIZER_ID.to_string(),
            format: RecordFormat::Structured,
            field_name: "bytes".to_string(),
            attributes: None,
            router: Arc::new(DefaultRouter),
        }
    }
}

impl DatasetOptions {
    /// Options for raw byte blobs
    pub fn binary() -> Self {
        DatasetOptions {
            format: RecordFormat::Binary,
            ..Default::default()
        }
    }

    /// Set serializer identifier
    pub fn with_serializer(mut self, serializer_id: impl Into<String>) -> Self {
        self.serializer_id = serializer_id.into();
        self
    }

    /// Set record format
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Set record field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Restrict reads to `attributes`
    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = AttributePath>,
    {
        self.attributes = Some(attributes.into_iter().collect());
        self
    }

    /// Set category router
    pub fn with_router(mut self, router: Arc<dyn CategoryRouter>) -> Self {
        self.router = router;
        self
    }

    /// Attribute filter built from `attributes` (empty when unset)
    pub fn filter(&self) -> AttributeFilter {
        self.attributes
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Resolve the configured serializer
    pub fn serializer(&self) -> Result<Arc<dyn Serializer>> {
        Ok(get_serializer(&self.serializer_id)?)
    }

    /// MANIFEST describing these options
    pub fn manifest(&self) -> DatasetManifest {
        DatasetManifest::new(
            self.serializer_id.clone(),
            self.format.as_str(),
            self.router.router_id(),
        )
    }

    /// Validate options for use in `mode`
    ///
    /// # Errors
    ///
    /// `Error::InvalidUsage` if attributes are declared on a sink;
    /// `Error::Config` if the serializer is unknown.
    pub fn validate_for(&self, mode: TapMode) -> Result<()> {
        if mode == TapMode::Sink && !self.filter().is_empty() {
            return Err(Error::invalid_usage("can't declare attributes in a sink"));
        }
        if self.field_name.is_empty() {
            return Err(Error::Config("field name must not be empty".to_string()));
        }
        self.serializer()?;
        Ok(())
    }
}
