//! Error types for pail
//!
//! One enum covers the whole workspace. Leaf modules (codec, manifest,
//! retention, config) keep narrow error enums of their own and convert into
//! this one at the crate boundary.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::VersionId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pail operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the versioned store and partitioned datasets
#[derive(Debug, Error)]
pub enum Error {
    /// No committed version exists when one was required
    #[error("Store at {root} has no committed version")]
    EmptyStore {
        /// Store root that was scanned
        root: PathBuf,
    },

    /// An explicit version identifier was never committed
    #[error("Version {version} not found in store at {root}")]
    VersionNotFound {
        /// Store root that was scanned
        root: PathBuf,
        /// Requested identifier
        version: VersionId,
    },

    /// Renaming a staged version to its committed name failed
    ///
    /// Fatal for the job. Never retried: a retry could publish a duplicate
    /// or corrupted version.
    #[error("Commit of staged version {staged} failed: {reason}")]
    Commit {
        /// Staged directory that could not be committed
        staged: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Configuration misuse detected before any job work started
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// Encoding or decoding a record failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The store was created with different dataset settings
    #[error("Dataset manifest mismatch: store has {expected}, requested {actual}")]
    ManifestMismatch {
        /// Settings recorded in the store
        expected: String,
        /// Settings the caller asked for
        actual: String,
    },

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// I/O error from the storage backend
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an invalid usage error
    pub fn invalid_usage(msg: impl Into<String>) -> Self {
        Self::InvalidUsage(msg.into())
    }

    /// Create a commit error
    pub fn commit(staged: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Commit {
            staged: staged.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True if a requested version does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VersionNotFound { .. })
    }

    /// True if the store had no committed version
    pub fn is_empty_store(&self) -> bool {
        matches!(self, Self::EmptyStore { .. })
    }

    /// True for errors that must abort the job without retry
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Commit { .. } | Self::Corruption(_))
    }
}
