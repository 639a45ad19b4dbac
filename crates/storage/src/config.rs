//! Version store configuration
//!
//! Controls retention and durability of commits.

use crate::retention::{RetentionPolicy, RetentionPolicyError};

/// Version store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Policy applied by `VersionStore::cleanup_with_config` (default: KeepAll)
    pub retention: RetentionPolicy,
    /// Sync the store root after the commit rename (default: true)
    pub sync_on_commit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            retention: RetentionPolicy::KeepAll,
            sync_on_commit: true,
        }
    }
}

impl StoreConfig {
    /// Create config for testing
    ///
    /// Skips directory syncs.
    pub fn for_testing() -> Self {
        StoreConfig {
            sync_on_commit: false,
            ..Default::default()
        }
    }

    /// Set retention policy
    pub fn with_retention(mut self, policy: RetentionPolicy) -> Self {
        self.retention = policy;
        self
    }

    /// Set whether commits sync the store root
    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), StoreConfigError> {
        self.retention.validate()?;
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum StoreConfigError {
    /// Invalid retention policy
    #[error("Invalid retention policy: {0}")]
    InvalidRetention(#[from] RetentionPolicyError),
}

impl From<StoreConfigError> for pail_core::Error {
    fn from(e: StoreConfigError) -> Self {
        pail_core::Error::Config(e.to_string())
    }
}
