//! Retention policies for committed versions
//!
//! A store accumulates one committed version per successful job. Cleanup
//! applies a [`RetentionPolicy`] to decide which old versions to delete.
//! Staged versions are never subject to retention.

mod policy;

pub use policy::{RetentionPolicy, RetentionPolicyError};
