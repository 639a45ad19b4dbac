//! Retention policy types
//!
//! Controls how many committed versions a store keeps when it is cleaned.
//!
//! # Policy Types
//!
//! - **KeepAll**: Keep every version (default, safest)
//! - **KeepLast(n)**: Keep only the newest N versions
//! - **KeepFor(duration)**: Keep versions whose identifier (a millisecond
//!   timestamp) is within the duration of now
//!
//! Whatever the policy, the most recent committed version is never
//! selected for removal, so a cleaned store can always be read.
//!
//! # Example
//!
//! ```ignore
//! use pail_storage::retention::RetentionPolicy;
//! use std::time::Duration;
//!
//! let policy = RetentionPolicy::keep_last(10);
//! let policy = RetentionPolicy::keep_for(Duration::from_secs(7 * 24 * 3600));
//! ```

use pail_core::VersionId;
use std::time::Duration;

/// Retention policy for a version store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep all versions forever (default)
    #[default]
    KeepAll,

    /// Keep only the newest N versions
    ///
    /// N must be at least 1.
    KeepLast(usize),

    /// Keep versions newer than `now - duration`
    ///
    /// Duration must be non-zero.
    KeepFor(Duration),
}

impl RetentionPolicy {
    /// Create a KeepAll policy
    pub fn keep_all() -> Self {
        RetentionPolicy::KeepAll
    }

    /// Create a KeepLast policy
    ///
    /// # Panics
    ///
    /// Panics if n is 0.
    pub fn keep_last(n: usize) -> Self {
        assert!(n > 0, "KeepLast(n) requires n > 0");
        RetentionPolicy::KeepLast(n)
    }

    /// Create a KeepFor policy
    ///
    /// # Panics
    ///
    /// Panics if duration is zero.
    pub fn keep_for(duration: Duration) -> Self {
        assert!(!duration.is_zero(), "KeepFor requires non-zero duration");
        RetentionPolicy::KeepFor(duration)
    }

    /// Check a policy built without the constructors
    pub fn validate(&self) -> Result<(), RetentionPolicyError> {
        match self {
            RetentionPolicy::KeepLast(0) => Err(RetentionPolicyError::InvalidValue(
                "KeepLast(0) is invalid".to_string(),
            )),
            RetentionPolicy::KeepFor(d) if d.is_zero() => Err(
                RetentionPolicyError::InvalidValue("KeepFor(0) is invalid".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Select the versions this policy allows to be removed
    ///
    /// `versions` may be in any order. `now_ms` is the current time in
    /// milliseconds. The result is sorted ascending and never contains the
    /// maximum identifier.
    pub fn expired(&self, versions: &[VersionId], now_ms: u64) -> Vec<VersionId> {
        let mut sorted = versions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let Some(newest) = sorted.pop() else {
            return Vec::new();
        };

        match self {
            RetentionPolicy::KeepAll => Vec::new(),
            RetentionPolicy::KeepLast(n) => {
                // `newest` already popped counts as one kept version
                let keep_older = n.saturating_sub(1);
                let cut = sorted.len().saturating_sub(keep_older);
                sorted.truncate(cut);
                sorted
            }
            RetentionPolicy::KeepFor(duration) => {
                let window = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                let cutoff = now_ms.saturating_sub(window);
                sorted
                    .into_iter()
                    .filter(|v| v.as_u64() < cutoff && *v != newest)
                    .collect()
            }
        }
    }

    /// Get a human-readable summary of the policy
    pub fn summary(&self) -> String {
        match self {
            RetentionPolicy::KeepAll => "KeepAll".to_string(),
            RetentionPolicy::KeepLast(n) => format!("KeepLast({})", n),
            RetentionPolicy::KeepFor(d) => format!("KeepFor({:?})", d),
        }
    }
}

/// Retention policy errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetentionPolicyError {
    /// Invalid policy value
    #[error("Invalid retention policy: {0}")]
    InvalidValue(String),
}
