//! Append-only versioned store
//!
//! A store is a root directory of immutable versions. Writers allocate a
//! staged directory, fill it, and publish it with a single rename; readers
//! only ever see committed directories. See `format::layout` for names.
//!
//! # Lifecycle
//!
//! ```text
//! create_version() -> .<id>.tmp/ --succeed_version()--> <id>/
//!                                \--fail_version()----> (deleted)
//! ```
//!
//! The store keeps no in-memory state about versions. Every query lists
//! the root, so several processes may share a store and a crashed writer's
//! staged directory never blocks identifier allocation.

use crate::backend::{LocalBackend, StorageBackend};
use crate::config::StoreConfig;
use crate::format::layout::{
    parse_staged_name, parse_version_name, staged_path, version_path, STAGED_PREFIX,
    TRANSIENT_ARTIFACTS,
};
use crate::retention::RetentionPolicy;
use pail_core::{Error, Result, VersionId};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Span};

/// Upper bound on retry-with-increment while allocating a staged name
const MAX_ALLOCATION_ATTEMPTS: usize = 1024;

/// A version under construction
///
/// Returned by [`VersionStore::create_version`]; pass it back to
/// [`VersionStore::succeed_version`] or [`VersionStore::fail_version`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagedVersion {
    id: VersionId,
    path: PathBuf,
}

impl StagedVersion {
    /// Recover a staged version from its directory path
    ///
    /// Returns None if the last component is not a staged name.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let id = parse_staged_name(path.file_name()?.to_str()?)?;
        Some(StagedVersion { id, path })
    }

    /// Identifier the version will be committed under
    pub fn id(&self) -> VersionId {
        self.id
    }

    /// Staged directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for StagedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Directory-based store of immutable versions
#[derive(Clone)]
pub struct VersionStore {
    root: PathBuf,
    backend: Arc<dyn StorageBackend>,
    config: StoreConfig,
    span: Span,
}

impl fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionStore")
            .field("root", &self.root)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}

impl VersionStore {
    /// Open a store with the default configuration
    ///
    /// The root is not created until the first version is staged.
    pub fn open(root: impl Into<PathBuf>, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        Self::with_config(root, backend, StoreConfig::default())
    }

    /// Open a store on the local filesystem
    pub fn local(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open(root, Arc::new(LocalBackend::durable()))
    }

    /// Open a store with an explicit configuration
    pub fn with_config(
        root: impl Into<PathBuf>,
        backend: Arc<dyn StorageBackend>,
        config: StoreConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(VersionStore {
            root: root.into(),
            backend,
            config,
            span: Span::none(),
        })
    }

    /// Attach the span all store events are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Underlying storage backend
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Span store events are recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// List committed and staged identifiers (both unsorted)
    fn scan(&self) -> Result<(Vec<VersionId>, Vec<VersionId>)> {
        let entries = match self.backend.list_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), Vec::new())),
            Err(e) => return Err(e.into()),
        };

        let mut committed = Vec::new();
        let mut staged = Vec::new();
        for entry in entries.into_iter().filter(|e| e.is_dir) {
            if let Some(id) = parse_version_name(&entry.name) {
                committed.push(id);
            } else if let Some(id) = parse_staged_name(&entry.name) {
                staged.push(id);
            }
        }
        Ok((committed, staged))
    }

    /// All committed versions, ascending
    pub fn all_versions(&self) -> Result<Vec<VersionId>> {
        let (mut committed, _) = self.scan()?;
        committed.sort_unstable();
        Ok(committed)
    }

    /// Committed version with the maximum identifier
    ///
    /// Staged directories are ignored.
    pub fn most_recent_version(&self) -> Result<Option<VersionId>> {
        let (committed, _) = self.scan()?;
        Ok(committed.into_iter().max())
    }

    /// True if `id` is committed
    pub fn has_version(&self, id: VersionId) -> Result<bool> {
        Ok(self.backend.is_dir(&version_path(&self.root, id))?)
    }

    /// Directory of a committed version
    ///
    /// # Errors
    ///
    /// `Error::VersionNotFound` if `id` was never committed.
    pub fn version_path(&self, id: VersionId) -> Result<PathBuf> {
        if !self.has_version(id)? {
            return Err(Error::VersionNotFound {
                root: self.root.clone(),
                version: id,
            });
        }
        Ok(version_path(&self.root, id))
    }

    /// Directory of the most recent committed version
    ///
    /// # Errors
    ///
    /// `Error::EmptyStore` if nothing has been committed.
    pub fn most_recent_version_path(&self) -> Result<PathBuf> {
        self.resolve(None).map(|(_, path)| path)
    }

    /// Resolve an explicit version, or the most recent one for `None`
    pub fn resolve(&self, version: Option<VersionId>) -> Result<(VersionId, PathBuf)> {
        let id = match version {
            Some(id) => id,
            None => self.most_recent_version()?.ok_or_else(|| Error::EmptyStore {
                root: self.root.clone(),
            })?,
        };
        Ok((id, self.version_path(id)?))
    }

    /// Allocate a new staged version
    ///
    /// The identifier is the current time in milliseconds, raised above
    /// every committed and staged identifier found in the root. If another
    /// writer claims the same name first, the identifier is incremented and
    /// allocation retried.
    pub fn create_version(&self) -> Result<StagedVersion> {
        self.backend.create_dir_all(&self.root)?;

        let (committed, staged) = self.scan()?;
        let floor = committed
            .iter()
            .chain(staged.iter())
            .max()
            .map(|id| id.next())
            .unwrap_or(VersionId::new(0));
        let mut candidate = VersionId::now().max(floor);

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            match self.try_stage(candidate)? {
                Some(staged) => {
                    info!(
                        target: "pail::store",
                        parent: &self.span,
                        version = %staged.id,
                        path = %staged.path.display(),
                        "Staged version created"
                    );
                    return Ok(staged);
                }
                None => {
                    debug!(
                        target: "pail::store",
                        parent: &self.span,
                        version = %candidate,
                        "Version identifier taken, retrying with next"
                    );
                    candidate = candidate.next();
                }
            }
        }

        Err(Error::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "could not allocate a version identifier in {} after {} attempts",
                self.root.display(),
                MAX_ALLOCATION_ATTEMPTS
            ),
        )))
    }

    /// Stage a caller-chosen identifier
    ///
    /// # Errors
    ///
    /// `Error::InvalidUsage` if `id` is not greater than every committed and
    /// staged identifier in the store.
    pub fn create_version_with(&self, id: VersionId) -> Result<StagedVersion> {
        self.backend.create_dir_all(&self.root)?;

        let (committed, staged) = self.scan()?;
        if let Some(max) = committed.iter().chain(staged.iter()).max() {
            if id <= *max {
                return Err(Error::invalid_usage(format!(
                    "version {} is not greater than existing version {} in {}",
                    id,
                    max,
                    self.root.display()
                )));
            }
        }

        let staged = self.try_stage(id)?.ok_or_else(|| {
            Error::invalid_usage(format!(
                "version {} was claimed concurrently in {}",
                id,
                self.root.display()
            ))
        })?;
        info!(
            target: "pail::store",
            parent: &self.span,
            version = %staged.id,
            "Staged version created with explicit identifier"
        );
        Ok(staged)
    }

    /// Claim the staged name for `id`; None if it is taken
    fn try_stage(&self, id: VersionId) -> Result<Option<StagedVersion>> {
        let path = staged_path(&self.root, id);
        match self.backend.create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        // A concurrent job may have committed this identifier between the
        // scan and the claim.
        if self.has_version(id)? {
            self.backend.remove_all(&path)?;
            return Ok(None);
        }
        Ok(Some(StagedVersion { id, path }))
    }

    /// Publish a staged version
    ///
    /// A single rename moves the staged directory to its committed name.
    /// Transient artifacts left in the version by the write phase are then
    /// removed; failures there are logged and do not fail the commit.
    ///
    /// # Errors
    ///
    /// `Error::Commit` if the staged directory is missing, the committed
    /// name already exists, or the rename fails. Never retried; the staged
    /// directory is left in place for `fail_version`.
    pub fn succeed_version(&self, staged: &StagedVersion) -> Result<VersionId> {
        let dest = version_path(&self.root, staged.id);

        if !self.backend.exists(&staged.path)? {
            return Err(Error::commit(&staged.path, "staged version does not exist"));
        }
        if self.backend.exists(&dest)? {
            return Err(Error::commit(
                &staged.path,
                format!("version {} already exists at {}", staged.id, dest.display()),
            ));
        }
        self.backend.rename(&staged.path, &dest).map_err(|e| {
            Error::commit(
                &staged.path,
                format!("rename to {} failed: {}", dest.display(), e),
            )
        })?;

        if self.config.sync_on_commit {
            if let Err(e) = self.backend.sync_dir(&self.root) {
                warn!(
                    target: "pail::store",
                    parent: &self.span,
                    version = %staged.id,
                    error = %e,
                    "Failed to sync store root after commit"
                );
            }
        }

        self.remove_transient_artifacts(staged.id, &dest);

        info!(
            target: "pail::store",
            parent: &self.span,
            version = %staged.id,
            path = %dest.display(),
            "Version committed"
        );
        Ok(staged.id)
    }

    fn remove_transient_artifacts(&self, id: VersionId, dest: &Path) {
        for name in TRANSIENT_ARTIFACTS {
            let artifact = dest.join(name);
            match self.backend.remove_all(&artifact) {
                Ok(true) => debug!(
                    target: "pail::store",
                    parent: &self.span,
                    version = %id,
                    artifact = %name,
                    "Removed transient artifact"
                ),
                Ok(false) => {}
                Err(e) => warn!(
                    target: "pail::store",
                    parent: &self.span,
                    version = %id,
                    artifact = %name,
                    error = %e,
                    "Failed to remove transient artifact, continuing"
                ),
            }
        }
    }

    /// Discard a staged version
    ///
    /// Idempotent: discarding an already-deleted version is a no-op.
    pub fn fail_version(&self, staged: &StagedVersion) -> Result<()> {
        if self.backend.remove_all(&staged.path)? {
            info!(
                target: "pail::store",
                parent: &self.span,
                version = %staged.id,
                "Staged version rolled back"
            );
        } else {
            debug!(
                target: "pail::store",
                parent: &self.span,
                version = %staged.id,
                "Staged version already gone"
            );
        }
        Ok(())
    }

    /// Delete a committed version
    ///
    /// Returns false if it did not exist.
    pub fn delete_version(&self, id: VersionId) -> Result<bool> {
        let removed = self.backend.remove_all(&version_path(&self.root, id))?;
        if removed {
            info!(target: "pail::store", parent: &self.span, version = %id, "Version deleted");
        }
        Ok(removed)
    }

    /// Prune committed versions according to `policy`
    ///
    /// Staged versions are never touched. The most recent version is
    /// always kept. A version that fails to delete is logged and skipped.
    /// Returns the identifiers actually deleted.
    pub fn cleanup(&self, policy: &RetentionPolicy) -> Result<Vec<VersionId>> {
        let versions = self.all_versions()?;
        let now = VersionId::now().as_u64();
        let expired = policy.expired(&versions, now);

        let mut deleted = Vec::with_capacity(expired.len());
        for id in expired {
            match self.delete_version(id) {
                Ok(true) => deleted.push(id),
                Ok(false) => {}
                Err(e) => warn!(
                    target: "pail::store",
                    parent: &self.span,
                    version = %id,
                    error = %e,
                    "Failed to prune version, continuing"
                ),
            }
        }

        info!(
            target: "pail::store",
            parent: &self.span,
            policy = %policy.summary(),
            pruned = deleted.len(),
            kept = versions.len() - deleted.len(),
            "Retention cleanup completed"
        );
        Ok(deleted)
    }

    /// Prune with the policy from the store configuration
    pub fn cleanup_with_config(&self) -> Result<Vec<VersionId>> {
        self.cleanup(&self.config.retention)
    }

    /// Staged versions currently present, ascending
    ///
    /// In a quiescent store these were left behind by crashed jobs.
    pub fn abandoned_staged(&self) -> Result<Vec<StagedVersion>> {
        let (_, mut staged) = self.scan()?;
        staged.sort_unstable();
        Ok(staged
            .into_iter()
            .map(|id| StagedVersion {
                id,
                path: staged_path(&self.root, id),
            })
            .collect())
    }

    /// Remove every staged version
    ///
    /// Only safe when no job is writing to the store.
    pub fn purge_staged(&self) -> Result<usize> {
        let staged = self.abandoned_staged()?;
        for version in &staged {
            self.fail_version(version)?;
        }
        Ok(staged.len())
    }

    /// Delete the store root and everything in it
    pub fn destroy(&self) -> Result<bool> {
        let removed = self.backend.remove_all(&self.root)?;
        if removed {
            warn!(
                target: "pail::store",
                parent: &self.span,
                root = %self.root.display(),
                "Store destroyed"
            );
        }
        Ok(removed)
    }
}

/// True if a root entry name is a staged version
pub fn is_staged_name(name: &str) -> bool {
    name.starts_with(STAGED_PREFIX) && parse_staged_name(name).is_some()
}
