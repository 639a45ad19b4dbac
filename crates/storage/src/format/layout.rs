//! Store directory layout
//!
//! ```text
//! <root>/
//!   MANIFEST                  dataset settings (see `manifest`)
//!   <id>/                     committed version, canonical decimal name
//!     <category>/<key>        record blobs
//!   .<id>.tmp/                staged version
//!     _temporary/<writer>/    per-writer scratch, promoted on writer commit
//! ```
//!
//! Committed names are exactly the canonical decimal rendering of the
//! identifier. Staged names start with `.`, so they can never parse as a
//! committed identifier and are hidden from record listings.

use pail_core::VersionId;
use std::path::{Path, PathBuf};

/// Prefix of staged version directory names
pub const STAGED_PREFIX: &str = ".";

/// Suffix of staged version directory names
pub const STAGED_SUFFIX: &str = ".tmp";

/// Scratch directory inside a staged version holding per-writer output
pub const SCRATCH_DIR: &str = "_temporary";

/// Artifacts the write phase may leave in a version; removed after commit
pub const TRANSIENT_ARTIFACTS: &[&str] = &[SCRATCH_DIR, "_temporary2", "_logs"];

/// Dataset manifest file name at the store root
pub const MANIFEST_FILE: &str = "MANIFEST";

/// Directory name of a committed version
pub fn version_dir_name(id: VersionId) -> String {
    id.to_string()
}

/// Directory name of a staged version
pub fn staged_dir_name(id: VersionId) -> String {
    format!("{}{}{}", STAGED_PREFIX, id, STAGED_SUFFIX)
}

/// Path of a committed version
pub fn version_path(root: &Path, id: VersionId) -> PathBuf {
    root.join(version_dir_name(id))
}

/// Path of a staged version
pub fn staged_path(root: &Path, id: VersionId) -> PathBuf {
    root.join(staged_dir_name(id))
}

/// Parse a committed version directory name
///
/// Returns None for anything that is not a canonical decimal identifier.
pub fn parse_version_name(name: &str) -> Option<VersionId> {
    VersionId::parse_canonical(name)
}

/// Parse a staged version directory name
pub fn parse_staged_name(name: &str) -> Option<VersionId> {
    let inner = name
        .strip_prefix(STAGED_PREFIX)?
        .strip_suffix(STAGED_SUFFIX)?;
    VersionId::parse_canonical(inner)
}

/// Scratch directory of one writer inside a staged version
pub fn writer_scratch_path(staged: &Path, writer: &str) -> PathBuf {
    staged.join(SCRATCH_DIR).join(writer)
}
