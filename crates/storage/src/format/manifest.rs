//! Dataset MANIFEST file format
//!
//! The MANIFEST records the settings a store was created with, so a later
//! job cannot read or append records with a different encoding or layout.
//! It lives at the store root and is written once.
//!
//! # Format
//!
//! ```text
//! +--------------------+
//! | Magic: "PAIL"      | 4 bytes
//! | Format Version     | 4 bytes (u32 LE)
//! | Serializer ID Len  | 4 bytes (u32 LE)
//! | Serializer ID      | variable
//! | Record Format Len  | 4 bytes (u32 LE)
//! | Record Format      | variable
//! | Router ID Len      | 4 bytes (u32 LE)
//! | Router ID          | variable
//! | CRC32              | 4 bytes
//! +--------------------+
//! ```

use crate::backend::StorageBackend;
use crate::format::layout::MANIFEST_FILE;
use pail_core::Error;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Span;

/// MANIFEST magic bytes: "PAIL" (0x5041494C)
pub const MANIFEST_MAGIC: [u8; 4] = *b"PAIL";

/// Current MANIFEST format version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

// magic + version + three empty length prefixes + crc
const MIN_LEN: usize = 4 + 4 + 3 * 4 + 4;

/// Settings a dataset was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetManifest {
    /// Format version for forward compatibility
    pub format_version: u32,
    /// Serializer identifier (e.g., "msgpack")
    pub serializer_id: String,
    /// Record format name ("structured" or "binary")
    pub record_format: String,
    /// Category router identifier
    pub router_id: String,
}

impl DatasetManifest {
    /// Create a manifest for a fresh store
    pub fn new(
        serializer_id: impl Into<String>,
        record_format: impl Into<String>,
        router_id: impl Into<String>,
    ) -> Self {
        DatasetManifest {
            format_version: MANIFEST_FORMAT_VERSION,
            serializer_id: serializer_id.into(),
            record_format: record_format.into(),
            router_id: router_id.into(),
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MANIFEST_MAGIC);
        bytes.extend_from_slice(&self.format_version.to_le_bytes());
        for field in [&self.serializer_id, &self.record_format, &self.router_id] {
            bytes.extend_from_slice(&(field.len() as u32).to_le_bytes());
            bytes.extend_from_slice(field.as_bytes());
        }
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        if bytes.len() < MIN_LEN {
            return Err(ManifestError::TooShort);
        }
        if bytes[0..4] != MANIFEST_MAGIC {
            return Err(ManifestError::InvalidMagic);
        }

        let (data, crc_bytes) = bytes.split_at(bytes.len() - 4);
        let stored_crc =
            u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        let computed_crc = crc32fast::hash(data);
        if stored_crc != computed_crc {
            return Err(ManifestError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let mut cursor = 4;
        let format_version = read_u32(data, &mut cursor)?;
        if format_version > MANIFEST_FORMAT_VERSION {
            return Err(ManifestError::UnsupportedVersion(format_version));
        }
        let serializer_id = read_string(data, &mut cursor)?;
        let record_format = read_string(data, &mut cursor)?;
        let router_id = read_string(data, &mut cursor)?;

        Ok(DatasetManifest {
            format_version,
            serializer_id,
            record_format,
            router_id,
        })
    }

    /// One-line description used in mismatch errors
    pub fn describe(&self) -> String {
        format!(
            "serializer={} format={} router={}",
            self.serializer_id, self.record_format, self.router_id
        )
    }

    /// True if both manifests describe the same dataset settings
    pub fn same_settings(&self, other: &DatasetManifest) -> bool {
        self.serializer_id == other.serializer_id
            && self.record_format == other.record_format
            && self.router_id == other.router_id
    }

    /// Path of the MANIFEST for a store root
    pub fn path(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE)
    }

    /// Load the MANIFEST of a store, if one was written
    pub fn load(
        backend: &dyn StorageBackend,
        root: &Path,
    ) -> Result<Option<Self>, ManifestError> {
        match backend.read_file(&Self::path(root)) {
            Ok(bytes) => Self::from_bytes(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist atomically unless a MANIFEST already exists
    ///
    /// Writes a uniquely named temp file and renames it into place. Rename
    /// never overwrites, so when two jobs race to create the same store
    /// exactly one manifest wins; the loser's temp file is removed and the
    /// winning manifest is returned instead.
    pub fn persist_new(
        &self,
        backend: &dyn StorageBackend,
        root: &Path,
    ) -> Result<DatasetManifest, ManifestError> {
        let target = Self::path(root);
        let temp = root.join(format!(
            ".{}.{}.tmp",
            MANIFEST_FILE,
            uuid::Uuid::new_v4().simple()
        ));

        backend.write_file(&temp, &self.to_bytes())?;
        match backend.rename(&temp, &target) {
            Ok(()) => {
                backend.sync_dir(root)?;
                Ok(self.clone())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                backend.remove_all(&temp)?;
                Self::load(backend, root)?.ok_or(ManifestError::Missing)
            }
            Err(e) => {
                let _ = backend.remove_all(&temp);
                Err(e.into())
            }
        }
    }

    /// Load the store's MANIFEST, creating it from `self` if absent
    ///
    /// # Errors
    ///
    /// `Error::ManifestMismatch` if the store was created with different
    /// settings.
    pub fn open_or_create(
        &self,
        backend: &dyn StorageBackend,
        root: &Path,
        span: &Span,
    ) -> pail_core::Result<DatasetManifest> {
        let existing = match Self::load(backend, root)? {
            Some(existing) => existing,
            None => {
                let written = self.persist_new(backend, root)?;
                tracing::debug!(
                    target: "pail::manifest",
                    parent: span,
                    root = %root.display(),
                    settings = %written.describe(),
                    "Dataset manifest written"
                );
                written
            }
        };

        if !existing.same_settings(self) {
            return Err(Error::ManifestMismatch {
                expected: existing.describe(),
                actual: self.describe(),
            });
        }
        Ok(existing)
    }
}

fn read_u32(data: &[u8], cursor: &mut usize) -> Result<u32, ManifestError> {
    let end = *cursor + 4;
    let raw = data.get(*cursor..end).ok_or(ManifestError::TooShort)?;
    *cursor = end;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn read_string(data: &[u8], cursor: &mut usize) -> Result<String, ManifestError> {
    let len = read_u32(data, cursor)? as usize;
    let end = cursor.checked_add(len).ok_or(ManifestError::TooShort)?;
    let raw = data.get(*cursor..end).ok_or(ManifestError::TooShort)?;
    *cursor = end;
    String::from_utf8(raw.to_vec()).map_err(|_| ManifestError::InvalidString)
}

/// Errors that can occur with MANIFEST operations
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// MANIFEST file too short
    #[error("MANIFEST too short")]
    TooShort,

    /// Invalid magic bytes
    #[error("Invalid magic bytes")]
    InvalidMagic,

    /// A text field is not valid UTF-8
    #[error("Invalid string field")]
    InvalidString,

    /// Written by a newer format
    #[error("Unsupported MANIFEST format version {0}")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Expected CRC32 value (from file)
        expected: u32,
        /// Computed CRC32 value
        computed: u32,
    },

    /// MANIFEST vanished between a lost creation race and the reload
    #[error("MANIFEST missing after concurrent creation")]
    Missing,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ManifestError> for Error {
    fn from(e: ManifestError) -> Self {
        match e {
            ManifestError::Io(io) => Error::Io(io),
            other => Error::Corruption(other.to_string()),
        }
    }
}
