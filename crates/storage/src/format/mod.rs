//! On-disk naming and byte formats
//!
//! - `layout`: directory names for committed and staged versions, scratch
//!   and transient artifact names
//! - `manifest`: the dataset MANIFEST written at the store root

pub mod layout;
pub mod manifest;

pub use layout::{
    parse_staged_name, parse_version_name, staged_dir_name, staged_path, version_dir_name,
    version_path, writer_scratch_path, MANIFEST_FILE, SCRATCH_DIR, STAGED_PREFIX, STAGED_SUFFIX,
    TRANSIENT_ARTIFACTS,
};
pub use manifest::{DatasetManifest, ManifestError, MANIFEST_FORMAT_VERSION, MANIFEST_MAGIC};
