//! Record serializer abstraction.
//!
//! Structured record values pass through a [`Serializer`] on their way to
//! and from storage. The serializer is chosen by identifier when a dataset
//! is opened and recorded in the store MANIFEST.
//!
//! # Usage
//!
//! ```ignore
//! use pail_storage::codec::{get_serializer, Serializer};
//!
//! let s = get_serializer("msgpack")?;
//! let bytes = s.encode(&value)?;
//! assert_eq!(s.decode(&bytes)?, value);
//! ```

mod json;
mod msgpack;
mod traits;

pub use json::{JsonSerializer, JSON_ID};
pub use msgpack::{MsgpackSerializer, MSGPACK_ID};
pub use traits::{CodecError, Serializer};

use std::sync::Arc;

/// Identifier of the serializer used when none is configured
pub const DEFAULT_SERIALIZER_ID: &str = MSGPACK_ID;

/// Get a serializer by its identifier.
///
/// # Known Serializers
///
/// - `"msgpack"`: MessagePack (default)
/// - `"json"`: JSON
pub fn get_serializer(serializer_id: &str) -> Result<Arc<dyn Serializer>, CodecError> {
    match serializer_id {
        MSGPACK_ID => Ok(Arc::new(MsgpackSerializer)),
        JSON_ID => Ok(Arc::new(JsonSerializer)),
        _ => Err(CodecError::UnknownCodec(serializer_id.to_string())),
    }
}
