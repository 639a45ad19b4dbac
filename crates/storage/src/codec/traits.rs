//! Serializer trait definitions.

use pail_core::{Error, Value};
use std::fmt;

/// Record serializer trait.
///
/// Converts a structured [`Value`] to the bytes stored for a record and
/// back. Every implementation must satisfy the round-trip law
/// `decode(encode(v)) == v` for every value it can encode.
///
/// Raw byte records never reach a serializer: the dataset writes them
/// verbatim, so there is no pass-through implementation here.
///
/// # Thread Safety
///
/// Serializers must be `Send + Sync`; one instance is shared by every
/// writer task of a dataset.
///
/// # Identity
///
/// Each serializer has a unique identifier that is stored in the dataset
/// MANIFEST, so a store is never read back with a different encoding than
/// it was written with.
pub trait Serializer: Send + Sync + fmt::Debug {
    /// Encode a value for storage.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes read from storage.
    ///
    /// Returns an error if the bytes are not a valid encoding (corruption,
    /// or data written by another serializer).
    fn decode(&self, data: &[u8]) -> Result<Value, CodecError>;

    /// Unique serializer identifier.
    fn serializer_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value cannot be represented by this serializer.
    #[error("Encode error (codec={codec_id}): {detail}")]
    EncodeError {
        /// Human-readable error description
        detail: String,
        /// Serializer that attempted the encode
        codec_id: String,
    },

    /// Decoding failed.
    ///
    /// Carries the codec identity and data length so callers can
    /// distinguish a wrong-codec error from data corruption.
    #[error("Decode error (codec={codec_id}, data_len={data_len}): {detail}")]
    DecodeError {
        /// Human-readable error description
        detail: String,
        /// Serializer that attempted the decode
        codec_id: String,
        /// Length of the data that failed to decode
        data_len: usize,
    },

    /// Unknown serializer identifier.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),
}

impl CodecError {
    /// Create an encode error.
    pub fn encode(detail: impl Into<String>, codec_id: impl Into<String>) -> Self {
        CodecError::EncodeError {
            detail: detail.into(),
            codec_id: codec_id.into(),
        }
    }

    /// Create a decode error with full diagnostic context.
    pub fn decode(detail: impl Into<String>, codec_id: impl Into<String>, data_len: usize) -> Self {
        CodecError::DecodeError {
            detail: detail.into(),
            codec_id: codec_id.into(),
            data_len,
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::UnknownCodec(id) => Error::Config(format!("unknown serializer '{}'", id)),
            other => Error::Serialization(other.to_string()),
        }
    }
}
