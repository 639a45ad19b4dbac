//! MessagePack serializer (default).

use super::traits::{CodecError, Serializer};
use pail_core::Value;

/// Identifier recorded in the MANIFEST for [`MsgpackSerializer`]
pub const MSGPACK_ID: &str = "msgpack";

/// MessagePack serializer.
///
/// Compact, self-describing and lossless for every [`Value`], including
/// NaN floats and byte strings. This is the default serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackSerializer;

impl Serializer for MsgpackSerializer {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec(value).map_err(|e| CodecError::encode(e.to_string(), MSGPACK_ID))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        rmp_serde::from_slice(data)
            .map_err(|e| CodecError::decode(e.to_string(), MSGPACK_ID, data.len()))
    }

    fn serializer_id(&self) -> &str {
        MSGPACK_ID
    }
}
