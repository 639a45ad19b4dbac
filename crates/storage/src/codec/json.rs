//! JSON serializer.

use super::traits::{CodecError, Serializer};
use pail_core::Value;

/// Identifier recorded in the MANIFEST for [`JsonSerializer`]
pub const JSON_ID: &str = "json";

/// JSON serializer.
///
/// Human-readable records. Values are written in their tagged form
/// (`{"Int":1}`), so `Int`/`Float` and `Bytes`/`String` stay distinct.
/// Non-finite floats cannot be encoded and are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        if let Some(f) = first_non_finite(value) {
            return Err(CodecError::encode(
                format!("non-finite float {} has no JSON representation", f),
                JSON_ID,
            ));
        }
        serde_json::to_vec(value).map_err(|e| CodecError::encode(e.to_string(), JSON_ID))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(data)
            .map_err(|e| CodecError::decode(e.to_string(), JSON_ID, data.len()))
    }

    fn serializer_id(&self) -> &str {
        JSON_ID
    }
}

/// First NaN or infinite float anywhere inside `value`
fn first_non_finite(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(*f),
        Value::Array(items) => items.iter().find_map(first_non_finite),
        Value::Object(fields) => fields.values().find_map(first_non_finite),
        _ => None,
    }
}
