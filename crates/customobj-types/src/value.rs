//! Codec between the raw JSON text users declare and the JSON document
//! stored remotely.
//!
//! Decoding is lenient by default: text that does not parse becomes an empty
//! JSON object instead of an error. [`decode_value_strict`] is available for
//! callers that want malformed input rejected.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::TypeError;

/// The document substituted for malformed input by [`decode_value`].
pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

/// Decode raw JSON text, falling back to an empty object on parse failure.
pub fn decode_value(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "value is not valid JSON, storing an empty object");
            empty_document()
        }
    }
}

/// Decode raw JSON text, rejecting malformed input.
pub fn decode_value_strict(raw: &str) -> Result<Value, TypeError> {
    serde_json::from_str(raw).map_err(|e| TypeError::InvalidValue(e.to_string()))
}

/// Compact JSON text for a stored document.
pub fn encode_value(value: &Value) -> String {
    // Serializing a `Value` cannot fail: all map keys are strings.
    serde_json::to_string(value).unwrap_or_default()
}

/// Returns `true` if two raw texts decode to the same document.
///
/// Whitespace and object key order do not matter.
pub fn values_equivalent(a: &str, b: &str) -> bool {
    decode_value(a) == decode_value(b)
}
