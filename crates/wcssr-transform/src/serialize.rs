//! The `serialized:` property envelope.
//!
//! Attribute values that plain JSON cannot carry (`Map`, `Set`, `Symbol`,
//! `Infinity`, `null`, nested collections) are wrapped as
//! `serialized:<base64(json)>`. The JSON is a tagged tree of
//! `{ "type": ..., "value": ... }` nodes that the hydrate module decodes
//! back into live values on the component.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Number, Value};

use crate::value::PropValue;

/// Prefix marking an attribute value as a serialized property.
pub const SERIALIZED_PREFIX: &str = "serialized:";

/// Errors that can occur while decoding a serialized property.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Value is missing the `serialized:` prefix")]
    MissingPrefix,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown serialized type: {0}")]
    UnknownType(String),

    #[error("Malformed serialized value: {0}")]
    Malformed(String),
}

/// Encode a value into its `serialized:` attribute form.
pub fn serialize_property(value: &PropValue) -> String {
    let tree = to_tagged(value);
    format!("{SERIALIZED_PREFIX}{}", STANDARD.encode(tree.to_string()))
}

/// Decode a `serialized:` attribute value.
pub fn deserialize_property(input: &str) -> Result<PropValue, DecodeError> {
    let payload = input
        .strip_prefix(SERIALIZED_PREFIX)
        .ok_or(DecodeError::MissingPrefix)?;
    let bytes = STANDARD.decode(payload.trim())?;
    let tree: Value = serde_json::from_slice(&bytes)?;
    from_tagged(&tree)
}

fn to_tagged(value: &PropValue) -> Value {
    match value {
        PropValue::Undefined => json!({ "type": "undefined" }),
        PropValue::Null => json!({ "type": "null" }),
        PropValue::Bool(b) => json!({ "type": "boolean", "value": b }),
        PropValue::Number(n) => json!({ "type": "number", "value": number_value(*n) }),
        PropValue::String(s) | PropValue::Identifier(s) => json!({ "type": "string", "value": s }),
        PropValue::Array(items) => json!({
            "type": "array",
            "value": items.iter().map(to_tagged).collect::<Vec<_>>(),
        }),
        PropValue::Object(entries) => json!({
            "type": "object",
            "value": entries
                .iter()
                .map(|(k, v)| json!([k, to_tagged(v)]))
                .collect::<Vec<_>>(),
        }),
        PropValue::Map(entries) => json!({
            "type": "map",
            "value": entries
                .iter()
                .map(|(k, v)| json!([to_tagged(k), to_tagged(v)]))
                .collect::<Vec<_>>(),
        }),
        PropValue::Set(items) => json!({
            "type": "set",
            "value": items.iter().map(to_tagged).collect::<Vec<_>>(),
        }),
        PropValue::Symbol(description) => json!({ "type": "symbol", "value": description }),
    }
}

/// Special numbers travel as strings.
fn number_value(n: f64) -> Value {
    if n.is_nan() {
        Value::String("NaN".to_string())
    } else if n == f64::INFINITY {
        Value::String("Infinity".to_string())
    } else if n == f64::NEG_INFINITY {
        Value::String("-Infinity".to_string())
    } else if n == 0.0 && n.is_sign_negative() {
        Value::String("-0".to_string())
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn from_tagged(node: &Value) -> Result<PropValue, DecodeError> {
    let kind = node
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::Malformed(format!("missing type tag in {node}")))?;
    let value = node.get("value");

    match kind {
        "undefined" => Ok(PropValue::Undefined),
        "null" => Ok(PropValue::Null),
        "boolean" => value
            .and_then(Value::as_bool)
            .map(PropValue::Bool)
            .ok_or_else(|| malformed(kind, node)),
        "number" => match value {
            Some(Value::Number(n)) => n
                .as_f64()
                .map(PropValue::Number)
                .ok_or_else(|| malformed(kind, node)),
            Some(Value::String(special)) => match special.as_str() {
                "NaN" => Ok(PropValue::Number(f64::NAN)),
                "Infinity" => Ok(PropValue::Number(f64::INFINITY)),
                "-Infinity" => Ok(PropValue::Number(f64::NEG_INFINITY)),
                "-0" => Ok(PropValue::Number(-0.0)),
                _ => Err(malformed(kind, node)),
            },
            _ => Err(malformed(kind, node)),
        },
        "string" => value
            .and_then(Value::as_str)
            .map(|s| PropValue::String(s.to_string()))
            .ok_or_else(|| malformed(kind, node)),
        "symbol" => Ok(PropValue::Symbol(
            value.and_then(Value::as_str).unwrap_or_default().to_string(),
        )),
        "array" => Ok(PropValue::Array(decode_list(kind, node, value)?)),
        "set" => Ok(PropValue::Set(decode_list(kind, node, value)?)),
        "object" => {
            let mut entries = Vec::new();
            for pair in pairs(kind, node, value)? {
                let key = pair[0]
                    .as_str()
                    .ok_or_else(|| malformed(kind, node))?
                    .to_string();
                entries.push((key, from_tagged(&pair[1])?));
            }
            Ok(PropValue::Object(entries))
        }
        "map" => {
            let mut entries = Vec::new();
            for pair in pairs(kind, node, value)? {
                entries.push((from_tagged(&pair[0])?, from_tagged(&pair[1])?));
            }
            Ok(PropValue::Map(entries))
        }
        other => Err(DecodeError::UnknownType(other.to_string())),
    }
}

fn decode_list(
    kind: &str,
    node: &Value,
    value: Option<&Value>,
) -> Result<Vec<PropValue>, DecodeError> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(kind, node))?
        .iter()
        .map(from_tagged)
        .collect()
}

fn pairs<'v>(
    kind: &str,
    node: &Value,
    value: Option<&'v Value>,
) -> Result<Vec<&'v [Value]>, DecodeError> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(kind, node))?
        .iter()
        .map(|pair| match pair.as_array() {
            Some(items) if items.len() == 2 => Ok(items.as_slice()),
            _ => Err(malformed(kind, node)),
        })
        .collect()
}

fn malformed(kind: &str, node: &Value) -> DecodeError {
    DecodeError::Malformed(format!("invalid {kind} node: {node}"))
}
