use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text form of a scalar: strings as they are, numbers and booleans printed.
/// `null`, arrays and objects have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// `deserialize_with` for optional text fields that also accept numbers and
/// booleans. `null` reads as absent.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected text, found {value}"))),
    }
}
