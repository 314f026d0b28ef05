//! Forgiving deserializers for values that come from model output or loosely
//! typed edit forms.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an integer out of a JSON number or a numeric string.
///
/// Fractional numbers, out-of-range values, non-numeric strings and every
/// other JSON type yield `None`.
pub fn lenient_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .and_then(|f| i32::try_from(f as i64).ok())
            })
        }
        _ => None,
    }
}

/// `#[serde(default, deserialize_with = "deserialize_lenient_i32")]` on an `Option<i32>`.
pub fn deserialize_lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_i32(&value))
}

/// Optional text from model output: numbers and booleans are rendered as text,
/// blank strings and every other JSON type yield `None`.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// `null` where an array is expected reads as an empty array.
pub fn deserialize_null_as_empty<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Patch variant: a missing field stays `None` (through `#[serde(default)]`),
/// a present field becomes `Some(parsed)` where unparseable input clears the value.
pub fn deserialize_patch_i32<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(lenient_i32(&value)))
}

/// Distinguishes an explicit `null` from an absent field for nullable patch fields.
pub fn deserialize_patch_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
