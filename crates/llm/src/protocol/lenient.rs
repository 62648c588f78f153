//! Deserializers that accept malformed scalars instead of failing the payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any JSON number as `f64`; other values become `None`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

/// Non-negative integer counter; anything else counts as zero.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let count = match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| n.is_finite() && *n >= 0.0).map(|n| n as u64))
            .unwrap_or(0),
        _ => 0,
    };

    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
