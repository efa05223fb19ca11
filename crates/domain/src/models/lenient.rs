//! Deserializers for values read back from spreadsheet cells.
//!
//! A sheet cell can come back as a string, a number, or empty depending on
//! how it was typed in. These helpers accept every shape the backends are
//! known to produce.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Identifier that may have been stored as a number.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Int(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Text(s)) => s.trim().to_string(),
    })
}

/// Non-negative count; numeric strings are parsed, anything else is 0.
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Scalar>::deserialize(deserializer)? {
        None => 0,
        Some(Scalar::Int(n)) => n,
        Some(Scalar::Float(n)) => n as i64,
        Some(Scalar::Text(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
    };
    Ok(value.clamp(0, u32::MAX as i64) as u32)
}

/// The Unix epoch, used when a timestamp is missing or unreadable.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// RFC 3339 text or epoch milliseconds; anything else becomes the epoch.
pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| epoch()),
        Some(Scalar::Int(ms)) => Utc.timestamp_millis_opt(ms).single().unwrap_or_else(epoch),
        Some(Scalar::Float(ms)) => Utc
            .timestamp_millis_opt(ms as i64)
            .single()
            .unwrap_or_else(epoch),
        None => epoch(),
    })
}

/// Optional text where an empty cell means absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) if !s.trim().is_empty() => Some(s),
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Writes absent text as an empty string.
///
/// The sheet backend keeps the old cell value when a field is missing from
/// an update, so clearing a field has to send `""`.
pub fn serialize_optional_text<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// A JSON value that may also arrive JSON-encoded inside a string.
///
/// Empty or unreadable text yields the default value.
pub fn json_or_encoded<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => T::default(),
        Some(serde_json::Value::String(text)) => {
            serde_json::from_str(&text).unwrap_or_default()
        }
        Some(other) => serde_json::from_value(other).map_err(serde::de::Error::custom)?,
    })
}
