//! Row <-> domain-type conversions shared by every table module.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Unit enums (`AgentStatus`, `PlayMode`, `BattleStatus`, `BattlePhase`, ...)
/// serialize as their bare snake_case string via serde, so we round-trip
/// them through a JSON string rather than hand-writing a match per enum.
pub fn enum_to_text<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(Error::Serialization(serde::de::Error::custom(format!(
            "expected a bare string for enum, got {other}"
        )))),
    }
}

pub fn text_to_enum<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(
        text.to_string(),
    ))?)
}

pub fn timestamp_to_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub fn text_to_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(serde::de::Error::custom(e.to_string())))
}

pub fn opt_timestamp_to_text(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(timestamp_to_text)
}

pub fn opt_text_to_timestamp(text: Option<String>) -> Result<Option<DateTime<Utc>>> {
    text.as_deref().map(text_to_timestamp).transpose()
}
