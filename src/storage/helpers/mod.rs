//! Shared storage helper functions.
//!
//! Timestamps are stored as fixed-width RFC 3339 text so that lexical order
//! in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Result, StorageError};

/// Render a timestamp for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp '{}': {}", raw, e)))
}

/// Parse an optional stored timestamp.
pub fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(parse_timestamp).transpose()
}

#[cfg(test)]
mod tests;
