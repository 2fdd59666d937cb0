//! Date/time utilities for cabinet.

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// SQLite's `datetime('now')` stores UTC without a zone marker; API responses
/// expect RFC3339 timestamps, so the space becomes 'T' and a 'Z' is appended.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}
