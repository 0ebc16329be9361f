//! Ingestion datetime normalization.
//!
//! Raw marker timestamps arrive as `"YYYY-MM-DD HH:MM"` strings with an
//! optional time part. They are normalized to UTC before storage.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Parse a raw marker timestamp into a UTC instant.
///
/// Accepts `"YYYY-MM-DD HH:MM"`; the time part may be omitted and defaults
/// to midnight. Surrounding whitespace is ignored. The wall-clock value is
/// interpreted as already being UTC.
pub fn parse_mark_timestamp(raw: &str) -> Result<Timestamp, CoreError> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Err(CoreError::Validation(
            "Timestamp must not be empty".to_string(),
        ));
    }

    let naive: NaiveDateTime = match cleaned.split_once(' ') {
        Some((date, time)) => NaiveDateTime::parse_from_str(
            &format!("{} {}", date, time.trim()),
            "%Y-%m-%d %H:%M",
        )
        .map_err(|e| CoreError::Validation(format!("Invalid timestamp '{cleaned}': {e}")))?,
        None => NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
            .map_err(|e| CoreError::Validation(format!("Invalid timestamp '{cleaned}': {e}")))?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CoreError::Internal("Midnight is always representable".to_string()))?,
    };

    Ok(naive.and_utc())
}

/// Normalize an optional raw timestamp for ingestion.
///
/// Missing or empty input stays `None`. A malformed value degrades to
/// `now` instead of rejecting the record; ingestion deliberately prefers a
/// wrong-but-present timestamp over dropping a detected marker.
pub fn normalize_mark_timestamp(raw: Option<&str>, now: Timestamp) -> Option<Timestamp> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_mark_timestamp(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::warn!(raw, error = %e, "Unparseable mark timestamp, falling back to now");
            Some(now)
        }
    }
}
