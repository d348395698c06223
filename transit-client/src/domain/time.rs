//! Wire-time normalization.
//!
//! Backends deliver times in three shapes: ISO-like strings, epoch
//! seconds, and a service day paired with seconds since midnight. All of
//! them are normalized to `chrono::NaiveDateTime` at the parser boundary;
//! nothing past the parser ever sees a wire format.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Error returned when a wire time can't be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parses an ISO-like datetime string.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS`, the space-separated variant, and either
/// with a trailing UTC offset (which is applied, yielding local naive
/// wall-clock time as transmitted).
///
/// # Examples
///
/// ```
/// use transit_client::domain::parse_iso_datetime;
///
/// let t = parse_iso_datetime("2024-03-15T10:30:00").unwrap();
/// assert_eq!(t.to_string(), "2024-03-15 10:30:00");
/// ```
pub fn parse_iso_datetime(s: &str) -> Result<NaiveDateTime, TimeError> {
    // Offset-carrying forms first; chrono rejects them in the naive parse.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    Err(TimeError::new("unrecognized ISO datetime"))
}

/// Converts epoch seconds (UTC) to a naive datetime.
pub fn from_epoch_seconds(secs: i64) -> Result<NaiveDateTime, TimeError> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| TimeError::new("epoch seconds out of range"))
}

/// Combines a service day with seconds since midnight.
///
/// Seconds may exceed 86400: services scheduled past midnight stay on
/// their operating day in GTFS-style feeds, so the date rolls forward.
pub fn from_day_seconds(day: &str, seconds: i64) -> Result<NaiveDateTime, TimeError> {
    if seconds < 0 {
        return Err(TimeError::new("negative seconds since midnight"));
    }
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| TimeError::new("unrecognized service day"))?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| TimeError::new("invalid service day"))?
        .checked_add_signed(Duration::seconds(seconds))
        .ok_or_else(|| TimeError::new("seconds since midnight out of range"))
}
