//! Time window resolution.
//!
//! Converts a slot's calendar date, local 12-hour time strings, and
//! the owner's fixed UTC offset into an absolute UTC interval. All
//! raw time-string handling is contained here; nothing else in the
//! system touches the stored formats.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use meetsync_core::error::AppError;
use meetsync_core::result::AppResult;

/// An absolute UTC meeting interval. `end` is always after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// UTC start instant.
    pub start: DateTime<Utc>,
    /// UTC end instant, cross-midnight adjusted.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parse a local time-of-day string.
///
/// Accepts the stored 12-hour form (`"1:30 PM"`) and falls back to
/// 24-hour (`"13:30"`).
pub fn parse_time(value: &str) -> AppResult<NaiveTime> {
    let normalized = value.trim().to_uppercase();
    NaiveTime::parse_from_str(&normalized, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(&normalized, "%H:%M"))
        .map_err(|_| AppError::parse(format!("Invalid time string: '{value}'")))
}

/// Parse a stored timezone string like `"UTC+06:00"` into a fixed
/// offset. Missing or malformed values fall back to UTC.
pub fn parse_utc_offset(time_zone: Option<&str>) -> FixedOffset {
    time_zone
        .and_then(parse_offset_str)
        .unwrap_or_else(utc_offset)
}

fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).expect("zero offset is always valid")
}

fn parse_offset_str(value: &str) -> Option<FixedOffset> {
    let raw = value.trim().strip_prefix("UTC").unwrap_or(value.trim());
    let (sign, rest) = match raw.chars().next()? {
        '+' => (1, &raw[1..]),
        '-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve a slot's local window into absolute UTC instants.
///
/// Both time strings are anchored onto `date` in the owner's offset
/// and converted to UTC. An end at or before the start means the
/// meeting crosses midnight, so the end gains 24 hours; the result
/// always satisfies `end > start`.
pub fn resolve(
    date: NaiveDate,
    duration_from: &str,
    duration_to: &str,
    offset: FixedOffset,
) -> AppResult<TimeWindow> {
    let from = parse_time(duration_from)?;
    let to = parse_time(duration_to)?;

    let start = to_utc(date, from, offset)?;
    let mut end = to_utc(date, to, offset)?;

    if end <= start {
        end += Duration::days(1);
    }

    Ok(TimeWindow { start, end })
}

fn to_utc(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    match offset.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Fixed offsets have no DST gaps; anything else is malformed.
        _ => Err(AppError::parse(format!(
            "Unrepresentable local time {time} on {date}"
        ))),
    }
}
