//! Calendar ⇄ epoch-second conversion and minute flooring.
//!
//! What this module provides:
//! - [`to_epoch_seconds`]: parse an offset-aware or naive calendar timestamp into whole
//!   UTC seconds. Naive inputs are read as UTC.
//! - [`to_epoch_seconds_with_format`]: strict single-format variant (e.g. the `YYYY-MM-DD`
//!   values emitted by date pickers).
//! - [`local_to_epoch_seconds`]: naive wall time in an IANA zone to UTC seconds, with a
//!   [`DstPolicy`] for gaps and repeats.
//! - [`floor_to_minute`]: the join key between asynchronous posts and minute candles.
//!
//! Notes:
//! - Fractional seconds are truncated toward the past, never rounded.
//! - Parse failures surface as [`ImpactError::InvalidTimestampFormat`] so a caller can
//!   show "bad date" instead of an empty chart.
//!
//! Examples
//! - "2024-03-10T09:30:00-05:00" -> 1710081000
//! - "2024-01-01" -> 1704067200

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{ImpactError, Result};

/// Number of seconds in a minute.
pub const SECS_PER_MINUTE: i64 = 60;
/// Number of seconds in an hour.
pub const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;

/// Output format of [`to_calendar_string`]; also accepted by [`to_epoch_seconds`].
pub const CALENDAR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default format for date-only inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const ACCEPTED: &str = "RFC-3339, YYYY-MM-DD HH:MM:SS[.f][±HH:MM], or YYYY-MM-DD";

/// Earliest whole minute an `i64` can hold.
pub const MIN_MINUTE: i64 = i64::MIN + (SECS_PER_MINUTE - i64::MIN.rem_euclid(SECS_PER_MINUTE));

/// Round down to the start of the containing minute.
///
/// Uses Euclidean remainder so pre-1970 seconds floor toward the past too.
/// The handful of seconds below [`MIN_MINUTE`] have no representable minute
/// start and clamp up to it.
pub const fn floor_to_minute(epoch_seconds: i64) -> i64 {
    match epoch_seconds.checked_sub(epoch_seconds.rem_euclid(SECS_PER_MINUTE)) {
        Some(t) => t,
        None => MIN_MINUTE,
    }
}

/// Parse a calendar timestamp into whole seconds since the Unix epoch (UTC).
///
/// Accepted, in order: RFC-3339 (`2024-01-01T00:00:00Z`), space-separated with an
/// offset (`2024-01-01 00:00:00+00:00`), naive date-times (read as UTC), and bare
/// dates (midnight UTC).
pub fn to_epoch_seconds(s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.timestamp());
        }
    }
    if let Some(naive) = parse_naive(s) {
        return Ok(naive.and_utc().timestamp());
    }
    Err(invalid(s, ACCEPTED))
}

/// Parse with exactly one `chrono` format string, interpreting the result as UTC.
///
/// Date-only formats (no time fields) resolve to midnight.
pub fn to_epoch_seconds_with_format(s: &str, format: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Ok(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| invalid(s, format))
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// `None` when the instant is outside chrono's representable range.
pub fn to_calendar_string(epoch_seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0).map(|dt| dt.format(CALENDAR_FORMAT).to_string())
}

/// How a naive wall time maps to UTC when the zone repeats or skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Repeated and skipped wall times are errors.
    #[default]
    Strict,
    /// A repeated wall time takes its first occurrence.
    PreferEarliest,
    /// A repeated wall time takes its second occurrence.
    PreferLatest,
    /// A skipped wall time moves to the first valid minute after the gap.
    ShiftForward,
}

// Search horizon for the end of a skipped interval.
const MAX_GAP_MINUTES: i64 = 120;

/// Resolve `naive` in `tz` under `policy`.
pub fn from_local_naive_with_policy(
    naive: NaiveDateTime,
    tz: Tz,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    let resolved = match (tz.from_local_datetime(&naive), policy) {
        (LocalResult::Single(dt), _) => dt,
        (LocalResult::Ambiguous(first, _), DstPolicy::PreferEarliest) => first,
        (LocalResult::Ambiguous(_, second), DstPolicy::PreferLatest) => second,
        (LocalResult::Ambiguous(..), _) => {
            return Err(ImpactError::AmbiguousLocalTime(format!("{naive} in {tz}")));
        }
        (LocalResult::None, DstPolicy::ShiftForward) => first_minute_after_gap(naive, tz)
            .ok_or_else(|| ImpactError::NonexistentLocalTime(format!("{naive} in {tz}")))?,
        (LocalResult::None, _) => {
            return Err(ImpactError::NonexistentLocalTime(format!("{naive} in {tz}")));
        }
    };
    Ok(resolved.with_timezone(&Utc))
}

fn first_minute_after_gap(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    (1..=MAX_GAP_MINUTES)
        .find_map(|m| tz.from_local_datetime(&(naive + Duration::minutes(m))).single())
}

/// Parse a naive wall-clock string (or bare date) in the IANA zone `tz_name`.
///
/// Strings that carry their own offset are honoured as-is and `tz_name` is ignored.
pub fn local_to_epoch_seconds(s: &str, tz_name: &str, policy: DstPolicy) -> Result<i64> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| ImpactError::UnknownTimeZone(tz_name.to_string()))?;
    let trimmed = s.trim();
    match parse_naive(trimmed) {
        Some(naive) => from_local_naive_with_policy(naive, tz, policy).map(|dt| dt.timestamp()),
        None => to_epoch_seconds(trimmed),
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn invalid(input: &str, expected: &str) -> ImpactError {
    ImpactError::InvalidTimestampFormat {
        input: input.to_string(),
        expected: expected.to_string(),
    }
}
