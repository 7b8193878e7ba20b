//! ALB timestamp parsing with conversion to US Eastern time.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use crate::error::{ParseError, ParseResult};

/// Target zone for stored timestamps.
pub const TARGET_TZ: Tz = New_York;

/// Accepted layouts, tried in order: fractional seconds, then whole seconds.
const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"];

/// Parse a UTC timestamp token and convert it to [`TARGET_TZ`].
///
/// The offset applied depends on the date, so July values land at -04:00
/// and January values at -05:00.
pub fn parse_timestamp(token: &str) -> ParseResult<DateTime<Tz>> {
    let utc = parse_utc(token)?;
    Ok(utc.with_timezone(&TARGET_TZ))
}

/// Parse a token in one of the accepted layouts as a UTC instant.
pub fn parse_utc(token: &str) -> ParseResult<DateTime<Utc>> {
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .ok_or_else(|| ParseError::Timestamp(token.to_string()))
}
