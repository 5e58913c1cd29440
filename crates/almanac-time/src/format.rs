//! Text formats used at the command boundary.

use almanac_core::constants::{
    DISPLAY_DATE_TIME_FORMAT, INPUT_DATE_FORMAT, INPUT_DATE_TIME_FORMAT, INPUT_TIME_FORMAT,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::error::{TimeError, TimeResult};
use crate::zone::localize;

/// ## Summary
/// Parses a `yyyy-MM-dd` date.
///
/// ## Errors
/// Returns `TimeError::InvalidFormat` if the text does not match.
pub fn parse_date(text: &str) -> TimeResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), INPUT_DATE_FORMAT)
        .map_err(|_e| TimeError::InvalidFormat(text.to_string()))
}

/// ## Summary
/// Parses an `HH:mm` time of day.
///
/// ## Errors
/// Returns `TimeError::InvalidFormat` if the text does not match.
pub fn parse_time(text: &str) -> TimeResult<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), INPUT_TIME_FORMAT)
        .map_err(|_e| TimeError::InvalidFormat(text.to_string()))
}

/// ## Summary
/// Parses a `yyyy-MM-dd HH:mm` wall-clock time.
///
/// ## Errors
/// Returns `TimeError::InvalidFormat` if the text does not match.
pub fn parse_date_time(text: &str) -> TimeResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), INPUT_DATE_TIME_FORMAT)
        .map_err(|_e| TimeError::InvalidFormat(text.to_string()))
}

/// ## Summary
/// Parses a `yyyy-MM-dd HH:mm` wall-clock time and places it in `zone`.
///
/// ## Errors
/// Returns an error if the text does not match or names a time that does not
/// exist in `zone`.
pub fn parse_zoned(text: &str, zone: Tz) -> TimeResult<DateTime<Tz>> {
    localize(parse_date_time(text)?, zone)
}

/// Formats an instant as `MM/dd/yyyy HH:mm` in its own zone.
#[must_use]
pub fn display_date_time(instant: &DateTime<Tz>) -> String {
    instant.format(DISPLAY_DATE_TIME_FORMAT).to_string()
}
