//! Zone lookup and conversions between wall-clock times and instants.
//!
//! Name canonicalization goes through ICU4X.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{TimeError, TimeResult};

/// Turns the zone names users type into `Tz` values, remembering each answer.
#[derive(Debug, Default)]
pub struct ZoneResolver {
    resolved: HashMap<String, Tz>,
}

impl ZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a zone name such as `America/New_York`.
    ///
    /// Besides canonical IANA names this accepts IANA aliases
    /// (`Europe/Kiev`), Windows names (`Tokyo Standard Time`) and names
    /// carrying a `/mozilla.org/` or `/softwarestudio.org/` prefix.
    ///
    /// ## Errors
    /// Returns `TimeError::UnknownTimezone` if the name matches no zone.
    pub fn resolve(&mut self, name: &str) -> TimeResult<Tz> {
        if let Some(zone) = self.resolved.get(name) {
            return Ok(*zone);
        }

        let canonical = canonical_name(name.trim());
        let zone = Tz::from_str(&canonical)
            .map_err(|_e| TimeError::UnknownTimezone(name.to_string()))?;

        tracing::trace!(name, zone = %zone, "Resolved zone");
        self.resolved.insert(name.to_string(), zone);
        Ok(zone)
    }
}

fn without_vendor_prefix(name: &str) -> &str {
    ["/mozilla.org/", "/softwarestudio.org/"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

fn iana_for_windows(name: &str) -> Option<String> {
    let zone = WindowsParser::new().parse(name, None)?;
    IanaParserExtended::new()
        .iter()
        .find(|entry| entry.time_zone == zone)
        .map(|entry| entry.canonical.to_string())
}

fn canonical_name(name: &str) -> String {
    let name = without_vendor_prefix(name);
    if let Some(iana) = iana_for_windows(name) {
        return iana;
    }
    let parsed = IanaParserExtended::new().parse(name);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        name.to_string()
    } else {
        parsed.canonical.to_string()
    }
}

/// ## Summary
/// Interprets a wall-clock time in `zone`.
///
/// A time that occurs twice (DST fold) resolves to the earlier instant.
///
/// ## Errors
///
/// Returns `TimeError::NonExistentTime` if the wall-clock time falls in a DST gap.
pub fn localize(local_time: NaiveDateTime, zone: Tz) -> TimeResult<DateTime<Tz>> {
    match zone.from_local_datetime(&local_time) {
        LocalResult::None => Err(TimeError::NonExistentTime(format!(
            "{local_time} in timezone {zone}"
        ))),
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _latest) => Ok(earliest),
    }
}

/// ## Summary
/// Interprets a wall-clock time in `zone`, shifting times that fall in a DST
/// gap forward by one hour instead of failing.
///
/// ## Errors
///
/// Returns `TimeError::NonExistentTime` if the shifted time is still invalid.
pub fn localize_lenient(local_time: NaiveDateTime, zone: Tz) -> TimeResult<DateTime<Tz>> {
    match localize(local_time, zone) {
        Err(TimeError::NonExistentTime(_)) => {
            localize(local_time + chrono::TimeDelta::hours(1), zone)
        }
        other => other,
    }
}

/// ## Summary
/// First instant of `date` in `zone`.
///
/// ## Errors
///
/// Returns an error if midnight and the hour after it both fall in a DST gap.
pub fn start_of_day(date: NaiveDate, zone: Tz) -> TimeResult<DateTime<Tz>> {
    localize_lenient(date.and_time(NaiveTime::MIN), zone)
}

/// Re-expresses `instant` in `zone` without moving it in time.
#[must_use]
pub fn reproject(instant: &DateTime<Tz>, zone: Tz) -> DateTime<Tz> {
    instant.with_timezone(&zone)
}
