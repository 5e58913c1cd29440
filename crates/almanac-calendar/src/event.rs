//! Single calendar events.

use std::fmt;

use almanac_time::{Tz, reproject};
use chrono::{DateTime, TimeDelta};

use crate::error::{CalendarError, CalendarResult};

/// Whether an event is shown to people other than its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    /// ## Summary
    /// Parses `public`/`private`, or `true`/`false` read as "is public".
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for any other value.
    pub fn parse(value: &str) -> CalendarResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "public" | "true" => Ok(Self::Public),
            "private" | "false" => Ok(Self::Private),
            other => Err(CalendarError::InvalidArgument(format!(
                "Unknown visibility: {other}"
            ))),
        }
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Length an all-day event occupies.
fn all_day_length() -> TimeDelta {
    TimeDelta::hours(24)
}

/// A single occurrence on a calendar.
///
/// `start` and `end` are always expressed in `zone`; every setter that touches
/// them re-projects both onto the same instants in `zone`. An absent `end`
/// marks an all-day event occupying `[start, start + 24h)`.
///
/// Equality compares subject, instants, location, description, visibility and
/// zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    subject: String,
    start: DateTime<Tz>,
    end: Option<DateTime<Tz>>,
    location: Option<String>,
    description: Option<String>,
    visibility: Visibility,
    zone: Tz,
}

impl Event {
    /// Creates a public event in the zone of `start`.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        start: DateTime<Tz>,
        end: Option<DateTime<Tz>>,
    ) -> Self {
        let mut event = Self {
            subject: subject.into(),
            zone: start.timezone(),
            start,
            end,
            location: None,
            description: None,
            visibility: Visibility::Public,
        };
        event.maintain_zone_consistency();
        event
    }

    /// Creates a public all-day event.
    #[must_use]
    pub fn all_day(subject: impl Into<String>, start: DateTime<Tz>) -> Self {
        Self::new(subject, start, None)
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub const fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<&DateTime<Tz>> {
        self.end.as_ref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub const fn is_all_day(&self) -> bool {
        self.end.is_none()
    }

    /// `end`, or `start + 24h` for an all-day event.
    #[must_use]
    pub fn effective_end(&self) -> DateTime<Tz> {
        self.end.unwrap_or_else(|| self.start + all_day_length())
    }

    /// Length of the occupied interval; negative for an inverted interval.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.effective_end() - self.start
    }

    /// True for an explicit end equal to the start.
    #[must_use]
    pub fn is_instantaneous(&self) -> bool {
        self.end.is_some_and(|end| end == self.start)
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn set_start(&mut self, start: DateTime<Tz>) {
        self.start = start;
        self.maintain_zone_consistency();
    }

    pub fn set_end(&mut self, end: Option<DateTime<Tz>>) {
        self.end = end;
        self.maintain_zone_consistency();
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// Moves the event to `zone` without changing its instants.
    pub fn set_zone(&mut self, zone: Tz) {
        self.zone = zone;
        self.maintain_zone_consistency();
    }

    /// ## Summary
    /// True when both events occupy a common instant.
    ///
    /// Intervals are half-open, so back-to-back events do not conflict, and an
    /// event whose end equals its start conflicts with nothing. Comparison is
    /// on absolute instants, so the events' zones do not matter.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        if self.is_instantaneous() || other.is_instantaneous() {
            return false;
        }
        self.start < other.effective_end() && self.effective_end() > other.start
    }

    /// True when `instant` lies strictly inside the occupied interval.
    #[must_use]
    pub fn occupies(&self, instant: &DateTime<Tz>) -> bool {
        self.start < *instant && *instant < self.effective_end()
    }

    /// ## Summary
    /// Range-query predicate: starts strictly after `from` and, if it has an
    /// end, ends strictly before `to`.
    #[must_use]
    pub fn falls_within(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> bool {
        self.start > *from && self.end.is_none_or(|end| end < *to)
    }

    /// True when the occupied interval touches the closed range `[from, to]`.
    #[must_use]
    pub fn touches(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> bool {
        self.start <= *to && self.effective_end() >= *from
    }

    fn maintain_zone_consistency(&mut self) {
        self.start = reproject(&self.start, self.zone);
        if let Some(end) = self.end.as_mut() {
            *end = reproject(end, self.zone);
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.naive_local();
        match self.end {
            Some(end) => write!(
                f,
                "Event[{}, {start} to {}, {}]",
                self.subject,
                end.naive_local(),
                self.zone
            ),
            None => write!(f, "Event[{}, {start} to ALL DAY, {}]", self.subject, self.zone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    const NY: Tz = Tz::America__New_York;
    const LA: Tz = Tz::America__Los_Angeles;

    fn at(zone: Tz, d: u32, h: u32, m: u32) -> DateTime<Tz> {
        zone.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
    }

    fn timed(subject: &str, start: DateTime<Tz>, minutes: i64) -> Event {
        Event::new(subject, start, Some(start + TimeDelta::minutes(minutes)))
    }

    #[test]
    fn test_new_event_defaults() {
        let event = Event::new("", at(NY, 13, 10, 0), None);

        assert_eq!(event.subject(), "");
        assert!(event.is_all_day());
        assert!(event.is_public());
        assert_eq!(event.location(), None);
        assert_eq!(event.description(), None);
        assert_eq!(event.zone(), NY);
        assert_eq!(event.duration(), TimeDelta::hours(24));
    }

    #[test]
    fn test_end_is_reprojected_into_start_zone() {
        let event = Event::new("Call", at(NY, 13, 10, 0), Some(at(LA, 13, 8, 0)));

        let end = event.end().unwrap();
        assert_eq!(end.timezone(), NY);
        assert_eq!(end.hour(), 11);
        assert_eq!(event.duration(), TimeDelta::hours(1));
    }

    #[test]
    fn test_set_zone_keeps_instants() {
        let mut event = timed("Standup", at(NY, 13, 10, 0), 30);
        let before = *event.start();

        event.set_zone(LA);

        assert_eq!(event.zone(), LA);
        assert_eq!(*event.start(), before);
        assert_eq!(event.start().hour(), 7);
        assert_eq!(event.end().unwrap().timezone(), LA);
    }

    #[test]
    fn test_set_start_reprojects_into_event_zone() {
        let mut event = timed("Standup", at(NY, 13, 10, 0), 30);

        event.set_start(at(LA, 13, 9, 0));

        assert_eq!(event.start().timezone(), NY);
        assert_eq!(event.start().hour(), 12);
    }

    #[test]
    fn test_overlapping_events_conflict() {
        let a = timed("A", at(NY, 13, 10, 0), 120);
        let b = timed("B", at(NY, 13, 11, 0), 120);

        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
    }

    #[test]
    fn test_adjacent_events_do_not_conflict() {
        let a = timed("A", at(NY, 13, 10, 0), 60);
        let b = timed("B", at(NY, 13, 11, 0), 60);

        assert!(!a.conflicts_with(&b));
        assert!(!b.conflicts_with(&a));
    }

    #[test]
    fn test_zero_length_event_never_conflicts() {
        let point = timed("Point", at(NY, 13, 10, 30), 0);
        let around = timed("Around", at(NY, 13, 10, 0), 60);

        assert!(!point.conflicts_with(&around));
        assert!(!around.conflicts_with(&point));
        assert!(!point.conflicts_with(&point));
    }

    #[test]
    fn test_all_day_event_blocks_following_day_hours() {
        let all_day = Event::all_day("Offsite", at(NY, 13, 0, 0));
        let morning = timed("Morning", at(NY, 13, 9, 0), 60);
        let next_day = timed("Next", at(NY, 14, 0, 0), 60);

        assert!(all_day.conflicts_with(&morning));
        assert!(!all_day.conflicts_with(&next_day));
    }

    #[test]
    fn test_conflict_across_zones_uses_instants() {
        // 10:00 New York == 07:00 Los Angeles
        let ny = timed("NY", at(NY, 13, 10, 0), 60);
        let la = timed("LA", at(LA, 13, 7, 30), 60);
        let la_later = timed("LA later", at(LA, 13, 8, 0), 60);

        assert!(ny.conflicts_with(&la));
        assert!(!ny.conflicts_with(&la_later));
    }

    #[test]
    fn test_occupies_is_exclusive_at_both_ends() {
        let event = timed("Meeting", at(NY, 13, 10, 0), 60);

        assert!(event.occupies(&at(NY, 13, 10, 30)));
        assert!(!event.occupies(&at(NY, 13, 10, 0)));
        assert!(!event.occupies(&at(NY, 13, 11, 0)));
    }

    #[test]
    fn test_falls_within_is_strict() {
        let event = timed("Meeting", at(NY, 13, 10, 0), 60);

        assert!(event.falls_within(&at(NY, 13, 9, 59), &at(NY, 13, 11, 1)));
        assert!(!event.falls_within(&at(NY, 13, 10, 0), &at(NY, 13, 12, 0)));
        assert!(!event.falls_within(&at(NY, 13, 9, 0), &at(NY, 13, 11, 0)));
    }

    #[test]
    fn test_equality_covers_zone() {
        let ny = timed("Meeting", at(NY, 13, 10, 0), 60);
        let mut la = ny.clone();
        assert_eq!(ny, la);

        la.set_zone(LA);
        assert_ne!(ny, la);

        let private = ny.clone().with_visibility(Visibility::Private);
        assert_ne!(ny, private);
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!(Visibility::parse("Private").unwrap(), Visibility::Private);
        assert_eq!(Visibility::parse("true").unwrap(), Visibility::Public);
        assert!(Visibility::parse("secret").is_err());
    }

    #[test]
    fn test_display() {
        let event = Event::all_day("Holiday", at(NY, 13, 0, 0));
        assert_eq!(
            event.to_string(),
            "Event[Holiday, 2025-03-13 00:00:00 to ALL DAY, America/New_York]"
        );
    }
}
