//! Copying events from the current calendar into another calendar.

use almanac_time::Tz;
use almanac_time::zone::{localize_lenient, start_of_day};
use chrono::{DateTime, NaiveDate, TimeDelta};

use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::manager::CalendarManager;

/// Outcome of a copy, one event at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Events added to the target calendar.
    pub copied: Vec<Event>,
    /// Events left out because they conflicted in the target calendar.
    pub declined: Vec<Event>,
}

impl CopyReport {
    /// True when the source window held no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copied.is_empty() && self.declined.is_empty()
    }
}

/// A fresh event with `source`'s details and duration, starting at `start`.
fn relocated(source: &Event, start: DateTime<Tz>) -> Event {
    let end = source.end().map(|_| start + source.duration());
    let mut event = Event::new(source.subject(), start, end).with_visibility(source.visibility());
    event.set_location(source.location().map(String::from));
    event.set_description(source.description().map(String::from));
    event
}

impl CalendarManager {
    /// ## Summary
    /// Copies the current calendar's event named `subject` starting at
    /// `source_start` into `target`, starting at `target_start`.
    ///
    /// The copy keeps the duration, location, description and visibility and
    /// is expressed in the target calendar's zone. It is declined, returning
    /// `Ok(false)`, if it conflicts with an event in the target.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if the source event or the target
    /// calendar does not exist.
    pub fn copy_event(
        &mut self,
        subject: &str,
        source_start: &DateTime<Tz>,
        target: &str,
        target_start: &DateTime<Tz>,
    ) -> CalendarResult<bool> {
        let source = self.current()?.find_event(subject, source_start)?;
        let target_calendar = self.calendar_mut(target)?;
        let start = target_start.with_timezone(&target_calendar.zone());

        let copied = target_calendar.add_event(relocated(&source, start), true)?;
        tracing::debug!(subject, target, copied, "Copied event");
        Ok(copied)
    }

    /// ## Summary
    /// Copies the events of the current calendar's `date` to `target_date` in
    /// `target`, keeping each event's wall-clock time of day.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if the target calendar does not exist.
    pub fn copy_events_on(
        &mut self,
        date: NaiveDate,
        target: &str,
        target_date: NaiveDate,
    ) -> CalendarResult<CopyReport> {
        self.copy_events_between(date, date, target, target_date)
    }

    /// ## Summary
    /// Copies the events of the current calendar between `from_date` and
    /// `to_date` (inclusive) into `target`, shifted so `from_date` lands on
    /// `target_from_date`.
    ///
    /// Each copy keeps its day offset from `from_date` and the wall-clock
    /// time of day it had in the source calendar, read in the target zone.
    /// Conflicting copies are declined and reported; the rest still go in.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if `to_date` precedes
    /// `from_date`, and `CalendarError::NotFound` if the target calendar does
    /// not exist.
    pub fn copy_events_between(
        &mut self,
        from_date: NaiveDate,
        to_date: NaiveDate,
        target: &str,
        target_from_date: NaiveDate,
    ) -> CalendarResult<CopyReport> {
        if to_date < from_date {
            return Err(CalendarError::InvalidArgument(format!(
                "Copy range ends before it starts: {from_date} to {to_date}"
            )));
        }
        let target_zone = self.get_calendar(target)?.zone();

        let source = self.current()?;
        let zone = source.zone();
        let after_last = to_date.succ_opt().ok_or_else(|| {
            CalendarError::InvalidArgument(format!("Date out of range: {to_date}"))
        })?;
        let from = start_of_day(from_date, zone)?;
        let to = start_of_day(after_last, zone)? - TimeDelta::seconds(1);

        let mut planned = Vec::new();
        for event in source.get_events_in_range(&from, &to)? {
            let local = event.start().naive_local();
            let offset = local.date().signed_duration_since(from_date);
            let day = target_from_date.checked_add_signed(offset).ok_or_else(|| {
                CalendarError::InvalidArgument(format!("Date out of range: {target_from_date}"))
            })?;
            let start = localize_lenient(day.and_time(local.time()), target_zone)?;
            planned.push(relocated(&event, start));
        }

        let target_calendar = self.calendar_mut(target)?;
        let mut report = CopyReport::default();
        for event in planned {
            if target_calendar.add_event(event.clone(), true)? {
                report.copied.push(event);
            } else {
                report.declined.push(event);
            }
        }

        tracing::debug!(
            target,
            copied = report.copied.len(),
            declined = report.declined.len(),
            "Copied events"
        );
        Ok(report)
    }
}
