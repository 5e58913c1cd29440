//! A named, zone-scoped collection of events.

use almanac_time::Tz;
use chrono::DateTime;

use crate::edit::EventEdit;
use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::recurrence::{RecurringEvent, TimeWindow};

/// A stored calendar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Single(Event),
    Recurring(RecurringEvent),
}

impl Entry {
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Single(event) => event.subject(),
            Self::Recurring(series) => series.subject(),
        }
    }

    fn set_zone(&mut self, zone: Tz) {
        match self {
            Self::Single(event) => event.set_zone(zone),
            Self::Recurring(series) => series.set_zone(zone),
        }
    }
}

impl From<Event> for Entry {
    fn from(event: Event) -> Self {
        Self::Single(event)
    }
}

impl From<RecurringEvent> for Entry {
    fn from(series: RecurringEvent) -> Self {
        Self::Recurring(series)
    }
}

/// A named calendar whose entries are expressed in one zone.
///
/// Entries are kept in insertion order. Recurring entries are stored as
/// templates and expanded on demand by every query; callers only ever see
/// concrete [`Event`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    name: String,
    zone: Tz,
    entries: Vec<Entry>,
}

impl Calendar {
    #[must_use]
    pub fn new(name: impl Into<String>, zone: Tz) -> Self {
        Self {
            name: name.into(),
            zone,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Re-expresses the calendar and every entry in `zone`.
    pub fn set_zone(&mut self, zone: Tz) {
        tracing::debug!(
            calendar = %self.name,
            from = %self.zone,
            to = %zone,
            "Changing calendar timezone"
        );
        self.zone = zone;
        for entry in &mut self.entries {
            entry.set_zone(zone);
        }
    }

    /// ## Summary
    /// True when `event` overlaps any stored event or any occurrence of a
    /// stored series.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn has_conflict(&self, event: &Event) -> CalendarResult<bool> {
        let (from, to) = (event.start(), &event.effective_end());
        for entry in &self.entries {
            let conflicts = match entry {
                Entry::Single(existing) => existing.conflicts_with(event),
                Entry::Recurring(series) => series
                    .occurrences_touching(from, to)?
                    .iter()
                    .any(|occurrence| occurrence.event.conflicts_with(event)),
            };
            if conflicts {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// ## Summary
    /// Stores `event`, re-expressed in the calendar zone.
    ///
    /// With `auto_decline`, an event that conflicts with anything already
    /// stored is not added and `Ok(false)` is returned.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn add_event(&mut self, mut event: Event, auto_decline: bool) -> CalendarResult<bool> {
        if auto_decline && self.has_conflict(&event)? {
            tracing::debug!(
                calendar = %self.name,
                subject = event.subject(),
                "Declined event due to conflict"
            );
            return Ok(false);
        }
        event.set_zone(self.zone);
        tracing::debug!(
            calendar = %self.name,
            subject = event.subject(),
            start = %event.start(),
            "Added event"
        );
        self.entries.push(Entry::Single(event));
        Ok(true)
    }

    /// ## Summary
    /// Stores a bounded series only if none of its occurrences conflicts
    /// with anything already stored.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for a series with neither an
    /// occurrence limit nor an end; use [`Self::add_recurring_event_until`].
    pub fn add_recurring_event(&mut self, series: RecurringEvent) -> CalendarResult<bool> {
        let instances = series.expand_all()?;
        self.admit_series(series, &instances)
    }

    /// ## Summary
    /// Stores a series only if none of its occurrences up to `horizon`
    /// conflicts with anything already stored. Bounded series are checked in
    /// full regardless of `horizon`.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a series cannot be expanded.
    pub fn add_recurring_event_until(
        &mut self,
        series: RecurringEvent,
        horizon: &DateTime<Tz>,
    ) -> CalendarResult<bool> {
        let instances = if series.is_bounded() {
            series.expand_all()?
        } else {
            series.expand(&TimeWindow::through(*series.template().start(), *horizon))?
        };
        self.admit_series(series, &instances)
    }

    fn admit_series(
        &mut self,
        mut series: RecurringEvent,
        instances: &[Event],
    ) -> CalendarResult<bool> {
        for instance in instances {
            if self.has_conflict(instance)? {
                tracing::debug!(
                    calendar = %self.name,
                    subject = series.subject(),
                    conflicting_start = %instance.start(),
                    "Declined recurring event due to conflict"
                );
                return Ok(false);
            }
        }
        series.set_zone(self.zone);
        tracing::debug!(
            calendar = %self.name,
            subject = series.subject(),
            checked = instances.len(),
            "Added recurring event"
        );
        self.entries.push(Entry::Recurring(series));
        Ok(true)
    }

    /// ## Summary
    /// Events starting strictly after `from` that either are all-day or end
    /// strictly before `to`, recurring occurrences included, ordered by start
    /// with insertion order breaking ties.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn get_events_in_range(
        &self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
    ) -> CalendarResult<Vec<Event>> {
        let mut found = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Single(event) if event.falls_within(from, to) => found.push(event.clone()),
                Entry::Single(_) => {}
                Entry::Recurring(series) => found.extend(
                    series
                        .occurrences_in_range(from, to)?
                        .into_iter()
                        .map(|occurrence| occurrence.event),
                ),
            }
        }
        found.sort_by(|a, b| a.start().cmp(b.start()));
        Ok(found)
    }

    /// ## Summary
    /// True when some event occupies `instant`; events starting or ending
    /// exactly at `instant` do not count.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn is_busy(&self, instant: &DateTime<Tz>) -> CalendarResult<bool> {
        for entry in &self.entries {
            let busy = match entry {
                Entry::Single(event) => event.occupies(instant),
                Entry::Recurring(series) => series
                    .occurrences_touching(instant, instant)?
                    .iter()
                    .any(|occurrence| occurrence.event.occupies(instant)),
            };
            if busy {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// ## Summary
    /// First event, single or recurring occurrence, starting exactly at `start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn get_event_at(&self, start: &DateTime<Tz>) -> CalendarResult<Option<Event>> {
        for entry in &self.entries {
            match entry {
                Entry::Single(event) if event.start() == start => return Ok(Some(event.clone())),
                Entry::Single(_) => {}
                Entry::Recurring(series) => {
                    if let Some(occurrence) = series.occurrence_starting_at(start)? {
                        return Ok(Some(occurrence.event));
                    }
                }
            }
        }
        Ok(None)
    }

    /// ## Summary
    /// Sets `property` to `value` on every event starting exactly at `start`.
    ///
    /// `value` is read in the calendar zone when the property is a time.
    /// Returns how many events were edited; zero is not an error.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for an unknown property or an
    /// unparseable value.
    pub fn edit_event_instance(
        &mut self,
        start: &DateTime<Tz>,
        property: &str,
        value: &str,
    ) -> CalendarResult<usize> {
        let edit = EventEdit::parse(property, value, self.zone)?;
        self.apply_edit(start, &edit)
    }

    /// ## Summary
    /// Applies `edit` to every event starting exactly at `start`.
    ///
    /// A recurring occurrence is edited by recording a replacement for it;
    /// the series template is left untouched.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if a stored series cannot be
    /// expanded.
    pub fn apply_edit(&mut self, start: &DateTime<Tz>, edit: &EventEdit) -> CalendarResult<usize> {
        let mut edited = 0;
        for entry in &mut self.entries {
            match entry {
                Entry::Single(event) if event.start() == start => {
                    edit.apply(event);
                    edited += 1;
                }
                Entry::Single(_) => {}
                Entry::Recurring(series) => {
                    if let Some(occurrence) = series.occurrence_starting_at(start)? {
                        let mut event = occurrence.event;
                        edit.apply(&mut event);
                        series.replace_occurrence(&occurrence.original_start, event)?;
                        edited += 1;
                    }
                }
            }
        }
        tracing::debug!(
            calendar = %self.name,
            start = %start,
            property = edit.property(),
            edited,
            "Edited events"
        );
        Ok(edited)
    }

    /// ## Summary
    /// The event named `subject` starting exactly at `start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if there is none.
    pub fn find_event(&self, subject: &str, start: &DateTime<Tz>) -> CalendarResult<Event> {
        for entry in &self.entries {
            let candidate = match entry {
                Entry::Single(event) => (event.start() == start).then(|| event.clone()),
                Entry::Recurring(series) => series
                    .occurrence_starting_at(start)?
                    .map(|occurrence| occurrence.event),
            };
            if let Some(event) = candidate.filter(|event| event.subject() == subject) {
                return Ok(event);
            }
        }
        Err(CalendarError::NotFound(format!(
            "Event '{subject}' at {start} in calendar '{}'",
            self.name
        )))
    }
}
