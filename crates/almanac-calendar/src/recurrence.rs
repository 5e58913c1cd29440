//! Recurring series and their expansion into concrete events.

use std::collections::BTreeMap;

use almanac_time::{Tz, WeekdayMask};
use chrono::{DateTime, TimeDelta, Utc, Weekday};
use rrule::{RRule, RRuleSet, Unvalidated};

use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;

/// Longest interval a generated instance can occupy.
const MAX_INSTANCE_LENGTH: TimeDelta = TimeDelta::hours(24);

/// How a series repeats and when it stops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recurrence {
    weekdays: WeekdayMask,
    occurrence_limit: Option<u32>,
    recurrence_end: Option<DateTime<Tz>>,
}

impl Recurrence {
    /// Repeats on the given weekdays; an empty mask repeats daily.
    #[must_use]
    pub const fn on(weekdays: WeekdayMask) -> Self {
        Self {
            weekdays,
            occurrence_limit: None,
            recurrence_end: None,
        }
    }

    /// Repeats every day.
    #[must_use]
    pub const fn daily() -> Self {
        Self::on(WeekdayMask::EVERY_DAY)
    }

    /// Stops after `limit` instances.
    #[must_use]
    pub fn with_occurrence_limit(mut self, limit: u32) -> Self {
        self.occurrence_limit = Some(limit);
        self
    }

    /// Stops once instance starts pass `end`. An instance starting exactly at
    /// `end` is still produced.
    #[must_use]
    pub fn until(mut self, end: DateTime<Tz>) -> Self {
        self.recurrence_end = Some(end);
        self
    }

    #[must_use]
    pub const fn weekdays(&self) -> WeekdayMask {
        self.weekdays
    }

    #[must_use]
    pub const fn occurrence_limit(&self) -> Option<u32> {
        self.occurrence_limit
    }

    #[must_use]
    pub const fn recurrence_end(&self) -> Option<&DateTime<Tz>> {
        self.recurrence_end.as_ref()
    }

    /// True when either an occurrence limit or an end is configured.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.occurrence_limit.is_some() || self.recurrence_end.is_some()
    }

    /// RFC 5545 rule text for this recurrence.
    ///
    /// The end bound is applied while iterating rather than as `UNTIL`, so it
    /// stays inclusive and zone-independent.
    fn rule_text(&self) -> String {
        let mut rule = String::from("FREQ=DAILY");
        if !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.days().map(rrule_day).collect();
            rule.push_str(";BYDAY=");
            rule.push_str(&days.join(","));
        }
        if let Some(limit) = self.occurrence_limit {
            rule.push_str(&format!(";COUNT={limit}"));
        }
        rule
    }
}

const fn rrule_day(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Override for a single occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceOverride {
    /// The occurrence is shown as this event instead.
    Replaced(Event),
    /// The occurrence is dropped.
    Cancelled,
}

/// One occurrence of a series after exceptions are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Start the series generated for this occurrence.
    pub original_start: DateTime<Tz>,
    /// The event shown for it, either generated or a replacement.
    pub event: Event,
}

/// Half-open span `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    /// Window covering `[start, end]`.
    #[must_use]
    pub fn through(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self::new(start, end + TimeDelta::nanoseconds(1))
    }

    #[must_use]
    pub const fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    #[must_use]
    pub const fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    #[must_use]
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// A template event repeated on selected weekdays.
///
/// Instances keep the template's time of day in the zone the series was
/// defined in, and its duration; an all-day template yields all-day
/// instances. Re-expressing the series in another zone changes how instances
/// are displayed, never which instants they fall on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringEvent {
    template: Event,
    recurrence: Recurrence,
    anchor: Tz,
    exceptions: BTreeMap<DateTime<Utc>, InstanceOverride>,
}

impl RecurringEvent {
    /// ## Summary
    /// Creates a series from a template and its recurrence.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` when the occurrence limit is
    /// zero, the recurrence end precedes the template start, or the template
    /// ends before it starts or on a later day.
    pub fn new(template: Event, recurrence: Recurrence) -> CalendarResult<Self> {
        if recurrence.occurrence_limit == Some(0) {
            return Err(CalendarError::InvalidArgument(
                "Occurrence limit must be at least 1".to_string(),
            ));
        }
        if recurrence
            .recurrence_end
            .is_some_and(|end| end < *template.start())
        {
            return Err(CalendarError::InvalidArgument(
                "Recurrence end cannot precede the series start".to_string(),
            ));
        }
        if let Some(end) = template.end() {
            if end < template.start() {
                return Err(CalendarError::InvalidArgument(
                    "Series end time cannot precede its start time".to_string(),
                ));
            }
            if end.date_naive() != template.start().date_naive() {
                return Err(CalendarError::InvalidArgument(
                    "Recurring events must start and end on the same day".to_string(),
                ));
            }
        }

        let series = Self {
            anchor: template.zone(),
            template,
            recurrence,
            exceptions: BTreeMap::new(),
        };
        series.rule_set()?;

        tracing::trace!(
            subject = series.template.subject(),
            rule = %series.recurrence.rule_text(),
            "Created recurring series"
        );
        Ok(series)
    }

    #[must_use]
    pub const fn template(&self) -> &Event {
        &self.template
    }

    #[must_use]
    pub const fn recurrence(&self) -> &Recurrence {
        &self.recurrence
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.template.subject()
    }

    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.recurrence.is_bounded()
    }

    #[must_use]
    pub const fn exceptions(&self) -> &BTreeMap<DateTime<Utc>, InstanceOverride> {
        &self.exceptions
    }

    /// Replacement events, keyed by the start of the occurrence they replace.
    pub fn replacements(&self) -> impl Iterator<Item = (&DateTime<Utc>, &Event)> {
        self.exceptions
            .iter()
            .filter_map(|(start, exception)| match exception {
                InstanceOverride::Replaced(event) => Some((start, event)),
                InstanceOverride::Cancelled => None,
            })
    }

    fn rule_set(&self) -> CalendarResult<RRuleSet> {
        let rule = self
            .recurrence
            .rule_text()
            .parse::<RRule<Unvalidated>>()
            .map_err(|err| CalendarError::InvalidArgument(err.to_string()))?;
        let dt_start = self
            .template
            .start()
            .with_timezone(&rrule::Tz::Tz(self.anchor));
        rule.build(dt_start)
            .map_err(|err| CalendarError::InvalidArgument(err.to_string()))
    }

    /// Generated starts inside `window`, or every start of a bounded series.
    fn generated_starts(&self, window: Option<&TimeWindow>) -> CalendarResult<Vec<DateTime<Tz>>> {
        let rule_set = self.rule_set()?;
        let zone = self.template.zone();
        let mut starts = Vec::new();

        for generated in &rule_set {
            let start = generated.with_timezone(&zone);
            if self
                .recurrence
                .recurrence_end
                .is_some_and(|end| start > end)
            {
                break;
            }
            match window {
                Some(window) if start >= window.end => break,
                Some(window) if start < window.start => {}
                _ => starts.push(start),
            }
        }

        tracing::trace!(
            subject = self.template.subject(),
            count = starts.len(),
            "Expanded recurring series"
        );
        Ok(starts)
    }

    fn generated_instance(&self, start: DateTime<Tz>) -> Event {
        let mut event = self.template.clone();
        let end = self.template.end().map(|_| start + self.template.duration());
        event.set_start(start);
        event.set_end(end);
        event
    }

    fn resolve(&self, original_start: DateTime<Tz>) -> Option<Occurrence> {
        let event = match self.exceptions.get(&original_start.with_timezone(&Utc)) {
            None => self.generated_instance(original_start),
            Some(InstanceOverride::Replaced(event)) => event.clone(),
            Some(InstanceOverride::Cancelled) => return None,
        };
        Some(Occurrence {
            original_start,
            event,
        })
    }

    /// ## Summary
    /// Occurrences generated inside `window`, with exceptions applied, in
    /// chronological order of their generated starts.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn occurrences(&self, window: &TimeWindow) -> CalendarResult<Vec<Occurrence>> {
        Ok(self
            .generated_starts(Some(window))?
            .into_iter()
            .filter_map(|start| self.resolve(start))
            .collect())
    }

    /// ## Summary
    /// Events of the occurrences generated inside `window`.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn expand(&self, window: &TimeWindow) -> CalendarResult<Vec<Event>> {
        Ok(self
            .occurrences(window)?
            .into_iter()
            .map(|occurrence| occurrence.event)
            .collect())
    }

    /// ## Summary
    /// Every occurrence of a bounded series.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for a series with neither an
    /// occurrence limit nor an end.
    pub fn occurrences_all(&self) -> CalendarResult<Vec<Occurrence>> {
        if !self.is_bounded() {
            return Err(CalendarError::InvalidArgument(
                "Cannot expand a recurring series without an end".to_string(),
            ));
        }
        Ok(self
            .generated_starts(None)?
            .into_iter()
            .filter_map(|start| self.resolve(start))
            .collect())
    }

    /// ## Summary
    /// Every event of a bounded series.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for an unbounded series.
    pub fn expand_all(&self) -> CalendarResult<Vec<Event>> {
        Ok(self
            .occurrences_all()?
            .into_iter()
            .map(|occurrence| occurrence.event)
            .collect())
    }

    /// ## Summary
    /// Occurrences whose event occupies time touching `[from, to]`, including
    /// replacements moved there from elsewhere in the series.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn occurrences_touching(
        &self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
    ) -> CalendarResult<Vec<Occurrence>> {
        let window = TimeWindow::through(*from - MAX_INSTANCE_LENGTH, *to);
        let mut touching: Vec<Occurrence> = self
            .occurrences(&window)?
            .into_iter()
            .filter(|occurrence| occurrence.event.touches(from, to))
            .collect();

        touching.extend(
            self.replacements_outside(&window)
                .filter(|occurrence| occurrence.event.touches(from, to)),
        );
        Ok(touching)
    }

    /// ## Summary
    /// Occurrences whose event starts strictly after `from` and, unless it is
    /// all-day, ends strictly before `to`.
    ///
    /// A bounded all-day series is expanded in full so its instances are
    /// selected exactly like single all-day events; other series are expanded
    /// up to `to`.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn occurrences_in_range(
        &self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
    ) -> CalendarResult<Vec<Occurrence>> {
        let mut candidates = if self.is_bounded() && self.template.is_all_day() {
            self.occurrences_all()?
        } else {
            let window = TimeWindow::new(*from, *to);
            let mut candidates = self.occurrences(&window)?;
            candidates.extend(self.replacements_outside(&window));
            candidates
        };
        candidates.retain(|occurrence| occurrence.event.falls_within(from, to));
        Ok(candidates)
    }

    fn replacements_outside<'a>(
        &'a self,
        window: &'a TimeWindow,
    ) -> impl Iterator<Item = Occurrence> + 'a {
        let zone = self.template.zone();
        self.replacements()
            .map(move |(start, event)| (start.with_timezone(&zone), event))
            .filter(|(start, _)| !window.contains(start))
            .map(|(original_start, event)| Occurrence {
                original_start,
                event: event.clone(),
            })
    }

    /// ## Summary
    /// The occurrence currently shown as starting exactly at `start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn occurrence_starting_at(
        &self,
        start: &DateTime<Tz>,
    ) -> CalendarResult<Option<Occurrence>> {
        Ok(self
            .occurrences_touching(start, start)?
            .into_iter()
            .find(|occurrence| occurrence.event.start() == start))
    }

    /// ## Summary
    /// True when the series generates an occurrence at `start`, whether or not
    /// an exception overrides it.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` if the rule cannot be built.
    pub fn generates(&self, start: &DateTime<Tz>) -> CalendarResult<bool> {
        let window = TimeWindow::through(*start, *start);
        Ok(!self.generated_starts(Some(&window))?.is_empty())
    }

    /// ## Summary
    /// Records an override for the occurrence generated at `original_start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if the series has no occurrence there.
    pub fn add_exception(
        &mut self,
        original_start: &DateTime<Tz>,
        exception: InstanceOverride,
    ) -> CalendarResult<()> {
        if !self.generates(original_start)? {
            return Err(CalendarError::NotFound(format!(
                "No occurrence of '{}' starts at {original_start}",
                self.template.subject()
            )));
        }
        let exception = match exception {
            InstanceOverride::Replaced(mut event) => {
                event.set_zone(self.template.zone());
                InstanceOverride::Replaced(event)
            }
            InstanceOverride::Cancelled => InstanceOverride::Cancelled,
        };
        tracing::debug!(
            subject = self.template.subject(),
            original_start = %original_start,
            cancelled = matches!(exception, InstanceOverride::Cancelled),
            "Recorded recurrence exception"
        );
        self.exceptions
            .insert(original_start.with_timezone(&Utc), exception);
        Ok(())
    }

    /// ## Summary
    /// Shows `replacement` instead of the occurrence at `original_start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if the series has no occurrence there.
    pub fn replace_occurrence(
        &mut self,
        original_start: &DateTime<Tz>,
        replacement: Event,
    ) -> CalendarResult<()> {
        self.add_exception(original_start, InstanceOverride::Replaced(replacement))
    }

    /// ## Summary
    /// Drops the occurrence at `original_start`.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if the series has no occurrence there.
    pub fn cancel_occurrence(&mut self, original_start: &DateTime<Tz>) -> CalendarResult<()> {
        self.add_exception(original_start, InstanceOverride::Cancelled)
    }

    /// Re-expresses the template, its end bound and every replacement in `zone`.
    pub fn set_zone(&mut self, zone: Tz) {
        self.template.set_zone(zone);
        if let Some(end) = self.recurrence.recurrence_end.as_mut() {
            *end = end.with_timezone(&zone);
        }
        for exception in self.exceptions.values_mut() {
            if let InstanceOverride::Replaced(event) = exception {
                event.set_zone(zone);
            }
        }
    }
}
