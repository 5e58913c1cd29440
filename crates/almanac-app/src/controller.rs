//! Executes parsed commands against a calendar session.

use std::io::Write;
use std::path::Path;

use almanac_calendar::{
    CalendarManager, CopyReport, Event, Recurrence, RecurringEvent, Visibility,
};
use almanac_core::config::Settings;
use almanac_time::zone::{localize, start_of_day};
use almanac_time::{Tz, ZoneResolver};
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::command::{self, CalendarProperty, Command, EventSpec, Timing};
use crate::error::{AppError, AppResult};
use crate::export::export_calendar;
use crate::view::TextView;

/// How far ahead `edit event` looks for matching events.
const EDIT_LOOKAHEAD: Months = Months::new(100 * 12);

/// Whether the session keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// ## Summary
/// One command session: the calendars, the zone resolver and the output.
///
/// Command failures are reported on the output and never end the session;
/// only failures to write the output itself are returned.
pub struct Controller<W: Write> {
    manager: CalendarManager,
    zones: ZoneResolver,
    settings: Settings,
    view: TextView<W>,
}

impl<W: Write> Controller<W> {
    /// ## Summary
    /// Starts a session on the configured default calendar.
    ///
    /// ## Errors
    /// Returns an error if the configured default timezone is unknown.
    pub fn new(settings: Settings, out: W) -> AppResult<Self> {
        let mut zones = ZoneResolver::new();
        let zone = zones.resolve(&settings.calendar.default_timezone)?;
        let manager = CalendarManager::new(settings.calendar.default_name.clone(), zone);
        Ok(Self {
            manager,
            zones,
            settings,
            view: TextView::new(out),
        })
    }

    #[must_use]
    pub const fn manager(&self) -> &CalendarManager {
        &self.manager
    }

    pub fn into_output(self) -> W {
        self.view.into_inner()
    }

    /// ## Summary
    /// Parses and executes one command line.
    ///
    /// ## Errors
    /// Returns `AppError::Io` if the output cannot be written. Every other
    /// failure is rendered as `Invalid command: <line> - <reason>`.
    pub fn process_line(&mut self, line: &str) -> AppResult<Flow> {
        match command::parse(line).and_then(|command| self.execute(command)) {
            Err(AppError::Io(err)) => Err(AppError::Io(err)),
            Err(err) => {
                tracing::warn!(line, error = %err, "Command failed");
                self.view
                    .display(&format!("Invalid command: {line} - {err}"))?;
                Ok(Flow::Continue)
            }
            ok => ok,
        }
    }

    fn current_zone(&self) -> AppResult<Tz> {
        Ok(self.manager.current()?.zone())
    }

    /// ## Summary
    /// Executes an already parsed command.
    ///
    /// ## Errors
    /// Returns the first error raised while carrying it out.
    pub fn execute(&mut self, command: Command) -> AppResult<Flow> {
        match command {
            Command::CreateCalendar { name, timezone } => {
                let zone = self.zones.resolve(&timezone)?;
                self.manager.create_calendar(&name, zone)?;
                self.view.display(&format!("Calendar '{name}' created."))?;
            }
            Command::UseCalendar { name } => {
                self.manager.set_current(&name)?;
                self.view
                    .display(&format!("Switched to calendar '{name}'."))?;
            }
            Command::EditCalendar { name, property } => self.edit_calendar(&name, property)?,
            Command::CreateEvent(spec) => self.create_event(spec)?,
            Command::EditEvent {
                property,
                subject,
                from,
                value,
            } => self.edit_events(&property, &subject, from, &value)?,
            Command::CopyEvent {
                subject,
                source_start,
                target,
                target_start,
            } => self.copy_event(&subject, source_start, &target, target_start)?,
            Command::CopyEventsOn {
                date,
                target,
                target_date,
            } => {
                let report = self.manager.copy_events_on(date, &target, target_date)?;
                self.report_copies(&report, &target)?;
            }
            Command::CopyEventsBetween {
                from_date,
                to_date,
                target,
                target_date,
            } => {
                let report =
                    self.manager
                        .copy_events_between(from_date, to_date, &target, target_date)?;
                self.report_copies(&report, &target)?;
            }
            Command::PrintOn { date, time } => self.print_on(date, time)?,
            Command::PrintRange { from, to } => {
                let zone = self.current_zone()?;
                self.print_between(&localize(from, zone)?, &localize(to, zone)?)?;
            }
            Command::ShowStatus { at } => {
                let at = localize(at, self.current_zone()?)?;
                let status = if self.manager.current()?.is_busy(&at)? {
                    "Busy"
                } else {
                    "Available"
                };
                self.view.display(status)?;
            }
            Command::Export { file } => self.export(&file)?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn edit_calendar(&mut self, name: &str, property: CalendarProperty) -> AppResult<()> {
        match property {
            CalendarProperty::Name(new_name) => {
                self.manager.rename_calendar(name, &new_name)?;
                self.view
                    .display(&format!("Calendar renamed to '{new_name}'."))?;
            }
            CalendarProperty::Timezone(timezone) => {
                let zone = self.zones.resolve(&timezone)?;
                self.manager.set_calendar_timezone(name, zone)?;
                self.view
                    .display(&format!("Timezone updated for '{name}'."))?;
            }
        }
        Ok(())
    }

    fn create_event(&mut self, spec: EventSpec) -> AppResult<()> {
        let zone = self.current_zone()?;
        let (start, end) = match spec.timing {
            Timing::AllDay(date) => (start_of_day(date, zone)?, None),
            Timing::Timed { start, end } => (
                localize(start, zone)?,
                end.map(|end| localize(end, zone)).transpose()?,
            ),
        };

        let visibility = if spec.private {
            Visibility::Private
        } else {
            Visibility::Public
        };
        let mut event = Event::new(spec.subject.as_str(), start, end).with_visibility(visibility);
        event.set_location(spec.location);
        event.set_description(spec.description);

        let subject = spec.subject;
        let Some(repeat) = spec.repeat else {
            let added = self
                .manager
                .current_mut()?
                .add_event(event, spec.auto_decline)?;
            let message = if added {
                format!("Event '{subject}' created.")
            } else {
                "Event declined due to conflict".to_string()
            };
            return Ok(self.view.display(&message)?);
        };

        let mut recurrence = Recurrence::on(repeat.weekdays);
        if let Some(limit) = repeat.occurrences {
            recurrence = recurrence.with_occurrence_limit(limit);
        }
        if let Some(until) = repeat.until {
            recurrence = recurrence.until(localize(until, zone)?);
        }
        let series = RecurringEvent::new(event, recurrence)?;
        let horizon =
            start + TimeDelta::days(i64::from(self.settings.calendar.recurrence_horizon_days));

        let added = self
            .manager
            .current_mut()?
            .add_recurring_event_until(series, &horizon)?;
        let message = if added {
            format!("Recurring event '{subject}' created.")
        } else {
            "Recurring event declined due to conflict".to_string()
        };
        Ok(self.view.display(&message)?)
    }

    fn edit_events(
        &mut self,
        property: &str,
        subject: &str,
        from: NaiveDateTime,
        value: &str,
    ) -> AppResult<()> {
        let from = localize(from, self.current_zone()?)?;
        let until = from
            .checked_add_months(EDIT_LOOKAHEAD)
            .ok_or_else(|| AppError::InvalidCommand(format!("Date out of range: {from}")))?;

        let mut starts: Vec<DateTime<Tz>> = self
            .manager
            .current()?
            .get_events_in_range(&from, &until)?
            .into_iter()
            .filter(|event| event.subject() == subject)
            .map(|event| *event.start())
            .collect();
        starts.dedup();

        let calendar = self.manager.current_mut()?;
        let mut failures = Vec::new();
        for start in &starts {
            if let Err(err) = calendar.edit_event_instance(start, property, value) {
                failures.push(format!("Cannot edit event '{subject}' at {start}: {err}"));
            }
        }
        for failure in &failures {
            self.view.display(failure)?;
        }
        if !starts.is_empty() {
            self.view.display("Events updated where applicable.")?;
        }
        Ok(())
    }

    fn copy_event(
        &mut self,
        subject: &str,
        source_start: NaiveDateTime,
        target: &str,
        target_start: NaiveDateTime,
    ) -> AppResult<()> {
        let source_start = localize(source_start, self.current_zone()?)?;
        let target_start = localize(target_start, self.manager.get_calendar(target)?.zone())?;

        let message = if self
            .manager
            .copy_event(subject, &source_start, target, &target_start)?
        {
            format!("Event '{subject}' copied to '{target}'.")
        } else {
            format!("Cannot copy event '{subject}' due to conflict")
        };
        Ok(self.view.display(&message)?)
    }

    fn report_copies(&mut self, report: &CopyReport, target: &str) -> AppResult<()> {
        for declined in &report.declined {
            self.view.display(&format!(
                "Cannot copy event '{}' due to conflict",
                declined.subject()
            ))?;
        }
        if !report.is_empty() {
            self.view
                .display(&format!("Events copied to '{target}' where applicable."))?;
        }
        Ok(())
    }

    fn print_on(&mut self, date: NaiveDate, time: Option<NaiveTime>) -> AppResult<()> {
        let zone = self.current_zone()?;
        let from = match time {
            Some(time) => localize(date.and_time(time), zone)?,
            None => start_of_day(date, zone)?,
        };
        let next_day = date
            .succ_opt()
            .ok_or_else(|| AppError::InvalidCommand(format!("Date out of range: {date}")))?;
        let to = start_of_day(next_day, zone)? - TimeDelta::seconds(1);
        self.print_between(&from, &to)
    }

    fn print_between(&mut self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> AppResult<()> {
        let events = self.manager.current()?.get_events_in_range(from, to)?;
        Ok(self.view.print_events(&events)?)
    }

    fn export(&mut self, file: &Path) -> AppResult<()> {
        let path = export_calendar(
            self.manager.current()?,
            file,
            self.settings.export.window_years,
            Utc::now(),
        )?;
        self.view
            .display(&format!("Exported to: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::defaults()
            .expect("defaults register")
            .build()
            .expect("config builds")
            .try_deserialize()
            .expect("config deserializes")
    }

    fn session() -> Controller<Vec<u8>> {
        Controller::new(settings(), Vec::new()).expect("default zone resolves")
    }

    fn output(controller: Controller<Vec<u8>>) -> Vec<String> {
        String::from_utf8(controller.into_output())
            .expect("utf-8 output")
            .lines()
            .map(String::from)
            .collect()
    }

    #[test_log::test]
    fn test_session_starts_on_default_calendar() {
        let controller = session();
        let current = controller.manager().current().unwrap();
        assert_eq!(current.name(), "default");
        assert_eq!(current.zone(), Tz::America__New_York);
    }

    #[test_log::test]
    fn test_failure_is_reported_and_session_continues() {
        let mut controller = session();

        let flow = controller.process_line("use calendar --name Missing").unwrap();
        assert_eq!(flow, Flow::Continue);

        assert_eq!(
            output(controller),
            vec!["Invalid command: use calendar --name Missing - Not found: Calendar 'Missing'"]
        );
    }

    #[test_log::test]
    fn test_exit_stops_session() {
        let mut controller = session();
        assert_eq!(controller.process_line("exit").unwrap(), Flow::Exit);
    }

    #[test_log::test]
    fn test_create_and_print() {
        let mut controller = session();
        for line in [
            r#"create event "Team sync" from 2025-03-13 10:00 to 2025-03-13 11:00 --location HQ"#,
            "create event Offsite on 2025-03-13",
            "print events on 2025-03-13",
        ] {
            controller.process_line(line).unwrap();
        }

        assert_eq!(
            output(controller),
            vec![
                "Event 'Team sync' created.",
                "Event 'Offsite' created.",
                "Team sync: 03/13/2025 10:00 to 03/13/2025 11:00 at HQ",
            ]
        );
    }

    #[test_log::test]
    fn test_auto_decline_flag() {
        let mut controller = session();
        controller
            .process_line("create event A from 2025-03-13 10:00 to 2025-03-13 11:00")
            .unwrap();
        controller
            .process_line("create event B from 2025-03-13 10:30 to 2025-03-13 11:30 --autodecline")
            .unwrap();

        assert_eq!(
            output(controller),
            vec!["Event 'A' created.", "Event declined due to conflict"]
        );
    }

    #[test_log::test]
    fn test_edit_reports_bad_property_per_event() {
        let mut controller = session();
        controller
            .process_line("create event A from 2025-03-13 10:00 to 2025-03-13 11:00")
            .unwrap();
        controller
            .process_line("edit event color A from 2025-03-13 09:00 with red")
            .unwrap();

        let lines = output(controller);
        assert!(lines[1].starts_with("Cannot edit event 'A' at 2025-03-13 10:00:00"));
        assert!(lines[1].ends_with("Unknown property: color"));
        assert_eq!(lines[2], "Events updated where applicable.");
    }

    #[test_log::test]
    fn test_unbounded_recurring_series_checked_to_horizon() {
        let mut controller = session();
        controller
            .process_line("create event Trip from 2025-09-01 09:00 to 2025-09-01 17:00")
            .unwrap();
        controller
            .process_line(
                "create recurring event Gym from 2025-03-03 08:00 to 2025-03-03 10:00 --weekdays M",
            )
            .unwrap();

        assert_eq!(
            output(controller),
            vec!["Event 'Trip' created.", "Recurring event declined due to conflict"]
        );
    }
}
