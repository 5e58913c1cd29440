//! Registry of named calendars.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use almanac_core::constants::DEFAULT_CALENDAR_NAME;
use almanac_core::error::CoreError;
use almanac_time::Tz;
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::error::{CalendarError, CalendarResult};

const UNREGISTERED_CURRENT: &str = "current calendar is not registered";

/// Stable identity of a calendar; survives renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarId(Uuid);

impl CalendarId {
    fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ## Summary
/// Owns every calendar of a session and tracks the current one.
///
/// There is always at least one calendar and the current id always names a
/// registered calendar. Every operation validates before mutating, so a
/// failed call leaves the registry unchanged.
#[derive(Debug, Clone)]
pub struct CalendarManager {
    calendars: BTreeMap<CalendarId, Calendar>,
    names: HashMap<String, CalendarId>,
    current: CalendarId,
}

impl CalendarManager {
    /// Creates a manager holding one calendar, which becomes current.
    #[must_use]
    pub fn new(name: impl Into<String>, zone: Tz) -> Self {
        let name = name.into();
        let id = CalendarId::generate();
        tracing::debug!(calendar = %name, zone = %zone, "Created baseline calendar");
        Self {
            names: HashMap::from([(name.clone(), id)]),
            calendars: BTreeMap::from([(id, Calendar::new(name, zone))]),
            current: id,
        }
    }

    fn id_of(&self, name: &str) -> CalendarResult<CalendarId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| CalendarError::NotFound(format!("Calendar '{name}'")))
    }

    fn ensure_available(&self, name: &str) -> CalendarResult<()> {
        if name.trim().is_empty() {
            return Err(CalendarError::InvalidArgument(
                "Calendar name cannot be empty".to_string(),
            ));
        }
        if self.names.contains_key(name) {
            return Err(CalendarError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// ## Summary
    /// Registers a new, empty calendar. The current calendar is unchanged.
    ///
    /// ## Errors
    /// Returns `CalendarError::DuplicateName` if `name` is taken, or
    /// `CalendarError::InvalidArgument` if it is blank.
    pub fn create_calendar(&mut self, name: &str, zone: Tz) -> CalendarResult<CalendarId> {
        self.ensure_available(name)?;
        let id = CalendarId::generate();
        self.calendars.insert(id, Calendar::new(name, zone));
        self.names.insert(name.to_string(), id);
        tracing::debug!(calendar = name, zone = %zone, %id, "Created calendar");
        Ok(id)
    }

    /// ## Summary
    /// Makes `name` the current calendar.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if no calendar has that name.
    pub fn set_current(&mut self, name: &str) -> CalendarResult<()> {
        self.current = self.id_of(name)?;
        tracing::debug!(calendar = name, "Switched current calendar");
        Ok(())
    }

    #[must_use]
    pub const fn current_id(&self) -> CalendarId {
        self.current
    }

    /// ## Errors
    /// Returns `CoreError::InvariantViolation` if the current id is dangling,
    /// which no sequence of public calls can produce.
    pub fn current(&self) -> CalendarResult<&Calendar> {
        self.calendars
            .get(&self.current)
            .ok_or(CoreError::InvariantViolation(UNREGISTERED_CURRENT).into())
    }

    /// ## Errors
    /// Returns `CoreError::InvariantViolation` if the current id is dangling.
    pub fn current_mut(&mut self) -> CalendarResult<&mut Calendar> {
        self.calendars
            .get_mut(&self.current)
            .ok_or(CoreError::InvariantViolation(UNREGISTERED_CURRENT).into())
    }

    /// ## Errors
    /// Returns `CalendarError::NotFound` if no calendar has that name.
    pub fn get_calendar(&self, name: &str) -> CalendarResult<&Calendar> {
        let id = self.id_of(name)?;
        self.calendars
            .get(&id)
            .ok_or_else(|| CoreError::InvariantViolation("name index is out of sync").into())
    }

    /// ## Errors
    /// Returns `CalendarError::NotFound` if no calendar has that name.
    pub fn calendar_mut(&mut self, name: &str) -> CalendarResult<&mut Calendar> {
        let id = self.id_of(name)?;
        self.calendars
            .get_mut(&id)
            .ok_or_else(|| CoreError::InvariantViolation("name index is out of sync").into())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Calendars in creation order.
    pub fn calendars(&self) -> impl Iterator<Item = &Calendar> {
        self.calendars.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    /// Always false; kept for parity with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }

    /// ## Summary
    /// Renames a calendar. Whether it is current does not change.
    ///
    /// ## Errors
    /// Returns `CalendarError::DuplicateName` if `new_name` is taken, then
    /// `CalendarError::NotFound` if `old_name` does not exist.
    pub fn rename_calendar(&mut self, old_name: &str, new_name: &str) -> CalendarResult<()> {
        self.ensure_available(new_name)?;
        let id = self.id_of(old_name)?;
        let calendar = self
            .calendars
            .get_mut(&id)
            .ok_or(CoreError::InvariantViolation("name index is out of sync"))?;
        calendar.set_name(new_name);
        self.names.remove(old_name);
        self.names.insert(new_name.to_string(), id);
        tracing::debug!(from = old_name, to = new_name, %id, "Renamed calendar");
        Ok(())
    }

    /// ## Summary
    /// Re-expresses a calendar and its events in `zone`.
    ///
    /// ## Errors
    /// Returns `CalendarError::NotFound` if no calendar has that name.
    pub fn set_calendar_timezone(&mut self, name: &str, zone: Tz) -> CalendarResult<()> {
        self.calendar_mut(name)?.set_zone(zone);
        Ok(())
    }

    /// ## Summary
    /// Removes a calendar. Deleting the current calendar makes the oldest
    /// remaining calendar current.
    ///
    /// ## Errors
    /// Returns `CalendarError::LastCalendar` if it is the only calendar, then
    /// `CalendarError::NotFound` if no calendar has that name.
    pub fn delete_calendar(&mut self, name: &str) -> CalendarResult<()> {
        if self.calendars.len() <= 1 {
            return Err(CalendarError::LastCalendar);
        }
        let id = self.id_of(name)?;
        self.calendars.remove(&id);
        self.names.remove(name);

        if self.current == id {
            self.current = *self
                .calendars
                .keys()
                .next()
                .ok_or(CoreError::InvariantViolation("no calendar left after delete"))?;
            tracing::debug!(
                deleted = name,
                current = %self.current,
                "Reassigned current calendar"
            );
        }
        tracing::debug!(calendar = name, %id, "Deleted calendar");
        Ok(())
    }
}

impl Default for CalendarManager {
    fn default() -> Self {
        Self::new(DEFAULT_CALENDAR_NAME, Tz::America__New_York)
    }
}
