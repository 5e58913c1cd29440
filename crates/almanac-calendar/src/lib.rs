//! Calendars of single and recurring events.
//!
//! ## Summary
//! A [`CalendarManager`] owns named [`Calendar`]s and tracks which one is
//! current. Each calendar stores [`Entry`] values, either a single [`Event`]
//! or a [`RecurringEvent`] template that is expanded on demand, and answers
//! conflict, range and busy queries over absolute instants.

pub mod calendar;
pub mod copy;
pub mod edit;
pub mod error;
pub mod event;
pub mod manager;
pub mod recurrence;

pub use calendar::{Calendar, Entry};
pub use copy::CopyReport;
pub use edit::EventEdit;
pub use error::{CalendarError, CalendarResult};
pub use event::{Event, Visibility};
pub use manager::{CalendarId, CalendarManager};
pub use recurrence::{InstanceOverride, Occurrence, Recurrence, RecurringEvent, TimeWindow};
