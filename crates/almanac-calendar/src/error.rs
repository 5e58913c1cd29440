use almanac_time::error::TimeError;
use thiserror::Error;

/// Calendar-level errors
///
/// A declined insertion is not an error; `add_event` and friends report it
/// as `Ok(false)`.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Calendar name already exists: {0}")]
    DuplicateName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot delete the last calendar")]
    LastCalendar,

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),
}

impl From<TimeError> for CalendarError {
    fn from(err: TimeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

pub type CalendarResult<T> = std::result::Result<T, CalendarError>;
