use thiserror::Error;

/// Errors raised while resolving zones or interpreting wall-clock input.
#[derive(Error, Debug)]
pub enum TimeError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent time during DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    #[error("Unrecognized weekday token: {0}")]
    InvalidWeekday(char),

    #[error("Invalid date-time format: {0}")]
    InvalidFormat(String),
}

pub type TimeResult<T> = std::result::Result<T, TimeError>;
