use thiserror::Error;

/// Application-level errors (command layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    CalendarError(#[from] almanac_calendar::CalendarError),

    #[error(transparent)]
    TimeError(#[from] almanac_time::error::TimeError),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    #[error("{0}")]
    InvalidCommand(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
