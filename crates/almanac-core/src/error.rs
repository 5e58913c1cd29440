use thiserror::Error;

/// Failures shared by every almanac crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A setting loaded from file or environment is unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal bookkeeping disagrees with itself.
    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
