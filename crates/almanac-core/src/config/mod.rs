use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_CALENDAR_NAME, DEFAULT_EXPORT_WINDOW_YEARS,
    DEFAULT_RECURRENCE_HORIZON_DAYS, DEFAULT_TIMEZONE, ENV_PREFIX,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Name of the calendar a new session starts on.
    pub default_name: String,
    /// Zone identifier of that calendar.
    pub default_timezone: String,
    /// How far ahead an unbounded recurring series is checked for conflicts.
    pub recurrence_horizon_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub window_years: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Returns a builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("calendar.default_name", DEFAULT_CALENDAR_NAME)?
            .set_default("calendar.default_timezone", DEFAULT_TIMEZONE)?
            .set_default(
                "calendar.recurrence_horizon_days",
                i64::from(DEFAULT_RECURRENCE_HORIZON_DAYS),
            )?
            .set_default("export.window_years", i64::from(DEFAULT_EXPORT_WINDOW_YEARS))?
            .set_default("logging.level", "warn")?)
    }

    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `almanac.toml`. Environment variables take precedence over defaults, the
    /// file takes precedence over both.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(config::Case::Snake)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        tracing::debug!(
            default_calendar = %settings.calendar.default_name,
            default_timezone = %settings.calendar.default_timezone,
            log_level = %settings.logging.level,
            "Loaded configuration"
        );
        Ok(settings)
    }

    /// ## Summary
    /// Rejects values that would leave the application without a usable window.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` naming the offending key.
    pub fn validate(&self) -> CoreResult<()> {
        if self.calendar.default_name.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "calendar.default_name must not be empty".to_string(),
            ));
        }
        if self.calendar.recurrence_horizon_days == 0 {
            return Err(CoreError::ConfigError(
                "calendar.recurrence_horizon_days must be positive".to_string(),
            ));
        }
        if self.export.window_years == 0 {
            return Err(CoreError::ConfigError(
                "export.window_years must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables, `.env` and `almanac.toml`.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
