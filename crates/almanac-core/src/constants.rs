/// Name of the calendar every manager starts with.
pub const DEFAULT_CALENDAR_NAME: &str = "default";
/// Baseline zone of the default calendar.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Conflict-check horizon for recurring series with neither a count nor an end.
pub const DEFAULT_RECURRENCE_HORIZON_DAYS: u32 = 365;
/// Half-width of the window the exporter queries around "now".
pub const DEFAULT_EXPORT_WINDOW_YEARS: u32 = 100;

/// Command input: `yyyy-MM-dd`.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Command input: `HH:mm`.
pub const INPUT_TIME_FORMAT: &str = "%H:%M";
/// Command input: `yyyy-MM-dd HH:mm`.
pub const INPUT_DATE_TIME_FORMAT: &str =
    const_str::concat!(INPUT_DATE_FORMAT, " ", INPUT_TIME_FORMAT);

/// Printed output: `MM/dd/yyyy`.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";
/// Printed output: `MM/dd/yyyy HH:mm`.
pub const DISPLAY_DATE_TIME_FORMAT: &str =
    const_str::concat!(DISPLAY_DATE_FORMAT, " ", INPUT_TIME_FORMAT);

/// CSV export time column: `HH:mm:ss`.
pub const EXPORT_TIME_FORMAT: &str = const_str::concat!(INPUT_TIME_FORMAT, ":%S");
/// Start time written for all-day rows.
pub const EXPORT_ALL_DAY_START_TIME: &str = "00:00";
pub const EXPORT_HEADER: &str =
    "Subject,Start Date,Start Time,End Date,End Time,Location,Description,Private,ZoneID";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "ALMANAC";
/// Optional configuration file (any format the `config` crate detects).
pub const CONFIG_FILE_NAME: &str = "almanac";
