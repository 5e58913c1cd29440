//! CSV export of a calendar.

use std::fs;
use std::path::{Path, PathBuf};

use almanac_calendar::{Calendar, Event};
use almanac_core::constants::{
    DISPLAY_DATE_FORMAT, EXPORT_ALL_DAY_START_TIME, EXPORT_HEADER, EXPORT_TIME_FORMAT,
};
use almanac_time::Tz;
use chrono::{DateTime, Months, Utc};

use crate::error::{AppError, AppResult};

/// Quotes a CSV field containing a comma, quote or newline, doubling any
/// embedded quotes.
#[must_use]
pub fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(event: &Event, zone: Tz) -> String {
    let start = event.start().with_timezone(&zone);
    let start_date = start.format(DISPLAY_DATE_FORMAT).to_string();
    let (start_time, end_date, end_time) = match event.end() {
        Some(end) => {
            let end = end.with_timezone(&zone);
            (
                start.format(EXPORT_TIME_FORMAT).to_string(),
                end.format(DISPLAY_DATE_FORMAT).to_string(),
                end.format(EXPORT_TIME_FORMAT).to_string(),
            )
        }
        None => (
            EXPORT_ALL_DAY_START_TIME.to_string(),
            start_date.clone(),
            String::new(),
        ),
    };
    let private = if event.is_public() { "No" } else { "Yes" };

    [
        quote_field(event.subject()),
        start_date,
        start_time,
        end_date,
        end_time,
        quote_field(event.location().unwrap_or_default()),
        quote_field(event.description().unwrap_or_default()),
        private.to_string(),
        zone.name().to_string(),
    ]
    .join(",")
}

/// ## Summary
/// Renders the calendar's events between `from` and `to` as CSV, header
/// included, with times in the calendar zone.
///
/// ## Errors
/// Returns an error if a recurring series cannot be expanded.
pub fn render_csv(
    calendar: &Calendar,
    from: &DateTime<Tz>,
    to: &DateTime<Tz>,
) -> AppResult<String> {
    let zone = calendar.zone();
    let mut csv = String::from(EXPORT_HEADER);
    csv.push('\n');
    for event in calendar.get_events_in_range(from, to)? {
        csv.push_str(&row(&event, zone));
        csv.push('\n');
    }
    Ok(csv)
}

/// ## Summary
/// Writes every event within `window_years` of `now` to `path` and returns
/// the absolute path written.
///
/// ## Errors
/// Returns `AppError::ExportFailed` if the window is out of range or the file
/// cannot be written.
pub fn export_calendar(
    calendar: &Calendar,
    path: &Path,
    window_years: u32,
    now: DateTime<Utc>,
) -> AppResult<PathBuf> {
    let now = now.with_timezone(&calendar.zone());
    let window = Months::new(window_years.saturating_mul(12));
    let (from, to) = now
        .checked_sub_months(window)
        .zip(now.checked_add_months(window))
        .ok_or_else(|| {
            AppError::ExportFailed(format!("window of {window_years} years is out of range"))
        })?;

    let csv = render_csv(calendar, &from, &to)?;
    let absolute =
        std::path::absolute(path).map_err(|e| AppError::ExportFailed(e.to_string()))?;
    fs::write(&absolute, csv).map_err(|e| AppError::ExportFailed(e.to_string()))?;

    tracing::info!(
        calendar = calendar.name(),
        path = %absolute.display(),
        "Exported calendar"
    );
    Ok(absolute)
}
