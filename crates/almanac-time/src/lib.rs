//! Zone resolution, wall-clock parsing and weekday selection.

pub mod error;
pub mod format;
pub mod weekday;
pub mod zone;

pub use chrono_tz::Tz;
pub use weekday::WeekdayMask;
pub use zone::{ZoneResolver, localize, reproject};
