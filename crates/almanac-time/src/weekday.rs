//! Weekday selection for recurring series.

use std::fmt;

use chrono::Weekday;

use crate::error::{TimeError, TimeResult};

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays a recurring series falls on.
///
/// Written as one letter per day: `M`, `T`, `W`, `R` (Thursday), `F`, `S`,
/// `U` (Sunday). The empty mask selects every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    /// The empty mask, which matches every day.
    pub const EVERY_DAY: Self = Self(0);

    /// ## Summary
    /// Parses a run of weekday letters such as `"MWF"`. Case and surrounding
    /// whitespace are ignored; repeated letters are harmless.
    ///
    /// ## Errors
    /// Returns `TimeError::InvalidWeekday` for any character that is not a
    /// weekday letter.
    pub fn parse(tokens: &str) -> TimeResult<Self> {
        tokens
            .trim()
            .chars()
            .try_fold(Self::EVERY_DAY, |mask, token| {
                Self::day_for_token(token)
                    .map(|day| mask.with(day))
                    .ok_or(TimeError::InvalidWeekday(token))
            })
    }

    /// Returns the mask with `day` added.
    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | Self::bit(day))
    }

    /// True when no day was selected (the series runs daily).
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `day` was explicitly selected.
    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    /// Selected days, Monday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        ALL_DAYS.into_iter().filter(move |day| self.contains(*day))
    }

    /// Letter used for `day`.
    #[must_use]
    pub const fn token(day: Weekday) -> char {
        match day {
            Weekday::Mon => 'M',
            Weekday::Tue => 'T',
            Weekday::Wed => 'W',
            Weekday::Thu => 'R',
            Weekday::Fri => 'F',
            Weekday::Sat => 'S',
            Weekday::Sun => 'U',
        }
    }

    fn day_for_token(token: char) -> Option<Weekday> {
        match token.to_ascii_uppercase() {
            'M' => Some(Weekday::Mon),
            'T' => Some(Weekday::Tue),
            'W' => Some(Weekday::Wed),
            'R' => Some(Weekday::Thu),
            'F' => Some(Weekday::Fri),
            'S' => Some(Weekday::Sat),
            'U' => Some(Weekday::Sun),
            _ => None,
        }
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }
}

impl FromIterator<Weekday> for WeekdayMask {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EVERY_DAY, Self::with)
    }
}

impl fmt::Display for WeekdayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.days().try_for_each(|day| write!(f, "{}", Self::token(day)))
    }
}

impl std::str::FromStr for WeekdayMask {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
