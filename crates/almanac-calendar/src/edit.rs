//! Single-property edits applied to events.

use almanac_time::Tz;
use almanac_time::format::parse_zoned;
use chrono::DateTime;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, Visibility};

/// A change to one property of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEdit {
    Subject(String),
    Location(Option<String>),
    Description(Option<String>),
    Start(DateTime<Tz>),
    End(Option<DateTime<Tz>>),
    Visibility(Visibility),
}

impl EventEdit {
    /// ## Summary
    /// Builds an edit from a property name and its textual value.
    ///
    /// Property names are case-insensitive: `subject` (or `name`), `location`,
    /// `description`, `start`, `end`, `visibility` (or `public`). Times use the
    /// `yyyy-MM-dd HH:mm` input format in `zone`. An empty location or
    /// description clears it.
    ///
    /// ## Errors
    /// Returns `CalendarError::InvalidArgument` for an unknown property or a
    /// value that does not parse.
    pub fn parse(property: &str, value: &str, zone: Tz) -> CalendarResult<Self> {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        match property.to_lowercase().as_str() {
            "subject" | "name" => Ok(Self::Subject(value.to_string())),
            "location" => Ok(Self::Location(optional(value))),
            "description" => Ok(Self::Description(optional(value))),
            "start" => Ok(Self::Start(parse_zoned(value, zone)?)),
            "end" => Ok(Self::End(Some(parse_zoned(value, zone)?))),
            "visibility" | "public" => Ok(Self::Visibility(Visibility::parse(value)?)),
            _ => Err(CalendarError::InvalidArgument(format!(
                "Unknown property: {property}"
            ))),
        }
    }

    /// Name of the edited property.
    #[must_use]
    pub const fn property(&self) -> &'static str {
        match self {
            Self::Subject(_) => "subject",
            Self::Location(_) => "location",
            Self::Description(_) => "description",
            Self::Start(_) => "start",
            Self::End(_) => "end",
            Self::Visibility(_) => "visibility",
        }
    }

    pub fn apply(&self, event: &mut Event) {
        match self {
            Self::Subject(subject) => event.set_subject(subject.clone()),
            Self::Location(location) => event.set_location(location.clone()),
            Self::Description(description) => event.set_description(description.clone()),
            Self::Start(start) => event.set_start(*start),
            Self::End(end) => event.set_end(*end),
            Self::Visibility(visibility) => event.set_visibility(*visibility),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    const NY: Tz = Tz::America__New_York;

    fn meeting() -> Event {
        let start = NY.with_ymd_and_hms(2025, 3, 13, 10, 0, 0).unwrap();
        Event::new("Meeting", start, Some(start + chrono::TimeDelta::hours(1)))
    }

    #[test]
    fn test_parse_known_properties() {
        assert_eq!(
            EventEdit::parse("NAME", "Review", NY).unwrap(),
            EventEdit::Subject("Review".to_string())
        );
        assert_eq!(
            EventEdit::parse("location", "", NY).unwrap(),
            EventEdit::Location(None)
        );
        assert_eq!(
            EventEdit::parse("public", "false", NY).unwrap(),
            EventEdit::Visibility(Visibility::Private)
        );
    }

    #[test]
    fn test_parse_unknown_property() {
        let err = EventEdit::parse("color", "red", NY).unwrap_err();
        assert!(matches!(
            err,
            CalendarError::InvalidArgument(msg) if msg == "Unknown property: color"
        ));
    }

    #[test]
    fn test_parse_bad_time() {
        let result = EventEdit::parse("start", "tomorrow", NY);
        assert!(matches!(result, Err(CalendarError::InvalidArgument(_))));
    }

    #[test]
    fn test_apply_start_keeps_zone() {
        let mut event = meeting();
        let edit = EventEdit::parse("start", "2025-03-13 09:30", NY).unwrap();

        edit.apply(&mut event);

        assert_eq!(event.start().hour(), 9);
        assert_eq!(event.start().minute(), 30);
        assert_eq!(event.zone(), NY);
    }

    #[test]
    fn test_apply_description() {
        let mut event = meeting();
        EventEdit::Description(Some("Quarterly".to_string())).apply(&mut event);
        assert_eq!(event.description(), Some("Quarterly"));
    }
}
