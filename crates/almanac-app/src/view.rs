//! Plain-text rendering of command results.

use std::io::{self, Write};

use almanac_calendar::Event;
use almanac_time::format::display_date_time;

const NO_END_TIME: &str = "No end time";
const NO_LOCATION: &str = "No location";
const NO_EVENTS: &str = "No events to display.";

/// `subject: start to end at location`, with placeholders for a missing end
/// or location.
#[must_use]
pub fn format_event(event: &Event) -> String {
    let end = event
        .end()
        .map_or_else(|| NO_END_TIME.to_string(), display_date_time);
    format!(
        "{}: {} to {} at {}",
        event.subject(),
        display_date_time(event.start()),
        end,
        event.location().unwrap_or(NO_LOCATION)
    )
}

/// Writes messages and event listings, one per line.
pub struct TextView<W: Write> {
    out: W,
}

impl<W: Write> TextView<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// ## Errors
    /// Returns an error if the output cannot be written.
    pub fn display(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }

    /// ## Errors
    /// Returns an error if the output cannot be written.
    pub fn print_events(&mut self, events: &[Event]) -> io::Result<()> {
        if events.is_empty() {
            return self.display(NO_EVENTS);
        }
        for event in events {
            writeln!(self.out, "{}", format_event(event))?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
