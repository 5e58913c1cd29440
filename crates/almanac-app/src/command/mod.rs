//! Text commands and their parser.
//!
//! Commands are parsed into wall-clock values; the controller places them in
//! the zone of the calendar they apply to.

mod tokenize;

use std::path::PathBuf;

use almanac_time::WeekdayMask;
use almanac_time::format::{parse_date, parse_date_time};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AppError, AppResult};

pub use tokenize::tokenize;

/// Calendar property changed by `edit calendar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarProperty {
    Name(String),
    Timezone(String),
}

/// When a created event happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// `on <date>`
    AllDay(NaiveDate),
    /// `from <date> <time> [to <date> <time>]`
    Timed {
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    },
}

/// Repetition requested by `create recurring event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSpec {
    pub weekdays: WeekdayMask,
    pub occurrences: Option<u32>,
    pub until: Option<NaiveDateTime>,
}

/// Everything `create [recurring] event` carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub subject: String,
    pub timing: Timing,
    pub repeat: Option<RepeatSpec>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub private: bool,
    pub auto_decline: bool,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateCalendar {
        name: String,
        timezone: String,
    },
    UseCalendar {
        name: String,
    },
    EditCalendar {
        name: String,
        property: CalendarProperty,
    },
    CreateEvent(EventSpec),
    EditEvent {
        property: String,
        subject: String,
        from: NaiveDateTime,
        value: String,
    },
    CopyEvent {
        subject: String,
        source_start: NaiveDateTime,
        target: String,
        target_start: NaiveDateTime,
    },
    CopyEventsOn {
        date: NaiveDate,
        target: String,
        target_date: NaiveDate,
    },
    CopyEventsBetween {
        from_date: NaiveDate,
        to_date: NaiveDate,
        target: String,
        target_date: NaiveDate,
    },
    PrintOn {
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
    PrintRange {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    ShowStatus {
        at: NaiveDateTime,
    },
    Export {
        file: PathBuf,
    },
    Exit,
}

fn invalid(reason: impl Into<String>) -> AppError {
    AppError::InvalidCommand(reason.into())
}

/// Cursor over the tokens of one command line.
struct Tokens {
    tokens: Vec<String>,
    pos: usize,
}

impl Tokens {
    fn next(&mut self, what: &str) -> AppResult<String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| invalid(format!("Missing {what}")))?;
        self.pos += 1;
        Ok(token)
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
    }

    fn eat(&mut self, keyword: &str) -> bool {
        let matched = self.peek_is(keyword);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn expect(&mut self, keyword: &str) -> AppResult<()> {
        let token = self.next(&format!("'{keyword}'"))?;
        if token.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(invalid(format!("Expected '{keyword}' but found '{token}'")))
        }
    }

    fn date(&mut self) -> AppResult<NaiveDate> {
        Ok(parse_date(&self.next("date")?)?)
    }

    fn date_time(&mut self) -> AppResult<NaiveDateTime> {
        let date = self.next("date")?;
        let time = self.next("time")?;
        Ok(parse_date_time(&format!("{date} {time}"))?)
    }

    fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn finish(&self) -> AppResult<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(extra) => Err(invalid(format!("Unexpected argument: {extra}"))),
        }
    }
}

/// ## Summary
/// Parses one command line.
///
/// ## Errors
/// Returns `AppError::InvalidCommand` when the line does not follow the
/// command grammar, or a `TimeError` when a date or weekday token is
/// malformed.
pub fn parse(line: &str) -> AppResult<Command> {
    let mut tokens = Tokens {
        tokens: tokenize(line),
        pos: 0,
    };
    let verb = tokens.next("command")?.to_lowercase();
    let command = match verb.as_str() {
        "create" if tokens.eat("calendar") => parse_create_calendar(&mut tokens)?,
        "create" => parse_create_event(&mut tokens)?,
        "use" => parse_use_calendar(&mut tokens)?,
        "edit" if tokens.eat("calendar") => parse_edit_calendar(&mut tokens)?,
        "edit" => parse_edit_event(&mut tokens)?,
        "copy" => parse_copy(&mut tokens)?,
        "print" => parse_print(&mut tokens)?,
        "show" => parse_show(&mut tokens)?,
        "export" => parse_export(&mut tokens)?,
        "exit" => Command::Exit,
        other => return Err(invalid(format!("Unknown command: {other}"))),
    };
    tokens.finish()?;
    Ok(command)
}

fn parse_create_calendar(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("--name")?;
    let name = tokens.next("calendar name")?;
    tokens.expect("--timezone")?;
    let timezone = tokens.next("timezone")?;
    Ok(Command::CreateCalendar { name, timezone })
}

fn parse_use_calendar(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("calendar")?;
    tokens.expect("--name")?;
    Ok(Command::UseCalendar {
        name: tokens.next("calendar name")?,
    })
}

fn parse_edit_calendar(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("--name")?;
    let name = tokens.next("calendar name")?;
    tokens.expect("--property")?;
    let property = tokens.next("property")?;
    let value = tokens.next("property value")?;
    let property = match property.to_lowercase().as_str() {
        "name" => CalendarProperty::Name(value),
        "timezone" => CalendarProperty::Timezone(value),
        _ => return Err(invalid(format!("Unknown property: {property}"))),
    };
    Ok(Command::EditCalendar { name, property })
}

fn parse_create_event(tokens: &mut Tokens) -> AppResult<Command> {
    let recurring = tokens.eat("recurring");
    tokens.expect("event")?;
    let subject = tokens.next("event subject")?;

    let timing = if tokens.eat("on") {
        Timing::AllDay(tokens.date()?)
    } else if tokens.eat("from") {
        let start = tokens.date_time()?;
        let end = if tokens.eat("to") {
            Some(tokens.date_time()?)
        } else {
            None
        };
        Timing::Timed { start, end }
    } else {
        return Err(invalid("Expected 'on' or 'from'"));
    };

    let mut weekdays = None;
    let mut occurrences = None;
    let mut until = None;
    let mut spec = EventSpec {
        subject,
        timing,
        repeat: None,
        location: None,
        description: None,
        private: false,
        auto_decline: false,
    };

    while !tokens.is_done() {
        let flag = tokens.next("option")?;
        match flag.to_lowercase().as_str() {
            "--weekdays" => weekdays = Some(WeekdayMask::parse(&tokens.next("weekdays")?)?),
            "--occurrences" => {
                let count = tokens.next("occurrence count")?;
                occurrences = Some(
                    count
                        .parse::<u32>()
                        .map_err(|_e| invalid(format!("Invalid occurrence count: {count}")))?,
                );
            }
            "--end-date" => until = Some(tokens.date_time()?),
            "--location" => spec.location = Some(tokens.next("location")?),
            "--description" => spec.description = Some(tokens.next("description")?),
            "--private" => spec.private = true,
            "--autodecline" => spec.auto_decline = true,
            _ => return Err(invalid(format!("Unknown parameter: {flag}"))),
        }
    }

    if recurring {
        let weekdays =
            weekdays.ok_or_else(|| invalid("--weekdays required for recurring events"))?;
        spec.repeat = Some(RepeatSpec {
            weekdays,
            occurrences,
            until,
        });
    } else if weekdays.is_some() || occurrences.is_some() || until.is_some() {
        return Err(invalid("Recurrence options require 'create recurring event'"));
    }
    Ok(Command::CreateEvent(spec))
}

fn parse_edit_event(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("event")?;
    let property = tokens.next("property")?;
    let subject = tokens.next("event subject")?;
    tokens.expect("from")?;
    let from = tokens.date_time()?;
    tokens.expect("with")?;
    let value = tokens.next("new value")?;
    Ok(Command::EditEvent {
        property,
        subject,
        from,
        value,
    })
}

fn parse_copy(tokens: &mut Tokens) -> AppResult<Command> {
    if tokens.eat("event") {
        let subject = tokens.next("event subject")?;
        tokens.expect("on")?;
        let source_start = tokens.date_time()?;
        tokens.expect("--target")?;
        let target = tokens.next("target calendar")?;
        tokens.expect("to")?;
        let target_start = tokens.date_time()?;
        return Ok(Command::CopyEvent {
            subject,
            source_start,
            target,
            target_start,
        });
    }

    tokens.expect("events")?;
    if tokens.eat("on") {
        let date = tokens.date()?;
        tokens.expect("--target")?;
        let target = tokens.next("target calendar")?;
        tokens.expect("to")?;
        let target_date = tokens.date()?;
        Ok(Command::CopyEventsOn {
            date,
            target,
            target_date,
        })
    } else if tokens.eat("between") {
        let from_date = tokens.date()?;
        tokens.expect("and")?;
        let to_date = tokens.date()?;
        tokens.expect("--target")?;
        let target = tokens.next("target calendar")?;
        tokens.expect("to")?;
        let target_date = tokens.date()?;
        Ok(Command::CopyEventsBetween {
            from_date,
            to_date,
            target,
            target_date,
        })
    } else {
        Err(invalid("Invalid copy command"))
    }
}

fn parse_print(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("events")?;
    if tokens.eat("on") {
        let date = tokens.date()?;
        let time = if tokens.is_done() {
            None
        } else {
            Some(almanac_time::format::parse_time(&tokens.next("time")?)?)
        };
        Ok(Command::PrintOn { date, time })
    } else if tokens.eat("from") {
        let from = tokens.date_time()?;
        tokens.expect("to")?;
        let to = tokens.date_time()?;
        Ok(Command::PrintRange { from, to })
    } else {
        Err(invalid("Expected 'on' or 'from'"))
    }
}

fn parse_show(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("status")?;
    tokens.eat("on");
    Ok(Command::ShowStatus {
        at: tokens.date_time()?,
    })
}

fn parse_export(tokens: &mut Tokens) -> AppResult<Command> {
    tokens.expect("cal")?;
    Ok(Command::Export {
        file: PathBuf::from(tokens.next("file name")?),
    })
}
