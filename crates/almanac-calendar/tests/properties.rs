//! Behavioral properties of the calendar core, exercised through the public API.

use almanac_calendar::{
    Calendar, CalendarError, CalendarManager, Event, Recurrence, RecurringEvent, Visibility,
};
use almanac_time::{Tz, WeekdayMask};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Timelike};

const NY: Tz = Tz::America__New_York;
const TOKYO: Tz = Tz::Asia__Tokyo;

fn ny(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    NY.with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .unwrap()
}

fn timed(subject: &str, start: DateTime<Tz>, minutes: i64) -> Event {
    Event::new(subject, start, Some(start + TimeDelta::minutes(minutes)))
}

fn monday_standups() -> RecurringEvent {
    RecurringEvent::new(
        timed("Standup", ny(3, 3, 10, 0), 60),
        Recurrence::on(WeekdayMask::parse("M").unwrap()).with_occurrence_limit(3),
    )
    .unwrap()
}

/// A spread of events covering overlap, adjacency, containment, all-day and
/// zero-length shapes, across two zones.
fn sample_events() -> Vec<Event> {
    let base = ny(3, 13, 8, 0);
    let mut events = Vec::new();
    for offset in [0_i64, 30, 60, 90, 120, 24 * 60] {
        for length in [0_i64, 30, 60, 180] {
            let start = base + TimeDelta::minutes(offset);
            events.push(timed("sample", start, length));
            events.push(timed("sample", start.with_timezone(&TOKYO), length));
        }
    }
    events.push(Event::all_day("all day", ny(3, 13, 0, 0)));
    events.push(Event::all_day("all day", ny(3, 14, 0, 0)));
    events
}

#[test_log::test]
fn conflict_is_symmetric() {
    let events = sample_events();
    for a in &events {
        for b in &events {
            assert_eq!(a.conflicts_with(b), b.conflicts_with(a), "{a} vs {b}");
        }
    }
}

#[test_log::test]
fn adjacent_events_never_conflict() {
    let events = sample_events();
    for a in &events {
        for b in &events {
            if a.end() == Some(b.start()) {
                assert!(!a.conflicts_with(b), "{a} vs {b}");
            }
        }
    }
}

#[test_log::test]
fn zero_length_events_never_conflict() {
    let events = sample_events();
    for point in events.iter().filter(|e| e.duration() == TimeDelta::zero()) {
        for other in &events {
            assert!(!point.conflicts_with(other), "{point} vs {other}");
        }
    }
}

#[test_log::test]
fn range_query_is_strict_on_both_ends() {
    let mut calendar = Calendar::new("Work", NY);
    for event in sample_events() {
        calendar.add_event(event, false).unwrap();
    }
    calendar.add_recurring_event(monday_standups()).unwrap();

    let windows = [
        (ny(3, 13, 8, 0), ny(3, 13, 11, 0)),
        (ny(3, 13, 8, 30), ny(3, 13, 10, 0)),
        (ny(3, 1, 0, 0), ny(3, 31, 0, 0)),
        (ny(3, 10, 10, 0), ny(3, 17, 11, 0)),
    ];
    for (from, to) in windows {
        for event in calendar.get_events_in_range(&from, &to).unwrap() {
            assert!(*event.start() > from, "{event} starts at or before {from}");
            if let Some(end) = event.end() {
                assert!(*end < to, "{event} ends at or after {to}");
            }
        }
    }
}

#[test_log::test]
fn weekly_series_expands_on_seven_day_stride() {
    let events = monday_standups().expand_all().unwrap();

    let starts: Vec<NaiveDate> = events.iter().map(|e| e.start().date_naive()).collect();
    assert_eq!(
        starts,
        vec![
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 17).unwrap(),
        ]
    );
    for event in &events {
        assert_eq!(event.start().hour(), 10);
        assert_eq!(event.duration(), TimeDelta::hours(1));
    }
}

#[test_log::test]
fn exception_replaces_only_its_occurrence() {
    let mut series = monday_standups();
    let second = ny(3, 10, 10, 0);
    series
        .replace_occurrence(&second, timed("Canceled", second, 60))
        .unwrap();

    let mut calendar = Calendar::new("Work", NY);
    assert!(calendar.add_recurring_event(series).unwrap());

    let events = calendar
        .get_events_in_range(&ny(3, 1, 0, 0), &ny(3, 31, 0, 0))
        .unwrap();
    let listed: Vec<(u32, &str)> = events.iter().map(|e| (e.start().day(), e.subject())).collect();
    assert_eq!(
        listed,
        vec![(3, "Standup"), (10, "Canceled"), (17, "Standup")]
    );
}

#[test_log::test]
fn conflicting_series_stores_nothing() {
    let mut calendar = Calendar::new("Work", NY);
    calendar
        .add_event(timed("Dentist", ny(3, 17, 10, 30), 30), false)
        .unwrap();

    assert!(!calendar.add_recurring_event(monday_standups()).unwrap());

    let events = calendar
        .get_events_in_range(&ny(3, 1, 0, 0), &ny(3, 31, 0, 0))
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject(), "Dentist");
}

#[test_log::test]
fn deleting_current_calendar_keeps_registry_consistent() {
    let mut manager = CalendarManager::default();
    manager.create_calendar("Work", TOKYO).unwrap();
    manager.set_current("Work").unwrap();

    manager.delete_calendar("Work").unwrap();
    let current = manager.current().unwrap().name().to_string();
    assert!(manager.get_calendar(&current).is_ok());

    let result = manager.delete_calendar(&current);
    assert!(matches!(result, Err(CalendarError::LastCalendar)));
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.current().unwrap().name(), current);
}

#[test_log::test]
fn copied_event_lands_at_target_instant_in_target_zone() {
    let mut manager = CalendarManager::default();
    manager.create_calendar("Tokyo", TOKYO).unwrap();
    let original = timed("Review", ny(3, 13, 10, 0), 45)
        .with_location("Room 4")
        .with_description("Quarterly numbers")
        .with_visibility(Visibility::Private);
    manager
        .current_mut()
        .unwrap()
        .add_event(original.clone(), false)
        .unwrap();

    let target_start = TOKYO.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
    assert!(manager
        .copy_event("Review", original.start(), "Tokyo", &target_start)
        .unwrap());

    let copy = manager
        .get_calendar("Tokyo")
        .unwrap()
        .get_event_at(&target_start)
        .unwrap()
        .unwrap();
    assert_eq!(copy.subject(), original.subject());
    assert_eq!(copy.location(), original.location());
    assert_eq!(copy.description(), original.description());
    assert_eq!(copy.visibility(), original.visibility());
    assert_eq!(copy.duration(), original.duration());
    assert_eq!(*copy.start(), target_start);
    assert_eq!(copy.start().timezone(), TOKYO);
    assert_eq!(copy.start().hour(), 9);
}
