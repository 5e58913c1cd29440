//! Scripted command sessions run end to end through the runner.

use std::io::Cursor;

use almanac_app::controller::Controller;
use almanac_app::runner::{run, run_headless};
use almanac_core::config::Settings;

fn settings() -> Settings {
    Settings::defaults()
        .expect("defaults register")
        .build()
        .expect("config builds")
        .try_deserialize()
        .expect("config deserializes")
}

fn run_script(script: &str) -> Vec<String> {
    let mut controller = Controller::new(settings(), Vec::new()).expect("session starts");
    run(&mut controller, Cursor::new(script)).expect("script runs");
    String::from_utf8(controller.into_output())
        .expect("utf-8 output")
        .lines()
        .map(String::from)
        .collect()
}

#[test_log::test]
fn calendar_lifecycle() {
    let output = run_script(
        "
        # calendars
        create calendar --name Work --timezone America/Chicago
        create calendar --name Work --timezone UTC
        use calendar --name Work
        edit calendar --name Work --property name Office
        edit calendar --name Office --property timezone Europe/Kyiv
        edit calendar --name Office --property timezone Mars/Olympus
        use calendar --name Work
        ",
    );

    assert_eq!(
        output,
        vec![
            "Calendar 'Work' created.",
            "Invalid command: create calendar --name Work --timezone UTC - Calendar name already exists: Work",
            "Switched to calendar 'Work'.",
            "Calendar renamed to 'Office'.",
            "Timezone updated for 'Office'.",
            "Invalid command: edit calendar --name Office --property timezone Mars/Olympus - Unknown timezone: Mars/Olympus",
            "Invalid command: use calendar --name Work - Not found: Calendar 'Work'",
        ]
    );
}

#[test_log::test]
fn recurring_events_print_and_busy() {
    let output = run_script(
        r#"
        create recurring event Standup from 2025-03-03 10:00 to 2025-03-03 11:00 --weekdays M --occurrences 3 --location "Room 1"
        print events from 2025-03-01 00:00 to 2025-03-31 00:00
        show status on 2025-03-10 10:30
        show status on 2025-03-10 11:00
        create event Clash from 2025-03-17 10:30 to 2025-03-17 10:45 --autodecline
        exit
        print events on 2025-03-03
        "#,
    );

    assert_eq!(
        output,
        vec![
            "Recurring event 'Standup' created.",
            "Standup: 03/03/2025 10:00 to 03/03/2025 11:00 at Room 1",
            "Standup: 03/10/2025 10:00 to 03/10/2025 11:00 at Room 1",
            "Standup: 03/17/2025 10:00 to 03/17/2025 11:00 at Room 1",
            "Busy",
            "Available",
            "Event declined due to conflict",
        ]
    );
}

#[test_log::test]
fn editing_one_occurrence_of_a_series() {
    let output = run_script(
        "
        create recurring event Standup from 2025-03-03 10:00 to 2025-03-03 11:00 --weekdays M --occurrences 3
        edit event name Standup from 2025-03-09 00:00 with Retro
        print events from 2025-03-01 00:00 to 2025-03-31 00:00
        ",
    );

    assert_eq!(
        output,
        vec![
            "Recurring event 'Standup' created.",
            "Events updated where applicable.",
            "Standup: 03/03/2025 10:00 to 03/03/2025 11:00 at No location",
            "Retro: 03/10/2025 10:00 to 03/10/2025 11:00 at No location",
            "Retro: 03/17/2025 10:00 to 03/17/2025 11:00 at No location",
        ]
    );
}

#[test_log::test]
fn copying_between_zones() {
    let output = run_script(
        "
        create calendar --name Tokyo --timezone Asia/Tokyo
        create event Review from 2025-03-13 10:00 to 2025-03-13 11:00
        create event Lunch from 2025-03-13 12:00 to 2025-03-13 13:00
        copy event Review on 2025-03-13 10:00 --target Tokyo to 2025-03-20 10:30
        copy event Missing on 2025-03-13 10:00 --target Tokyo to 2025-03-20 09:00
        copy events on 2025-03-13 --target Tokyo to 2025-03-20
        use calendar --name Tokyo
        print events on 2025-03-20
        ",
    );

    assert_eq!(
        output,
        vec![
            "Calendar 'Tokyo' created.",
            "Event 'Review' created.",
            "Event 'Lunch' created.",
            "Event 'Review' copied to 'Tokyo'.",
            "Invalid command: copy event Missing on 2025-03-13 10:00 --target Tokyo to 2025-03-20 09:00 - Not found: Event 'Missing' at 2025-03-13 10:00:00 EDT in calendar 'default'",
            "Cannot copy event 'Review' due to conflict",
            "Events copied to 'Tokyo' where applicable.",
            "Review: 03/20/2025 10:30 to 03/20/2025 11:30 at No location",
            "Lunch: 03/20/2025 12:00 to 03/20/2025 13:00 at No location",
        ]
    );
}

#[test_log::test]
fn malformed_commands_do_not_stop_the_session() {
    let output = run_script(
        "
        fly to the moon
        create event Gym from 2025-03-13 25:00
        show status
        create event Gym on 2025-03-13
        ",
    );

    assert_eq!(output.len(), 4);
    assert_eq!(output[0], "Invalid command: fly to the moon - Unknown command: fly");
    assert!(output[1].starts_with("Invalid command: create event Gym from 2025-03-13 25:00 - "));
    assert_eq!(output[2], "Invalid command: show status - Missing date");
    assert_eq!(output[3], "Event 'Gym' created.");
}

#[test_log::test]
fn headless_file_with_export() {
    let dir = std::env::temp_dir();
    let token = uuid::Uuid::now_v7();
    let script = dir.join(format!("almanac-{token}.txt"));
    let csv = dir.join(format!("almanac-{token}.csv"));
    std::fs::write(
        &script,
        format!(
            "create event \"Board, Q1\" from 2025-03-13 10:00 to 2025-03-13 11:00 --private\nexport cal {}\n",
            csv.display()
        ),
    )
    .expect("script written");

    let mut controller = Controller::new(settings(), Vec::new()).expect("session starts");
    run_headless(&mut controller, &script).expect("script runs");
    let output = String::from_utf8(controller.into_output()).expect("utf-8 output");

    assert!(output.contains(&format!("Exported to: {}", csv.display())));
    let exported = std::fs::read_to_string(&csv).expect("csv written");
    assert!(exported.contains(
        "\"Board, Q1\",03/13/2025,10:00:00,03/13/2025,11:00:00,,,Yes,America/New_York"
    ));

    std::fs::remove_file(script).expect("script removed");
    std::fs::remove_file(csv).expect("csv removed");
}

#[test_log::test]
fn missing_headless_file_is_an_error() {
    let mut controller = Controller::new(settings(), Vec::new()).expect("session starts");
    let missing =
        std::env::temp_dir().join(format!("almanac-missing-{}.txt", uuid::Uuid::now_v7()));
    assert!(run_headless(&mut controller, &missing).is_err());
}
