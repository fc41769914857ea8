use std::io::Cursor;

use habit_app::app::{execute, AppConfig, HabitAppController};
use habit_app::cli::Command;
use habit_core::{DateKey, FixedClock};
use tempfile::tempdir;

fn open(config: &AppConfig, today: &str) -> HabitAppController {
    let today: DateKey = today.parse().expect("valid day key");
    HabitAppController::open_with_clock(config, FixedClock::on_key(today)).expect("open controller")
}

fn run(controller: &mut HabitAppController, command: Command) -> String {
    let mut output = Vec::new();
    execute(controller, command, &mut Cursor::new(String::new()), &mut output)
        .expect("command runs");
    String::from_utf8(output).expect("utf8 output")
}

#[test]
fn a_week_of_sessions_against_one_file() {
    let temp = tempdir().expect("tempdir");
    let config = AppConfig::default().with_data_file(temp.path().join("nested/habits.json"));

    let id = {
        let mut controller = open(&config, "2024-03-04");
        run(&mut controller, Command::Add { name: vec!["Journal".into()] });
        let id = controller.store().habits()[0].id;
        run(&mut controller, Command::Toggle { id });
        id
    };
    assert!(config.data_file().exists());

    let mut controller = open(&config, "2024-03-05");
    let toggled = run(&mut controller, Command::Toggle { id });
    assert!(toggled.contains("streak 2"));

    let chart = run(&mut controller, Command::Chart);
    let lines: Vec<&str> = chart.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[5].starts_with("Mon 03-04"));
    assert!(lines[6].starts_with("Tue 03-05"));

    // skipping a day breaks the current run but keeps the best one
    let mut controller = open(&config, "2024-03-07");
    let listed = run(&mut controller, Command::List { json: false });
    assert!(listed.contains("[ ]"));
    assert!(listed.contains("streak 0 days (best 2 days)"));
    assert!(listed.contains("Longest streak: 2 days"));

    let deleted = run(&mut controller, Command::Delete { id, yes: true });
    assert!(deleted.contains("Deleted \"Journal\""));

    let mut controller = open(&config, "2024-03-07");
    let listed = run(&mut controller, Command::List { json: false });
    assert!(listed.starts_with("No habits yet"));
}
