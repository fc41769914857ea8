use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use habit_core::{
    view::{self, TrackerView},
    Clock, HabitId, HabitStore, JsonFileStorage, SystemClock,
};
use tracing::{debug, info};

use crate::cli::Command;
use crate::render;

const DATA_FILE_NAME: &str = "habits.json";
const APP_DIR_NAME: &str = "habits";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) data_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolution order: `HABITS_FILE`, then `HABITS_DIR/habits.json`, then
    /// the per-user state directory.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_file = if let Some(file) = non_empty("HABITS_FILE") {
            PathBuf::from(file)
        } else if let Some(dir) = non_empty("HABITS_DIR") {
            PathBuf::from(dir).join(DATA_FILE_NAME)
        } else if let Some(state) = non_empty("XDG_STATE_HOME") {
            PathBuf::from(state).join(APP_DIR_NAME).join(DATA_FILE_NAME)
        } else if let Some(home) = non_empty("HOME") {
            PathBuf::from(home)
                .join(".local/state")
                .join(APP_DIR_NAME)
                .join(DATA_FILE_NAME)
        } else {
            PathBuf::from(DATA_FILE_NAME)
        };

        info!(path = %data_file.display(), "using habit data file");
        Self { data_file }
    }

    pub fn with_data_file(mut self, path: PathBuf) -> Self {
        self.data_file = path;
        self
    }

    pub fn data_file(&self) -> &std::path::Path {
        &self.data_file
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DATA_FILE_NAME),
        }
    }
}

/// Maps user intents onto the habit store and reports what happened.
pub struct HabitAppController {
    store: HabitStore,
}

impl HabitAppController {
    pub fn open(config: &AppConfig) -> Result<Self> {
        Self::open_with_clock(config, SystemClock)
    }

    pub fn open_with_clock(config: &AppConfig, clock: impl Clock + 'static) -> Result<Self> {
        let storage = JsonFileStorage::new(&config.data_file);
        let store = HabitStore::open(storage, clock).with_context(|| {
            format!(
                "failed to open habit data at {}",
                config.data_file.display()
            )
        })?;
        Ok(Self { store })
    }

    pub fn from_store(store: HabitStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn view(&mut self) -> TrackerView {
        // picks up a day rollover since the store was opened
        self.store.refresh();
        self.store.view()
    }

    pub fn add(&mut self, name: &str) -> String {
        match self.store.add_habit(name) {
            Some(habit) => format!("Added \"{}\" (id {})", habit.name, habit.id),
            None => "Habit name cannot be empty".to_string(),
        }
    }

    pub fn rename(&mut self, id: HabitId, name: &str) -> String {
        if self.store.get(id).is_none() {
            return unknown_habit(id);
        }
        if self.store.rename_habit(id, name) {
            format!("Renamed habit {id} to \"{}\"", name.trim())
        } else {
            "Habit name cannot be empty".to_string()
        }
    }

    pub fn toggle(&mut self, id: HabitId) -> String {
        match self.store.toggle_today(id) {
            Some(completed) => {
                let Some(habit) = self.store.get(id) else {
                    return unknown_habit(id);
                };
                if completed {
                    format!(
                        "\"{}\" done today, streak {} (best {})",
                        habit.name, habit.streak, habit.longest_streak
                    )
                } else {
                    format!(
                        "\"{}\" unmarked for today (best {})",
                        habit.name, habit.longest_streak
                    )
                }
            }
            None => unknown_habit(id),
        }
    }

    /// Asks on `input`/`output` before deleting unless `assume_yes`.
    pub fn delete(
        &mut self,
        id: HabitId,
        assume_yes: bool,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<String> {
        let Some(name) = self.store.get(id).map(|habit| habit.name.clone()) else {
            return Ok(unknown_habit(id));
        };
        let Some(token) = self.store.request_delete(id) else {
            return Ok(unknown_habit(id));
        };

        let confirmed = assume_yes || {
            write!(output, "Delete \"{name}\" (id {id})? [y/N] ")?;
            output.flush()?;
            let mut answer = String::new();
            input
                .read_line(&mut answer)
                .context("failed to read confirmation")?;
            matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        };

        if !confirmed {
            self.store.cancel_delete(token);
            debug!(habit_id = %id, "delete cancelled");
            return Ok("Kept habit".to_string());
        }
        Ok(match self.store.confirm_delete(token) {
            Some(removed) => format!("Deleted \"{}\"", removed.name),
            None => unknown_habit(id),
        })
    }
}

fn unknown_habit(id: HabitId) -> String {
    format!("No habit with id {id}")
}

/// Runs one command against the store, writing everything user-facing to
/// `output`.
pub fn execute(
    controller: &mut HabitAppController,
    command: Command,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List { json } => {
            let view = controller.view();
            if json {
                writeln!(output, "{}", serde_json::to_string_pretty(&view)?)?;
            } else {
                write!(output, "{}", render::render_list(&view))?;
            }
        }
        Command::Add { name } => {
            writeln!(output, "{}", controller.add(&name.join(" ")))?;
        }
        Command::Rename { id, name } => {
            writeln!(output, "{}", controller.rename(id, &name.join(" ")))?;
        }
        Command::Toggle { id } => {
            writeln!(output, "{}", controller.toggle(id))?;
        }
        Command::Delete { id, yes } => {
            let status = controller.delete(id, yes, input, output)?;
            writeln!(output, "{status}")?;
        }
        Command::Calendar { month } => {
            let tracker = controller.view();
            let calendar = match month {
                Some((year, month)) => {
                    view::month_calendar(controller.store().habits(), year, month, tracker.today)
                }
                None => tracker.calendar,
            };
            match calendar {
                Some(calendar) => write!(output, "{}", render::render_calendar(&calendar))?,
                None => writeln!(output, "That month cannot be shown")?,
            }
        }
        Command::Chart => {
            let view = controller.view();
            write!(output, "{}", render::render_chart(&view.weekly_chart))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_core::{DateKey, FixedClock, MemoryStorage};
    use std::collections::HashMap;
    use std::io::Cursor;

    fn controller() -> HabitAppController {
        let today: DateKey = "2024-01-03".parse().unwrap();
        let store = HabitStore::open(MemoryStorage::new(), FixedClock::on_key(today)).unwrap();
        HabitAppController::from_store(store)
    }

    fn run(controller: &mut HabitAppController, command: Command, input: &str) -> String {
        let mut output = Vec::new();
        execute(controller, command, &mut Cursor::new(input.to_string()), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn config_prefers_explicit_file() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HABITS_FILE", "/tmp/mine.json"),
            ("HABITS_DIR", "/tmp/dir"),
            ("HOME", "/home/someone"),
        ]));
        assert_eq!(config.data_file, PathBuf::from("/tmp/mine.json"));
    }

    #[test]
    fn config_from_process_env_always_resolves() {
        let config = AppConfig::from_env();
        assert!(!config.data_file().as_os_str().is_empty());
    }

    #[test]
    fn config_falls_back_through_directories() {
        let from_dir = AppConfig::from_lookup(lookup(&[("HABITS_DIR", "/data"), ("HABITS_FILE", "  ")]));
        assert_eq!(from_dir.data_file, PathBuf::from("/data/habits.json"));

        let from_state = AppConfig::from_lookup(lookup(&[("XDG_STATE_HOME", "/state")]));
        assert_eq!(from_state.data_file, PathBuf::from("/state/habits/habits.json"));

        let from_home = AppConfig::from_lookup(lookup(&[("HOME", "/home/someone")]));
        assert_eq!(
            from_home.data_file,
            PathBuf::from("/home/someone/.local/state/habits/habits.json")
        );

        let bare = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(bare.data_file, PathBuf::from("habits.json"));
    }

    #[test]
    fn add_toggle_and_list() {
        let mut controller = controller();
        let added = run(&mut controller, Command::Add { name: vec!["Read".into(), "daily".into()] }, "");
        assert!(added.starts_with("Added \"Read daily\""));
        let id = controller.store().habits()[0].id;

        let toggled = run(&mut controller, Command::Toggle { id }, "");
        assert!(toggled.contains("streak 1"));

        let listed = run(&mut controller, Command::List { json: false }, "");
        assert!(listed.contains("Read daily"));
        assert!(listed.contains("[x]"));
    }

    #[test]
    fn blank_add_is_reported_not_applied() {
        let mut controller = controller();
        let out = run(&mut controller, Command::Add { name: vec!["  ".into()] }, "");
        assert_eq!(out.trim(), "Habit name cannot be empty");
        assert!(controller.store().is_empty());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut controller = controller();
        let out = run(&mut controller, Command::Toggle { id: HabitId::new(42) }, "");
        assert_eq!(out.trim(), "No habit with id 42");
        let out = run(
            &mut controller,
            Command::Rename { id: HabitId::new(42), name: vec!["X".into()] },
            "",
        );
        assert_eq!(out.trim(), "No habit with id 42");
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut controller = controller();
        controller.add("Read");
        let id = controller.store().habits()[0].id;

        let kept = run(&mut controller, Command::Delete { id, yes: false }, "n\n");
        assert!(kept.contains("[y/N]"));
        assert!(kept.contains("Kept habit"));
        assert_eq!(controller.store().len(), 1);

        let deleted = run(&mut controller, Command::Delete { id, yes: false }, "yes\n");
        assert!(deleted.contains("Deleted \"Read\""));
        assert!(controller.store().is_empty());
    }

    #[test]
    fn delete_with_yes_skips_prompt() {
        let mut controller = controller();
        controller.add("Read");
        let id = controller.store().habits()[0].id;
        let out = run(&mut controller, Command::Delete { id, yes: true }, "");
        assert!(!out.contains("[y/N]"));
        assert!(controller.store().is_empty());
    }

    #[test]
    fn list_json_exposes_view_model() {
        let mut controller = controller();
        controller.add("Read");
        let out = run(&mut controller, Command::List { json: true }, "");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["today"], "2024-01-03");
        assert_eq!(value["habits"][0]["name"], "Read");
        assert_eq!(value["weekly_chart"]["bars"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn calendar_for_other_month() {
        let mut controller = controller();
        let out = run(&mut controller, Command::Calendar { month: Some((2023, 12)) }, "");
        assert!(out.contains("December 2023"));
        let out = run(&mut controller, Command::Calendar { month: None }, "");
        assert!(out.contains("January 2024"));
    }
}
