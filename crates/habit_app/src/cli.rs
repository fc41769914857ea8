use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use habit_core::HabitId;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::app::{execute, AppConfig, HabitAppController};

#[derive(Parser, Debug)]
#[command(name = "habits", version, about = "Track daily habits and their streaks", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
    #[arg(
        long,
        global = true,
        help = "Habit data file. Defaults to $HABITS_FILE, $HABITS_DIR/habits.json or the user state directory"
    )]
    pub file: Option<PathBuf>,
    #[arg(long, short, global = true, help = "Log debug output to stderr")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(about = "Show all habits with their streaks")]
    List {
        #[arg(long, help = "Print the view model as JSON")]
        json: bool,
    },
    #[command(about = "Start tracking a new habit")]
    Add {
        #[arg(required = true, num_args = 1.., help = "Habit name")]
        name: Vec<String>,
    },
    #[command(about = "Rename a habit")]
    Rename {
        id: HabitId,
        #[arg(required = true, num_args = 1.., help = "New name")]
        name: Vec<String>,
    },
    #[command(about = "Mark or unmark a habit as done today")]
    Toggle { id: HabitId },
    #[command(about = "Delete a habit after confirmation")]
    Delete {
        id: HabitId,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Show a month with the days anything was completed")]
    Calendar {
        #[arg(long, value_parser = parse_month, help = "Month to show as YYYY-MM, defaults to the current one")]
        month: Option<(i32, u32)>,
    },
    #[command(about = "Show completions over the last seven days")]
    Chart,
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got `{raw}`"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("`{year}` is not a year"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("`{month}` is not a month"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be between 1 and 12, got {month}"));
    }
    Ok((year, month))
}

fn enable_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(LevelFilter::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    enable_logging(args.verbose);

    let mut config = AppConfig::from_env();
    if let Some(file) = args.file {
        config = config.with_data_file(file);
    }

    let mut controller = HabitAppController::open(&config)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    execute(&mut controller, args.command, &mut input, &mut output)
}
