use std::process::ExitCode;

use habit_app::cli::run_cli;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("habits: {err:#}");
            ExitCode::FAILURE
        }
    }
}
