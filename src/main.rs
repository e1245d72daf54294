mod adjacency;
mod brush;
mod cli;
mod color;
mod commands;
mod grid;
mod import;
mod model;
mod rollover;
mod storage;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Command;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DAYTILES_LOG";
const DEFAULT_LOG_FILTER: &str = "daytiles=warn";

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let explicit = args.state.as_deref();

    match args.command.unwrap_or(Command::Tui) {
        Command::Init => commands::init(),
        Command::Show { day } => commands::show(&open_state(explicit)?, day),
        Command::Days => commands::days(&open_state(explicit)?),
        Command::Paint {
            activity,
            from,
            to,
            day,
        } => commands::paint(&open_state(explicit)?, activity, from, to, day),
        Command::Erase { from, to, day } => {
            commands::erase(&open_state(explicit)?, from, to, day)
        }
        Command::Comment { at, text, day } => {
            commands::comment(&open_state(explicit)?, at, text, day)
        }
        Command::Import { file, day } => commands::import(&open_state(explicit)?, file, day),
        Command::Activity(command) => commands::activity(&open_state(explicit)?, command),
        Command::Group(command) => commands::group(&open_state(explicit)?, command),
        Command::Toggle { setting } => commands::toggle(&open_state(explicit)?, setting),
        Command::Tui => commands::tui(open_state(explicit)?),
    }
}

/// Resolves the state file from the current directory and starts logging beside it.
fn open_state(explicit: Option<&Path>) -> Result<storage::StateLocation> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let location = storage::locate_state(&cwd, explicit)?;
    init_logging(&location.log_path());
    Ok(location)
}

/// Logs go to a file beside the state so the terminal UI stays clean. Logging is skipped
/// when that file cannot be opened.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
