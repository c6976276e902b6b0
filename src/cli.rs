use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context};
use chrono::Local;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::dispatch::{AlwaysConfirm, Confirm};
use crate::error::TrackerError;
use crate::form::FormState;
use crate::storage::Storage;
use crate::task::{Category, CATEGORY_PLACEHOLDER};
use crate::tracker::Tracker;

pub fn command() -> Command {
    Command::new("tasktrack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal task tracker with a local JSON store")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to config.toml"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the task store"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity"),
        )
        .subcommand(Command::new("ui").about("Open the interactive tracker (default)"))
        .subcommand(
            Command::new("add")
                .about("Add a new task")
                .arg(Arg::new("title").required(true).help("Task title"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .default_value("")
                        .help("Task description"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('c')
                        .default_value(CATEGORY_PLACEHOLDER)
                        .help(category_help()),
                )
                .arg(
                    Arg::new("deadline")
                        .long("deadline")
                        .default_value("")
                        .help("Deadline as YYYY-MM-DD"),
                ),
        )
        .subcommand(Command::new("list").about("List all tasks"))
        .subcommand(
            Command::new("toggle")
                .about("Mark a task completed or pending")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a task")
                .arg(id_arg())
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete every task")
                .arg(yes_arg()),
        )
}

fn category_help() -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    format!("One of: {}", labels.join(", "))
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Task id")
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Skip the confirmation prompt")
}

/// Where log output goes: the terminal UI owns the screen, so it logs to
/// a file instead of stderr.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

pub fn init_tracing(verbose: u8, configured: &str, target: LogTarget<'_>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let init_result = match target {
        LogTarget::Stderr => builder
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .try_init(),
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    };

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Asks on stdin, like a browser `confirm()` dialog.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => matches!(input.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

fn confirmer(sub: &ArgMatches) -> Box<dyn Confirm> {
    if sub.get_flag("yes") {
        Box::new(AlwaysConfirm(true))
    } else {
        Box::new(StdinConfirm)
    }
}

fn required_id(sub: &ArgMatches) -> anyhow::Result<u64> {
    sub.get_one::<u64>("id")
        .copied()
        .ok_or_else(|| anyhow!("missing task id"))
}

fn string_arg(sub: &ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name).cloned().unwrap_or_default()
}

/// Runs one non-interactive subcommand against `tracker`, writing the
/// human-readable result to `out`.
pub fn run_subcommand<S: Storage>(
    tracker: &mut Tracker<S>,
    name: &str,
    sub: &ArgMatches,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let mut form = FormState::new(today);

    match name {
        "add" => {
            form.title = string_arg(sub, "title");
            form.description = string_arg(sub, "description");
            let category = string_arg(sub, "category");
            form.category = category.parse::<Category>().ok();
            let deadline = string_arg(sub, "deadline");
            if !deadline.is_empty() {
                form.deadline = deadline;
            }
            match tracker.submit_new_task(&mut form, today) {
                Ok(task) => writeln!(out, "Added task #{}", task.id)?,
                Err(TrackerError::Validation(err)) => bail!("{err}"),
                Err(err) => return Err(err).context("failed to add task"),
            }
        }
        "list" => {
            let rows = tracker.render_all().to_vec();
            if let Some(notice) = tracker.take_notice() {
                writeln!(out, "warning: {notice}")?;
            }
            if rows.is_empty() {
                writeln!(out, "No tasks.")?;
            }
            for row in rows {
                writeln!(out, "{}", row.summary())?;
            }
        }
        "toggle" => {
            let id = required_id(sub)?;
            if tracker.toggle_complete(id)? {
                writeln!(out, "Toggled task #{id}")?;
            } else {
                writeln!(out, "No task #{id}")?;
            }
        }
        "rm" => {
            let id = required_id(sub)?;
            let mut confirm = confirmer(sub);
            if tracker.delete_task(id, &mut form, confirm.as_mut())? {
                writeln!(out, "Removed task #{id}")?;
            }
        }
        "clear" => {
            let mut confirm = confirmer(sub);
            if tracker.clear_all(&mut form, confirm.as_mut())? {
                writeln!(out, "All tasks cleared")?;
            }
        }
        other => bail!("unknown subcommand: {other}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::{TaskStore, DEFAULT_KEY};
    use crate::tracker::EditMode;

    fn tracker() -> Tracker<MemoryStorage> {
        Tracker::new(TaskStore::new(MemoryStorage::new(), DEFAULT_KEY), EditMode::InPlace)
    }

    fn run(tracker: &mut Tracker<MemoryStorage>, args: &[&str]) -> anyhow::Result<String> {
        let matches = command().try_get_matches_from(args)?;
        let (name, sub) = matches.subcommand().expect("subcommand");
        let mut out = Vec::new();
        run_subcommand(tracker, name, sub, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn add_list_toggle_rm() {
        let mut tracker = tracker();
        let added = run(
            &mut tracker,
            &["tasktrack", "add", "Buy milk", "-c", "Errand", "--deadline", "2999-01-01"],
        )
        .unwrap();
        assert!(added.starts_with("Added task #"));
        let id = tracker.store().load_all().unwrap()[0].id;

        let listed = run(&mut tracker, &["tasktrack", "list"]).unwrap();
        assert!(listed.contains("Buy milk (Pending) | Errand | due 2999-01-01"));

        run(&mut tracker, &["tasktrack", "toggle", &id.to_string()]).unwrap();
        let listed = run(&mut tracker, &["tasktrack", "list"]).unwrap();
        assert!(listed.contains("(Completed)"));

        let removed = run(&mut tracker, &["tasktrack", "rm", &id.to_string(), "--yes"]).unwrap();
        assert_eq!(removed, format!("Removed task #{id}\n"));
        assert_eq!(run(&mut tracker, &["tasktrack", "list"]).unwrap(), "No tasks.\n");
    }

    #[test]
    fn add_without_category_is_rejected() {
        let mut tracker = tracker();
        let err = run(&mut tracker, &["tasktrack", "add", "Buy milk"]).unwrap_err();
        assert_eq!(err.to_string(), "Please select a category!");
        assert!(tracker.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn file_logging_creates_missing_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log = temp.path().join("fresh").join("tasktrack.log");
        init_tracing(0, "info", LogTarget::File(&log)).unwrap();
        assert!(log.exists());
    }

    #[test]
    fn clear_with_yes_empties_store() {
        let mut tracker = tracker();
        run(&mut tracker, &["tasktrack", "add", "a", "-c", "Work"]).unwrap();
        run(&mut tracker, &["tasktrack", "add", "b", "-c", "Work"]).unwrap();
        run(&mut tracker, &["tasktrack", "clear", "-y"]).unwrap();
        assert!(tracker.store().load_all().unwrap().is_empty());
    }
}
