use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

use tasktrack::cli::{self, LogTarget};
use tasktrack::config::Config;
use tasktrack::storage::{FileStorage, Storage};
use tasktrack::store::TaskStore;
use tasktrack::tracker::Tracker;
use tasktrack::ui::{self, App};

const LOG_FILE: &str = "tasktrack.log";

fn main() -> anyhow::Result<()> {
    let matches = cli::command().get_matches();

    let cfg = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let data_dir = cfg
        .resolve_data_dir(matches.get_one::<PathBuf>("data").map(PathBuf::as_path))
        .context("failed to resolve data directory")?;

    let verbose = matches.get_count("verbose");
    let interactive = matches!(matches.subcommand(), None | Some(("ui", _)));
    let log_path = data_dir.join(LOG_FILE);
    let target = if interactive {
        LogTarget::File(&log_path)
    } else {
        LogTarget::Stderr
    };
    cli::init_tracing(verbose, &cfg.log_level, target)?;
    info!(
        config = ?cfg.loaded_from,
        data_dir = %data_dir.display(),
        key = %cfg.storage_key,
        edit_mode = ?cfg.edit_mode,
        "starting tasktrack"
    );

    let storage = FileStorage::open(&data_dir)
        .with_context(|| format!("failed to open task store at {}", data_dir.display()))?;
    let store = TaskStore::new(storage, cfg.storage_key.clone());
    let mut tracker = Tracker::new(store, cfg.edit_mode);

    match matches.subcommand() {
        Some((name, sub)) if name != "ui" => {
            cli::run_subcommand(&mut tracker, name, sub, &mut io::stdout().lock())
        }
        _ => run_terminal(tracker),
    }
}

fn run_terminal<S: Storage>(tracker: Tracker<S>) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker, || Local::now().date_naive());
    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = %err, "terminal loop failed");
    }
    result.context("terminal loop failed")
}
