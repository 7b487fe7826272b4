// main.rs

mod app;
mod config;
mod daemon;
mod edit;
mod entities;
mod error;
mod filter;
mod gateway;
mod notify;
mod session;
mod store;
mod tui;

use crate::app::App;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::{self};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// The terminal owns stdout, so logs go to a file in the config dir.
// MYTODO_LOG tunes the filter; logging is skipped if the file cannot open.
fn init_logging() {
    let path = config::log_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    if let Ok(file) = File::create(&path) {
        let filter = EnvFilter::try_from_env("MYTODO_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    std::thread::spawn(|| {
        if let Err(e) = daemon::start_daemon() {
            tracing::error!("daemon error: {e}");
        }
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config::load())?;
    app.restore_session();

    // Run the TUI event loop (blocks until exit)
    let res = tui::run_app(&mut terminal, &mut app);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Persist connection settings and session token on exit
    if let Err(e) = config::save(&app.config) {
        eprintln!("Failed to save config: {}", e);
    }

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
    }

    Ok(())
}
