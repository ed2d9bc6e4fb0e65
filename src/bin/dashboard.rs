//! Token Dashboard - Terminal UI for the live token columns
//!
//! Bootstraps the token snapshot, follows the price-update feed and renders
//! the New / Final Stretch / Migrated columns with a live chart for the
//! observed token.
//!
//! Usage:
//!   ./dashboard                            # config/dashboard.yaml
//!   ./dashboard --config x.yaml

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use token_dashboard::bin_common::resolve_config_path;
use token_dashboard::tokenfeed::application::visualizer::{ui, App};
use token_dashboard::tokenfeed::{init_file_tracing, DashboardConfig, ShutdownManager};

/// Log file for the TUI, stdout belongs to the alternate screen
const LOG_FILE: &str = "logs/dashboard.log";

fn main() -> Result<()> {
    let config_path = resolve_config_path()?;
    let config = DashboardConfig::load(&config_path)?;

    init_file_tracing(LOG_FILE, &config.log_level)?;
    config.log();

    // Create tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let shutdown = ShutdownManager::new();

    // Bootstrap the snapshot and start the feed client
    let mut app = runtime.block_on(async {
        shutdown.spawn_signal_handler();
        App::initialize(&config, shutdown.flag()).await
    })?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &shutdown);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Shutdown app
    app.shutdown();
    runtime.shutdown_timeout(Duration::from_secs(1));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    shutdown: &ShutdownManager,
) -> Result<()> {
    loop {
        // Apply queued feed events before drawing
        app.pump_events();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle input with 10ms timeout (for real-time updates)
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit || !shutdown.is_running() {
            break;
        }
    }

    Ok(())
}
