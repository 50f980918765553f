//! querymuse - Conversational NL2SQL Assistant Demo
//!
//! Terminal UI for chatting with a mocked NL2SQL backend, browsing
//! conversation history and bookmarks, and exploring tabular results.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use querymuse_core::{samples, Config, TableView};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "querymuse", version, about = "Conversational NL2SQL assistant demo")]
struct Cli {
    /// Path to a config file (defaults to the XDG config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export the sample sales table as CSV into the given directory and exit
    #[arg(long, value_name = "DIR")]
    export_sample: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stable XDG paths for config, exports, and logs
    Config::ensure_xdg_env();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path).context("failed to load configuration")?,
        None => Config::load().context("failed to load configuration")?,
    };

    // Headless export path, no terminal takeover needed
    if let Some(dir) = &cli.export_sample {
        let view = TableView::new(samples::sales_rows(), config.table.page_size, true);
        let path = view
            .export_to_file(dir)
            .context("failed to export sample table")?;
        println!("{}", path.display());
        return Ok(());
    }

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        querymuse_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("querymuse TUI starting up");

    let mut app = App::new(&config);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("querymuse TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Advance timed state: thinking stages, search spinner
        app.tick(Instant::now());

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        // Check if we should quit
        if app.should_quit {
            app.shutdown().context("failed to snapshot session")?;
            break;
        }
    }

    Ok(())
}
