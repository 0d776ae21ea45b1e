//! Lockstep CLI - side-by-side diff editor TUI

mod app;
mod color;
mod config;
mod ui;
mod upstream;
mod views;

use anyhow::{Context, Result};
use app::{App, AppOptions};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lockstep_core::{parse_lines, DiffLineInfo, EditorTheme, PairOptions};
use ratatui::prelude::*;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lockstep")]
#[command(author, version, about = "A side-by-side diff editor")]
struct Args {
    /// Old file, shown on the left
    left: PathBuf,

    /// New file, shown on the right
    right: PathBuf,

    /// Color theme: light, dark, seeDark or schemaEditorDark
    #[arg(long)]
    theme: Option<EditorTheme>,

    /// Reject edits in the left pane
    #[arg(long)]
    read_only_left: bool,

    /// Reject edits in the right pane
    #[arg(long)]
    read_only_right: bool,

    /// JSON file with precomputed diff lines for the left pane
    #[arg(long, value_name = "FILE")]
    left_lines: Option<PathBuf>,

    /// JSON file with precomputed diff lines for the right pane
    #[arg(long, value_name = "FILE")]
    right_lines: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// The terminal is owned by the UI, so logs only go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

fn read_lines(path: Option<&Path>) -> Result<Option<Vec<DiffLineInfo>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let json = read_text(path)?;
    let lines = parse_lines(&json)
        .with_context(|| format!("Invalid diff lines in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        lines = lines.len(),
        "loaded precomputed diff lines"
    );
    Ok(Some(lines))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }

    let config = Config::load();
    let left = read_text(&args.left)?;
    let right = read_text(&args.right)?;
    let left_lines = read_lines(args.left_lines.as_deref())?;
    let right_lines = read_lines(args.right_lines.as_deref())?;

    // CLI overrides config
    let options = AppOptions {
        pair: PairOptions {
            theme: args.theme.unwrap_or(config.ui.theme),
            overrides: config.ui.palette.clone(),
            read_only_left: args.read_only_left || config.editor.read_only_left,
            read_only_right: args.read_only_right || config.editor.read_only_right,
            guard_window: config.guard_window(),
            left_lines: left_lines.unwrap_or_default(),
            right_lines: right_lines.unwrap_or_default(),
        },
        line_numbers: config.ui.line_numbers,
        scroll_step: config.scroll.step,
        debounce: config.debounce(),
    };
    tracing::info!(
        left = %args.left.display(),
        right = %args.right.display(),
        theme = %options.pair.theme,
        "starting"
    );

    let mut app = App::new(
        [display_name(&args.left), display_name(&args.right)],
        &left,
        &right,
        options,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    app.pair.destroy();

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(16);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, Instant::now())
                }
                Event::Mouse(me) => app.handle_mouse(me, Instant::now()),
                _ => {}
            }
        }

        app.tick(Instant::now());
        if app.should_quit {
            return Ok(());
        }
    }
}
