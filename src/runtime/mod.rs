use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::playlist::PlaylistController;
use crate::transport::TransportCmd;

mod event_loop;
mod logging;
mod settings;
mod startup;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "ttunes", version, about = "A terminal music player")]
pub struct Cli {
    /// Directory to play music from (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Start with shuffle enabled
    #[arg(long)]
    pub shuffle: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `ttunes=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut settings, config_warning) = settings::load_settings(cli.config.as_deref());
    if cli.shuffle {
        settings.playback.shuffle = true;
    }

    let (_log_guard, log_notice) =
        logging::init_or_notice(&settings.logging, cli.log_level.as_deref());
    if let Some(w) = &config_warning {
        warn!("{w}");
    }

    let dir = cli
        .dir
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(dir = %dir.display(), "starting");

    let engine = RodioEngine::open(&settings.audio).context("cannot start audio output")?;
    let mut controller = PlaylistController::new(engine);
    startup::apply_playback_defaults(&mut controller, &settings.playback);
    let notice = startup::load_catalog(&mut controller, &dir, &settings.library);

    let mut app = App::new(
        settings.ui.header_text.clone(),
        Duration::from_millis(settings.ui.status_timeout_ms),
    );
    app.follow_playback = settings.ui.follow_playback;
    app.set_current_dir(&dir);
    // One status line: the catalog notice goes last so it stays visible.
    for message in [config_warning, log_notice, notice].into_iter().flatten() {
        app.set_status(message);
    }

    let (transport_tx, transport_rx) = mpsc::channel::<TransportCmd>();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &transport_tx,
        &transport_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("shutting down");
    run_result
}
