use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::filter::EnvFilter;

use rustvaders::app::App;
use rustvaders::audio::LogAudio;
use rustvaders::config::GameConfig;
use rustvaders::event::{Event, EventHandler};
use rustvaders::game::GameSession;
use rustvaders::scores::{FileScoreStore, HighScores, ScoreStore};
use rustvaders::ui;

/// ~60 frames per second.
const TICK_RATE_MS: u64 = 16;

#[derive(Parser, Debug)]
#[command(name = "rustvaders", version)]
#[command(about = "Fixed-formation arcade shooter for the terminal")]
struct Cli {
    /// High-score file (defaults to one beside the executable)
    #[arg(long, value_name = "PATH")]
    scores: Option<PathBuf>,
    /// TOML file overriding gameplay tunables
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for the random source, for reproducible games
    #[arg(long)]
    seed: Option<u64>,
    /// Log file (defaults to rustvaders.log beside the score file)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Clear the high-score table before starting
    #[arg(long)]
    reset_scores: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> GameConfig {
    let Some(path) = path else {
        return GameConfig::default();
    };
    match GameConfig::load(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring config: {}", err);
            GameConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let scores_path = cli.scores.clone().unwrap_or_else(FileScoreStore::default_path);
    let log_path = cli.log_file.clone().unwrap_or_else(|| {
        scores_path
            .parent()
            .map(|dir| dir.join("rustvaders.log"))
            .unwrap_or_else(|| PathBuf::from("rustvaders.log"))
    });
    init_logging(&log_path)?;

    let config = load_config(cli.config.as_deref());

    let mut store = FileScoreStore::new(scores_path.clone());
    if cli.reset_scores {
        if let Err(err) = store.clear() {
            tracing::warn!("could not clear high scores: {}", err);
        }
    }
    let scores = HighScores::load(Box::new(store), config.high_score_capacity);

    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, scores = %scores_path.display(), "starting");
    let session = GameSession::new(
        config,
        scores,
        Box::new(LogAudio::new()),
        StdRng::seed_from_u64(seed),
    );

    // Setup terminal
    enable_raw_mode().context("cannot enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("cannot enter alternate screen")?;
    let release_events = matches!(supports_keyboard_enhancement(), Ok(true));
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!(release_events, "keyboard mode");
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(session, release_events);
    let event_handler = EventHandler::new(TICK_RATE_MS);

    // Main loop: one simulation step and one draw per tick
    let result = (|| -> Result<()> {
        terminal.draw(|frame| ui::render(frame, &app.session))?;
        loop {
            match event_handler.next()? {
                Event::Tick => {
                    app.on_tick();
                    terminal.draw(|frame| ui::render(frame, &app.session))?;
                }
                Event::Key(key) => app.on_key(key),
            }

            if app.should_quit {
                return Ok(());
            }
        }
    })();

    // Restore terminal
    if release_events {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("bye");
    result
}
