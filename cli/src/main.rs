//! GroFlow CLI - Binary entry point and terminal session management.
//!
//! The CLI bridges [`groflow_engine`] (dashboard state) and [`groflow_tui`]
//! (rendering), loading `~/.groflow/config.toml` first and restoring the
//! terminal on every exit path.
//!
//! # Event Loop
//!
//! A fixed 16ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`groflow_tui::InputPump`])
//! 3. Advance dashboard state (`app.tick()`), collecting any finished reply
//! 4. Render frame

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use groflow_config::GroflowConfig;
use groflow_engine::groflow_types::{ApiKey, View};
use groflow_engine::{App, AppOptions};
use groflow_providers::GeminiClient;
use groflow_tui::{InputPump, draw, handle_events};

/// Read when neither the config nor the Settings screen supplies a key.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "groflow", version, about)]
struct Cli {
    /// Read settings from this file instead of ~/.groflow/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open on this view (home, assistant, roadmap, tracker, marketplace,
    /// investor, settings).
    #[arg(long, value_name = "VIEW", value_parser = parse_view)]
    view: Option<View>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the models that can serve generateContent for your key.
    Models,
}

fn parse_view(raw: &str) -> Result<View, String> {
    View::ALL
        .into_iter()
        .find(|view| {
            let name = format!("{view:?}");
            name.eq_ignore_ascii_case(raw.trim())
        })
        .ok_or_else(|| format!("unknown view '{raw}'"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file(groflow_config::groflow_dir());

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the dashboard.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file(groflow_dir: Option<PathBuf>) -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates(groflow_dir) {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates(groflow_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.groflow/logs/groflow.log
    if let Some(dir) = groflow_dir {
        candidates.push(dir.join("logs").join("groflow.log"));
    }

    // Fallback: ./.groflow/logs/groflow.log
    candidates.push(PathBuf::from(".groflow").join("logs").join("groflow.log"));

    candidates
}

fn load_config(cli: &Cli) -> Result<GroflowConfig> {
    let loaded = match &cli.config {
        Some(path) => GroflowConfig::load_from(path)?.with_context(|| {
            format!("config file {} does not exist", path.display())
        })?,
        None => GroflowConfig::load()?.unwrap_or_default(),
    };
    Ok(loaded)
}

fn resolve_api_key(config: &GroflowConfig) -> Option<ApiKey> {
    config.api_key().or_else(|| {
        env::var(API_KEY_ENV)
            .ok()
            .and_then(|value| ApiKey::new(value).ok())
    })
}

fn app_options(cli: &Cli, config: &GroflowConfig) -> Result<AppOptions> {
    Ok(AppOptions {
        seed: config.session_seed()?,
        gateway: config.gateway(),
        api_key: resolve_api_key(config),
        start_view: cli.view.unwrap_or_else(|| config.start_view()),
        high_contrast: config.high_contrast(),
    })
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode, bracketed paste and the alternate screen are all undone on
/// drop, so the shell is usable again after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;

    if let Some(Command::Models) = cli.command {
        return list_models(&config).await;
    }

    let mut app = App::new(app_options(&cli, &config)?);

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = &result {
        tracing::error!(error = %err, "Dashboard exited with an error");
    }
    tracing::info!("Dashboard closed");
    result
}

async fn list_models(config: &GroflowConfig) -> Result<()> {
    let Some(key) = resolve_api_key(config) else {
        bail!("no API key: set google.api_key in the config or {API_KEY_ENV}");
    };
    let client = GeminiClient::new(config.gateway())?;
    let models = client.list_models(&key).await?;
    if models.is_empty() {
        println!("No models support generateContent for this key.");
    }
    for model in models {
        match &model.display_name {
            Some(display) => println!("{}\t{display}", model.name),
            None => println!("{}", model.name),
        }
    }
    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(16);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        app.tick();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
