//! pendulum - terminal metronome
//!
//! Run with: cargo run -- --bpm 96 --beats-per-bar 3

mod app;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Pendulum;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mut app = Pendulum::new()
        .bpm(cli.bpm)
        .beats_per_bar(cli.beats_per_bar)
        .max_angle(cli.max_angle)
        .click_on_start(cli.click_on_start);
    if let (Some(accent), Some(regular)) = (cli.accent_wav, cli.regular_wav) {
        app = app.clicks_from_wav(accent, regular);
    }

    if cli.headless {
        app.run_headless(Duration::from_secs_f64(cli.duration.max(0.0)))
    } else {
        app.run()
    }
}

/// The TUI owns the terminal, so logs only go to stderr in headless mode or
/// to an explicit log file.
fn init_tracing(cli: &Cli) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| eyre!("failed to install file logger: {e}"))?;
    } else if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| eyre!("failed to install stderr logger: {e}"))?;
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal metronome with a swinging needle", long_about = None)]
struct Cli {
    /// Tempo in beats per minute
    #[arg(short, long, default_value_t = 120.0)]
    bpm: f64,
    /// Beats per bar; the first one is accented
    #[arg(short = 'n', long, default_value_t = 4)]
    beats_per_bar: u32,
    /// Needle swing amplitude in degrees
    #[arg(long, default_value_t = pendulum::needle::DEFAULT_MAX_ANGLE)]
    max_angle: f32,
    /// Accent click as a WAV file (requires --regular-wav)
    #[arg(long, requires = "regular_wav")]
    accent_wav: Option<PathBuf>,
    /// Regular click as a WAV file (requires --accent-wav)
    #[arg(long, requires = "accent_wav")]
    regular_wav: Option<PathBuf>,
    /// Click the downbeat immediately on start
    #[arg(long)]
    click_on_start: bool,
    /// Run without the terminal UI, logging beats to stderr
    #[arg(long)]
    headless: bool,
    /// Seconds to run in headless mode
    #[arg(long, default_value_t = 8.0)]
    duration: f64,
    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}
