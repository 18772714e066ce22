// SPDX-License-Identifier: MIT
//
// cascade: gradient noise and typewriter text, row by row.
//
// This is the binary that wires the two crates together:
//
//   cascade-term → grid, diff renderer, raw terminal, input
//   cascade-fx   → effects, row pipelines, animation loop
//
// Each row of the terminal gets a strip of scrolling gradient noise, an
// optional "Generating..." indicator and a line of text picked from a small
// pool. Rows light up top to bottom, each one starting when the noise above
// it stops:
//
//   ┌─────────────────────────────────────────────────────────┐
//   │ q#f@L1.)bW{a9;s  Message generated!  Hello world        │  ← done
//   │ 7Yk!p[2=eR%c,Ud  Generating..•..     Hello wor          │  ← running
//   │                                                         │  ← waiting
//   └─────────────────────────────────────────────────────────┘
//
// The terminal is busy with the animation, so logging goes to a file and
// only when --log-file is given.

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use cascade_fx::palette::SPECTRUM;
use cascade_fx::{
    AnimationLoop, ConfigError, DoneTrigger, IndicatorConfig, IndicatorKind, LoopConfig,
    NoiseConfig, RowConfig, RunOutcome, Sequencing,
};
use cascade_term::surface::TerminalSurface;

/// Lines the rows pick from.
const TEXT_POOL: [&str; 4] = [
    "Hello",
    "Hello world",
    "Hello world from",
    "Hello world from cascade!",
];

/// Shown in place of the indicator once a row finishes.
const FINISHED_MESSAGE: &str = "Message generated!";

// ─── Command Line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "cascade", version)]
#[command(about = "Waterfall of gradient noise and typewriter text")]
#[command(next_line_help = true)]
struct Cli {
    /// Number of animated rows (capped at the terminal height).
    #[arg(long, default_value_t = 20)]
    rows: u16,

    /// Noise strip length in columns.
    #[arg(long, default_value_t = 30)]
    length: u16,

    /// Noise characters change every N frames.
    #[arg(long, default_value_t = 1)]
    char_cadence: u32,

    /// The gradient scrolls every N frames.
    #[arg(long, default_value_t = 1)]
    color_cadence: u32,

    /// Columns each palette color spans.
    #[arg(long, default_value_t = 5)]
    gradient_length: u16,

    /// A text character appears every N frames.
    #[arg(long, default_value_t = 2)]
    reveal_cadence: u32,

    /// Progress indicator between the noise and the text.
    #[arg(long, value_enum, default_value_t = IndicatorArg::None)]
    indicator: IndicatorArg,

    /// Indicator marker slots.
    #[arg(long, default_value_t = 4)]
    indicator_length: u16,

    /// The indicator marker moves every N frames.
    #[arg(long, default_value_t = 1)]
    indicator_cadence: u32,

    /// Stop each row's noise after N animated frames instead of when its
    /// text is done.
    #[arg(long, value_name = "FRAMES", conflicts_with = "done_laps")]
    done_after: Option<u64>,

    /// Stop each row's noise after N traveling-indicator laps.
    #[arg(long, value_name = "LAPS")]
    done_laps: Option<u32>,

    /// Start every row at once instead of top to bottom.
    #[arg(long)]
    parallel: bool,

    /// Milliseconds between frames.
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Seed for text choice and noise, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Exit as soon as the animation ends instead of waiting for a key.
    #[arg(long)]
    no_wait: bool,

    /// Write logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log verbosity (with --log-file).
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndicatorArg {
    None,
    Pendulum,
    Traveling,
}

impl IndicatorArg {
    const fn kind(self) -> Option<IndicatorKind> {
        match self {
            Self::None => None,
            Self::Pendulum => Some(IndicatorKind::Pendulum),
            Self::Traveling => Some(IndicatorKind::Traveling),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal: {0}")]
    Io(#[from] io::Error),

    #[error("log file {}: {reason}", path.display())]
    LogFile { path: PathBuf, reason: String },
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path`. The returned guard flushes on drop and
/// must outlive the run.
fn init_logging(path: &Path, level: LogLevel) -> Result<WorkerGuard, AppError> {
    let log_error = |reason: &str| AppError::LogFile {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| log_error("not a file name"))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::from(level))
        .try_init()
        .map_err(|e| log_error(&e.to_string()))?;

    Ok(guard)
}

// ─── Rows ───────────────────────────────────────────────────────────────────

/// The done trigger the flags ask for.
const fn done_trigger(cli: &Cli) -> DoneTrigger {
    match (cli.done_after, cli.done_laps) {
        (Some(frames), _) => DoneTrigger::AfterFrames(frames),
        (None, Some(laps)) => DoneTrigger::IndicatorLaps(laps),
        (None, None) => DoneTrigger::StreamComplete,
    }
}

/// One row per line, each with a random line from the pool.
///
/// A row's text starts revealing roughly when the text above it would have
/// finished, so the rows read top to bottom even under `--parallel`.
fn build_rows(cli: &Cli, count: u16, rng: &mut StdRng) -> Vec<RowConfig> {
    let noise = NoiseConfig {
        length: cli.length,
        char_cadence: cli.char_cadence,
        color_cadence: cli.color_cadence,
        gradient_length: cli.gradient_length,
        palette: SPECTRUM.to_vec(),
    };
    let indicator = cli.indicator.kind().map(|kind| IndicatorConfig {
        kind,
        length: cli.indicator_length,
        cadence: cli.indicator_cadence,
        message: FINISHED_MESSAGE.to_owned(),
    });

    let mut rows = Vec::with_capacity(usize::from(count));
    let mut start_frame = 0;
    for y in 0..count {
        let text = TEXT_POOL.choose(rng).copied().unwrap_or(TEXT_POOL[0]);
        rows.push(RowConfig {
            noise: noise.clone(),
            start_frame,
            reveal_cadence: cli.reveal_cadence,
            indicator: indicator.clone(),
            done_trigger: done_trigger(cli),
            ..RowConfig::new(y, text)
        });
        start_frame = text.chars().count() as u64 * u64::from(cli.reveal_cadence) + 1;
    }
    rows
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<RunOutcome, AppError> {
    let _guard = cli
        .log_file
        .as_deref()
        .map(|path| init_logging(path, cli.log_level))
        .transpose()?;

    let surface = TerminalSurface::new();
    let size = surface.size();
    let count = cli.rows.min(size.rows);
    if count < cli.rows {
        warn!(requested = cli.rows, rows = count, "terminal too short, rows capped");
    }

    let mut rng = cli.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let rows = build_rows(cli, count, &mut rng);

    let config = LoopConfig {
        tick_interval: Duration::from_millis(cli.tick_ms),
        sequencing: if cli.parallel {
            Sequencing::Parallel
        } else {
            Sequencing::Waterfall
        },
        wait_for_ack: !cli.no_wait,
        seed: cli.seed,
    };

    let mut animation = AnimationLoop::new(size.cols, size.rows, rows, config, surface)?;
    let outcome = animation.run()?;
    info!(?outcome, "exiting");
    Ok(outcome)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("cascade: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
