//! Race Log Reader CLI Application
//!
//! This is the command-line interface for the race log decoder.
//! It uses the race-log-decoder library and adds:
//! - Configuration file loading (JSON or TOML)
//! - Per-event narration on stdout
//! - Report generation (text/JSON)
//!
//! Any fatal error is returned from `main`, which exits with a non-zero status.

use anyhow::{Context, Result};
use clap::Parser;
use race_log_decoder::{RaceDecoder, RegistrationPolicy};
use std::io::{self, Write};
use std::path::PathBuf;

mod config;
mod report;

use report::OutputFormat;

/// Race Log Reader - Reconstruct race results from an event log
#[derive(Parser, Debug)]
#[command(name = "race-log")]
#[command(about = "Reconstruct biathlon-style race results from an event log", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the race configuration (JSON, or TOML with a .toml extension)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Path to the event log
    #[arg(short, long, value_name = "FILE")]
    events: PathBuf,

    /// Format of the final results block
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Fail when a competitor is registered twice instead of resetting the record
    #[arg(long)]
    reject_reregistration: bool,

    /// Do not print per-event narration
    #[arg(long)]
    no_narration: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Race Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", race_log_decoder::VERSION);

    let registration = if args.reject_reregistration {
        RegistrationPolicy::Reject
    } else {
        RegistrationPolicy::Overwrite
    };

    log::info!("Loading configuration from: {:?}", args.config);
    let race_config = config::load_config(&args.config, registration)?;
    log::debug!("Configuration loaded: {:?}", race_config);

    let decoder = RaceDecoder::new(race_config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error: Option<io::Error> = None;

    let outcome = decoder
        .decode_file(&args.events, |line| {
            if args.no_narration || write_error.is_some() {
                return;
            }
            if let Err(e) = writeln!(out, "{}", line) {
                write_error = Some(e);
            }
        })
        .with_context(|| format!("Failed to process event log: {:?}", args.events))?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write narration");
    }

    let rendered = report::render(&outcome.results, args.format)?;
    if !args.no_narration && args.format == OutputFormat::Text {
        writeln!(out)?;
    }
    write!(out, "{}", rendered)?;
    if args.format == OutputFormat::Json {
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
