//! Tracing subscriber setup
//!
//! Both modes write the shared log file. The TUI routes console output
//! through tui-logger and keeps WARN/ERROR entries for printing after the
//! terminal is restored; headless mode uses the fmt layer on stderr.

mod capture;
mod file;
mod visitor;

pub use capture::{LogCapture, LogCaptureLayer};
pub use file::LogFileLayer;

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use aws_cleaner_common::LogLevel;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Target prefixes of the AWS SDK's own logging
const SDK_TARGETS: &[&str] = &["aws_config", "aws_sdk", "aws_smithy"];

pub(crate) fn is_sdk_target(target: &str) -> bool {
    SDK_TARGETS.iter().any(|prefix| target.starts_with(prefix))
}

/// Map a tracing level onto the log file's levels
pub(crate) fn log_level(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warning,
        Level::INFO => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

fn open_log_file(config: &LoggingConfig) -> Result<LogFileLayer> {
    LogFileLayer::open(&config.log_file, config.file_level)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))
}

/// Install the TUI subscriber: tui-logger, the log file and `capture`.
pub fn init_tui(config: &LoggingConfig, capture: LogCapture) -> Result<()> {
    let file = open_log_file(config)?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);
    tui_logger::set_level_for_target("aws_cleaner", log::LevelFilter::Info);
    for target in SDK_TARGETS {
        tui_logger::set_level_for_target(target, log::LevelFilter::Warn);
    }

    tracing_subscriber::registry()
        .with(tui_logger::TuiTracingSubscriberLayer)
        .with(file)
        .with(LogCaptureLayer::new(capture))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Install the headless subscriber: stderr (honouring `RUST_LOG`) plus the log file.
pub fn init_headless(config: &LoggingConfig) -> Result<()> {
    let file = open_log_file(config)?;

    let mut filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    for target in SDK_TARGETS {
        if let Ok(directive) = format!("{target}=warn").parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}
