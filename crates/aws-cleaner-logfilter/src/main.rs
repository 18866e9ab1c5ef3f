//! aws-cleaner-logfilter: keep only warnings, successes and completions
//!
//! Rewrites `aws_cleanup.log` in place after saving a timestamped backup.

use anyhow::{Context, Result};
use aws_cleaner_common::defaults::LOG_FILE_NAME;
use aws_cleaner_logfilter::{FilterOutcome, LocateOutcome, filter_file, locate_log_files};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "aws-cleaner-logfilter")]
#[command(about = "Trim an aws-cleaner log down to warnings, successes and completions")]
#[command(version)]
struct Args {
    /// Log file to filter (default: search for aws_cleanup.log)
    path: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("\n\x1b[1;31mError:\x1b[0m {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  \x1b[33mCaused by:\x1b[0m {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;

    let located = locate_log_files(args.path.as_deref(), &cwd);
    match &located {
        LocateOutcome::Explicit(p) => info!(path = %p.display(), "Using log file from command line"),
        LocateOutcome::CurrentDir(p) => info!(path = %p.display(), "Found log file in working directory"),
        LocateOutcome::ParentDir(p) => info!(path = %p.display(), "Found log file in parent directory"),
        LocateOutcome::Search(paths) => info!(count = paths.len(), "Found log files below working directory"),
        LocateOutcome::Missing(p) => {
            anyhow::bail!("log file {} does not exist", p.display());
        }
        LocateOutcome::NotFound => {
            println!("No {LOG_FILE_NAME} found.");
            println!("Run from a directory containing {LOG_FILE_NAME}, or pass its path:");
            println!("  aws-cleaner-logfilter /path/to/{LOG_FILE_NAME}");
            anyhow::bail!("no log file to filter");
        }
    }

    let mut failures = 0usize;
    for path in located.paths() {
        match filter_file(&path) {
            Ok(outcome) => print_report(&outcome),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to filter log file");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} log file(s) could not be filtered");
    }
    Ok(())
}

fn print_report(outcome: &FilterOutcome) {
    let stats = &outcome.stats;
    println!("\n=== {} ===", outcome.path.display());
    println!("Original lines: {}", stats.original_lines);
    println!("Filtered lines: {}", stats.kept_lines);
    println!(
        "Removed lines:  {} ({:.1}%)",
        stats.removed_lines(),
        stats.removed_percent()
    );
    println!("WARNING lines:  {}", stats.warning_lines);
    println!("Kept: WARNING level, Successfully and Completed entries");
    println!("Backup:         {}", outcome.backup_path.display());
}
