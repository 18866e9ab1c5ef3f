//! aws-cleaner: enumerate and delete AWS resources across every region
//!
//! Runs as a TUI by default; `clean` runs the same walk headless for
//! scripting. Dry run is the default everywhere; `--execute` deletes.

use anyhow::{Context, Result, bail};
use aws_cleaner::cleaner::{CleanupOptions, SettleDelays};
use aws_cleaner::config;
use aws_cleaner::logging::{self, LogCapture};
use aws_cleaner::orchestrator::{self, AwsBackend, CleanupBackend, RunSummary};
use aws_cleaner::{profiles, tui};
use aws_cleaner_common::defaults::{LOG_CAPTURE_CAPACITY, LOG_FILE_NAME};
use aws_cleaner_common::{LogLevel, ResourceKind};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "aws-cleaner")]
#[command(about = "Delete AWS resources across every enabled region (dry run by default)")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

/// Options shared by `run` and `clean`
#[derive(clap::Args, Debug)]
struct RunArgs {
    /// AWS profile to use (default credential chain when unset)
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Resource types to clean: ec2, s3, lambda, cloudformation, rds, vpc, iam
    #[arg(short, long = "resource", value_delimiter = ',')]
    resources: Vec<ResourceKind>,

    /// Select every resource type
    #[arg(long, conflicts_with = "resources")]
    all: bool,

    /// Actually delete resources (default is dry run)
    #[arg(long)]
    execute: bool,

    /// Skip the confirmation prompt (headless only)
    #[arg(short, long)]
    yes: bool,

    /// Only visit these regions (default: every enabled region)
    #[arg(long = "region", value_delimiter = ',')]
    regions: Vec<String>,

    /// Log file to append to
    #[arg(long, env = "AWS_CLEANER_LOG_FILE", default_value = LOG_FILE_NAME)]
    log_file: PathBuf,

    /// Minimum level written to the log file (debug, info, warning, error)
    #[arg(long, default_value = "info")]
    file_log_level: LogLevel,

    /// Override both settle delays (VPN detach, RDS deletion protection)
    #[arg(long)]
    settle_secs: Option<u64>,

    /// Print the run summary as JSON (headless only)
    #[arg(long)]
    json: bool,

    /// Run headless instead of the TUI
    #[arg(long)]
    no_tui: bool,
}

impl From<RunArgs> for config::RunConfig {
    fn from(args: RunArgs) -> Self {
        let resources = if args.all {
            ResourceKind::ALL.to_vec()
        } else {
            args.resources
        };
        let mut cleanup = CleanupOptions {
            dry_run: !args.execute,
            ..Default::default()
        };
        if let Some(secs) = args.settle_secs {
            cleanup.settle = SettleDelays::uniform(Duration::from_secs(secs));
        }

        Self {
            aws: config::AwsConfig {
                profile: args.profile,
                regions: args.regions,
            },
            resources,
            cleanup,
            logging: config::LoggingConfig {
                log_file: args.log_file,
                file_level: args.file_log_level,
            },
            flags: config::RuntimeFlags {
                yes: args.yes,
                json: args.json,
                no_tui: args.no_tui,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive cleanup in the terminal UI
    Run(Box<RunArgs>),

    /// Headless cleanup for scripts
    Clean(Box<RunArgs>),

    /// List profiles from the shared AWS credentials and config files
    Profiles {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List the regions enabled for an account
    Regions {
        #[arg(long, env = "AWS_PROFILE")]
        profile: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Run(Box::new(args.run))) {
        Command::Run(run_args) if !run_args.no_tui => handle_tui((*run_args).into()).await,
        Command::Run(run_args) | Command::Clean(run_args) => {
            handle_headless((*run_args).into()).await
        }
        Command::Profiles { format } => {
            init_plain_logging();
            handle_profiles(format)
        }
        Command::Regions { profile, format } => {
            init_plain_logging();
            handle_regions(profile.as_deref(), format).await
        }
    }
}

/// Console-only logging for the listing commands
fn init_plain_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_tui(config: config::RunConfig) -> Result<()> {
    let capture = LogCapture::new(LOG_CAPTURE_CAPACITY);
    logging::init_tui(&config.logging, capture.clone())?;

    let profiles = profiles::list_profiles().unwrap_or_else(|e| {
        warn!(error = %e, "Could not read AWS profiles");
        Vec::new()
    });

    let summaries = tui::run(config, profiles).await?;

    capture.print_to_stderr();
    for summary in &summaries {
        println!();
        for line in summary.describe() {
            println!("{line}");
        }
    }
    Ok(())
}

async fn handle_headless(config: config::RunConfig) -> Result<()> {
    logging::init_headless(&config.logging)?;

    config.validate()?;
    if !config.dry_run() && !config.flags.yes && !confirm(&config)? {
        bail!("cleanup cancelled");
    }

    info!(
        profile = config.profile().unwrap_or("default"),
        log_file = %config.log_file().display(),
        "Starting AWS resource cleanup"
    );
    let backend = AwsBackend::connect(config.profile()).await;
    let summary = orchestrator::run(&backend, &config, None).await;

    print_summary(&summary, config.flags.json)?;

    if let Some(reason) = &summary.aborted {
        bail!("cleanup aborted: {reason}");
    }
    if summary.has_failures() {
        bail!("cleanup finished with failures (see {})", config.log_file().display());
    }
    Ok(())
}

/// Ask on stdin before a live run; only `yes` proceeds.
fn confirm(config: &config::RunConfig) -> Result<bool> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "About to run AWS resource cleanup:")?;
    for line in config.confirmation_lines() {
        writeln!(stdout, "  {line}")?;
    }
    write!(stdout, "Type 'yes' to continue: ")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!();
        for line in summary.describe() {
            println!("{line}");
        }
    }
    Ok(())
}

fn handle_profiles(format: OutputFormat) -> Result<()> {
    let names = profiles::list_profiles()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Table if names.is_empty() => {
            println!("No profiles found; the default credential chain will be used.");
        }
        OutputFormat::Table => {
            for name in &names {
                println!("{name}");
            }
        }
    }
    Ok(())
}

async fn handle_regions(profile: Option<&str>, format: OutputFormat) -> Result<()> {
    let backend = AwsBackend::connect(profile).await;
    let regions = backend.list_regions().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&regions)?),
        OutputFormat::Table => {
            for region in &regions {
                println!("{region}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["aws-cleaner", "clean"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Some(Command::Clean(args)) => *args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_are_a_dry_run_with_nothing_selected() {
        let config: config::RunConfig = run_args(&[]).into();
        assert!(config.dry_run());
        assert!(config.resources().is_empty());
        assert_eq!(config.log_file(), std::path::Path::new(LOG_FILE_NAME));
        assert_eq!(config.logging.file_level, LogLevel::Info);
        assert_eq!(config.cleanup.settle, SettleDelays::default());
    }

    #[test]
    fn resources_accept_repeats_and_commas() {
        let config: config::RunConfig =
            run_args(&["--resource", "ec2,s3", "-r", "iam", "--execute"]).into();
        assert_eq!(
            config.resources(),
            &[ResourceKind::Ec2, ResourceKind::S3, ResourceKind::Iam]
        );
        assert!(!config.dry_run());
    }

    #[test]
    fn all_selects_every_kind() {
        let config: config::RunConfig = run_args(&["--all"]).into();
        assert_eq!(config.resources(), &ResourceKind::ALL);
    }

    #[test]
    fn unknown_resource_is_rejected() {
        assert!(Args::try_parse_from(["aws-cleaner", "clean", "--resource", "dynamodb"]).is_err());
    }

    #[test]
    fn settle_and_logging_overrides() {
        let config: config::RunConfig = run_args(&[
            "--settle-secs",
            "0",
            "--file-log-level",
            "warning",
            "--log-file",
            "/tmp/run.log",
            "--region",
            "eu-west-1,us-east-2",
        ])
        .into();
        assert_eq!(config.cleanup.settle, SettleDelays::none());
        assert_eq!(config.logging.file_level, LogLevel::Warning);
        assert_eq!(config.log_file(), std::path::Path::new("/tmp/run.log"));
        assert_eq!(config.regions(), &["eu-west-1", "us-east-2"]);
    }

    #[test]
    fn no_subcommand_means_tui() {
        let args = Args::try_parse_from(["aws-cleaner", "--all"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.run.all);
        assert!(!args.run.no_tui);
    }
}
