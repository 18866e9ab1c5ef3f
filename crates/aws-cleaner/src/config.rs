//! Configuration types for a cleanup run

use crate::cleaner::CleanupOptions;
use aws_cleaner_common::defaults::LOG_FILE_NAME;
use aws_cleaner_common::{LogLevel, ResourceKind};
use std::path::PathBuf;
use thiserror::Error;

/// Which account and regions to target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsConfig {
    /// Named profile (default credential chain when `None`)
    pub profile: Option<String>,
    /// Restrict the walk to these regions; empty means every enabled region
    pub regions: Vec<String>,
}

/// Log file settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
    /// Minimum level written to the log file
    pub file_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(LOG_FILE_NAME),
            file_level: LogLevel::Info,
        }
    }
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    /// Skip the confirmation prompt
    pub yes: bool,
    /// Print the run summary as JSON
    pub json: bool,
    /// Run headless even from the `run` command
    pub no_tui: bool,
}

/// Configuration for a cleanup run
///
/// Composed of focused sub-configs, with flat accessors for the fields the
/// orchestrator and front ends read most.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub aws: AwsConfig,
    /// Selected resource kinds, in any order
    pub resources: Vec<ResourceKind>,
    pub cleanup: CleanupOptions,
    pub logging: LoggingConfig,
    pub flags: RuntimeFlags,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no resource types selected (pass --resource <kind> or --all)")]
    NoResourcesSelected,
}

impl RunConfig {
    pub fn profile(&self) -> Option<&str> {
        self.aws.profile.as_deref()
    }
    pub fn regions(&self) -> &[String] {
        &self.aws.regions
    }
    pub fn resources(&self) -> &[ResourceKind] {
        &self.resources
    }
    pub fn dry_run(&self) -> bool {
        self.cleanup.dry_run
    }
    pub fn cleanup_options(&self) -> CleanupOptions {
        self.cleanup
    }
    pub fn log_file(&self) -> &std::path::Path {
        &self.logging.log_file
    }

    /// Reject a run that would do nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resources.is_empty() {
            return Err(ConfigError::NoResourcesSelected);
        }
        Ok(())
    }

    /// What the operator is about to do, one line per fact, for the
    /// confirmation prompt.
    pub fn confirmation_lines(&self) -> Vec<String> {
        let kinds: Vec<&str> = ResourceKind::execution_order(&self.resources)
            .into_iter()
            .map(ResourceKind::display_name)
            .collect();
        let regions = if self.aws.regions.is_empty() {
            "all enabled regions".to_string()
        } else {
            self.aws.regions.join(", ")
        };
        let mode = if self.dry_run() {
            "DRY RUN (nothing will be deleted)"
        } else {
            "LIVE (resources will be permanently deleted)"
        };

        vec![
            format!("Profile:   {}", self.profile().unwrap_or("default")),
            format!("Resources: {}", kinds.join(", ")),
            format!("Regions:   {}", regions),
            format!("Mode:      {}", mode),
        ]
    }

    #[cfg(test)]
    pub(crate) fn for_test(resources: &[ResourceKind], dry_run: bool) -> Self {
        Self {
            aws: AwsConfig::default(),
            resources: resources.to_vec(),
            cleanup: CleanupOptions {
                dry_run,
                settle: crate::cleaner::SettleDelays::none(),
            },
            logging: LoggingConfig::default(),
            flags: RuntimeFlags::default(),
        }
    }
}

impl Default for RunConfig {
    /// Every resource kind, dry run, default log file
    fn default() -> Self {
        Self {
            aws: AwsConfig::default(),
            resources: ResourceKind::ALL.to_vec(),
            cleanup: CleanupOptions::default(),
            logging: LoggingConfig::default(),
            flags: RuntimeFlags::default(),
        }
    }
}
