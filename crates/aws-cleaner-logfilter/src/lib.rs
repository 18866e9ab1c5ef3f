//! aws-cleaner-logfilter - Post-run log trimming
//!
//! A cleanup run logs every listing and skip decision. After the fact only
//! three kinds of line matter: warnings (every destructive intent and
//! expected failure is logged at that level), lines reporting success, and
//! the per-cleaner `Completed ...` summaries. This crate rewrites a log file
//! in place so that only those remain, after copying the original aside.
//!
//! ## Modules
//!
//! - [`filter`]: Pure line filtering and statistics
//! - [`locate`]: Finding log files when no path is given

pub mod filter;
pub mod locate;

pub use filter::{FilterStats, filter_content};
pub use locate::{LocateOutcome, locate_log_files};

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// strftime layout of the backup file suffix
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors raised while rewriting one log file
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to read log file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write backup {}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rewrite log file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of filtering one file
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub path: PathBuf,
    pub backup_path: PathBuf,
    pub stats: FilterStats,
}

/// Backup location for `path` taken at `now`: `{path}.{YYYYmmdd_HHMMSS}.bak`
pub fn backup_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.bak", now.format(BACKUP_TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

/// Filter `path` in place using the current local time for the backup name.
pub fn filter_file(path: &Path) -> Result<FilterOutcome, FilterError> {
    filter_file_at(path, Local::now().naive_local())
}

/// Filter `path` in place, naming the backup after `now`.
///
/// The original content is always written to the backup before the file is
/// touched. If the backup cannot be written the original is left as is.
pub fn filter_file_at(path: &Path, now: NaiveDateTime) -> Result<FilterOutcome, FilterError> {
    let content = std::fs::read_to_string(path).map_err(|source| FilterError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let backup = backup_path(path, now);
    std::fs::write(&backup, &content).map_err(|source| FilterError::Backup {
        path: backup.clone(),
        source,
    })?;
    info!(backup = %backup.display(), "Backed up original log");

    let (filtered, stats) = filter_content(&content);
    std::fs::write(path, filtered).map_err(|source| FilterError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), kept = stats.kept_lines, "Rewrote log file");

    Ok(FilterOutcome {
        path: path.to_path_buf(),
        backup_path: backup,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_backup_path_appends_timestamp_suffix() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        let backup = backup_path(Path::new("/var/log/aws_cleanup.log"), now);
        assert_eq!(
            backup,
            PathBuf::from("/var/log/aws_cleanup.log.20240102_030405.bak")
        );
    }
}
