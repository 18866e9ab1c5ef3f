//! Finding log files to filter
//!
//! An explicit path always wins. Otherwise the well-known locations are
//! tried in order: the working directory, its parent, then a recursive walk
//! of the working directory that collects every match.

use aws_cleaner_common::defaults::LOG_FILE_NAME;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where the log files came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// Path given on the command line
    Explicit(PathBuf),
    /// `./aws_cleanup.log`
    CurrentDir(PathBuf),
    /// `../aws_cleanup.log`
    ParentDir(PathBuf),
    /// Every `aws_cleanup.log` below the working directory
    Search(Vec<PathBuf>),
    /// Path given on the command line does not exist
    Missing(PathBuf),
    /// Nothing found anywhere
    NotFound,
}

impl LocateOutcome {
    /// Files to process, in order
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            LocateOutcome::Explicit(p)
            | LocateOutcome::CurrentDir(p)
            | LocateOutcome::ParentDir(p) => vec![p.clone()],
            LocateOutcome::Search(paths) => paths.clone(),
            LocateOutcome::Missing(_) | LocateOutcome::NotFound => Vec::new(),
        }
    }
}

/// Resolve which log files to filter, relative to `cwd`.
pub fn locate_log_files(explicit: Option<&Path>, cwd: &Path) -> LocateOutcome {
    if let Some(path) = explicit {
        return if path.is_file() {
            LocateOutcome::Explicit(path.to_path_buf())
        } else {
            LocateOutcome::Missing(path.to_path_buf())
        };
    }

    let here = cwd.join(LOG_FILE_NAME);
    if here.is_file() {
        return LocateOutcome::CurrentDir(here);
    }

    if let Some(parent) = cwd.parent() {
        let above = parent.join(LOG_FILE_NAME);
        if above.is_file() {
            return LocateOutcome::ParentDir(above);
        }
    }

    let found: Vec<PathBuf> = WalkDir::new(cwd)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == LOG_FILE_NAME)
        .map(|entry| entry.into_path())
        .collect();

    if found.is_empty() {
        LocateOutcome::NotFound
    } else {
        LocateOutcome::Search(found)
    }
}
