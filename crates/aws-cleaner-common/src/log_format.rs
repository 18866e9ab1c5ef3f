//! Log line layout
//!
//! Lines look like `2024-05-01 13:37:00 - WARNING - Deleting VPC vpc-0abc`.
//! The cleaner writes them and the log filter matches on the ` - LEVEL - `
//! marker, so both sides go through this module.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// strftime layout of the leading timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between timestamp, level and message
pub const SEPARATOR: &str = " - ";

/// Severity as it appears in the log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// The ` - LEVEL - ` fragment that sits between timestamp and message
    pub fn marker(self) -> String {
        format!("{SEPARATOR}{}{SEPARATOR}", self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}' (expected debug, info, warning or error)")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// Render one log line (without trailing newline)
pub fn format_line(timestamp: NaiveDateTime, level: LogLevel, message: &str) -> String {
    format!(
        "{}{SEPARATOR}{}{SEPARATOR}{message}",
        timestamp.format(TIMESTAMP_FORMAT),
        level.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(13, 37, 0))
            .unwrap()
    }

    #[test]
    fn test_format_line_layout() {
        let line = format_line(sample_time(), LogLevel::Warning, "Deleting VPC vpc-0abc");
        assert_eq!(line, "2024-05-01 13:37:00 - WARNING - Deleting VPC vpc-0abc");
    }

    #[test]
    fn test_marker_is_found_in_formatted_line() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
        ] {
            let line = format_line(sample_time(), level, "msg");
            assert!(line.contains(&level.marker()), "missing marker for {level}");
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_parse_accepts_warn_alias() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
