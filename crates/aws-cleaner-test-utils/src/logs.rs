//! Log line fixtures

use aws_cleaner_common::log_format::{LogLevel, format_line};
use chrono::{NaiveDate, NaiveDateTime};

/// Fixed timestamp so fixtures compare byte for byte
pub fn fixture_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("fixture date is valid")
}

/// One formatted line at the fixture timestamp.
///
/// ```
/// use aws_cleaner_common::LogLevel;
/// use aws_cleaner_test_utils::log_line;
///
/// assert_eq!(
///     log_line(LogLevel::Info, "Found 2 buckets"),
///     "2024-05-01 12:00:00 - INFO - Found 2 buckets"
/// );
/// ```
pub fn log_line(level: LogLevel, message: &str) -> String {
    format_line(fixture_time(), level, message)
}

/// A file body the way a short live run writes it, trailing newline included.
pub fn sample_log() -> String {
    let lines = [
        log_line(LogLevel::Info, "Starting cleanup in LIVE mode"),
        log_line(LogLevel::Info, "Found 1 NAT gateways in us-east-2"),
        log_line(LogLevel::Warning, "Deleting NAT Gateway nat-0abc"),
        log_line(LogLevel::Warning, "Successfully initiated deletion of NAT Gateway nat-0abc"),
        log_line(LogLevel::Error, "Failed to delete subnet subnet-1: AccessDenied"),
        log_line(LogLevel::Info, "Successfully released Elastic IP eipalloc-1"),
        log_line(LogLevel::Info, "Completed VPC resource cleanup in us-east-2"),
        log_line(LogLevel::Debug, "Skipping default VPC vpc-0def"),
    ];
    let mut body = lines.join("\n");
    body.push('\n');
    body
}
