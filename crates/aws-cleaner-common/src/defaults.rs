//! Default configuration values shared between the cleaner and the log filter

/// Log file written by the cleaner and rewritten by the log filter
pub const LOG_FILE_NAME: &str = "aws_cleanup.log";

/// Region used to bootstrap the session and enumerate the other regions
pub const BOOTSTRAP_REGION: &str = "us-east-1";

/// Pause after requesting a VPN gateway detach, in seconds
pub const DEFAULT_VPN_DETACH_SETTLE_SECS: u64 = 5;

/// Pause after disabling RDS deletion protection, in seconds
pub const DEFAULT_DELETION_PROTECTION_SETTLE_SECS: u64 = 10;

/// Number of WARN/ERROR entries kept for printing after the TUI exits
pub const LOG_CAPTURE_CAPACITY: usize = 50;

/// Maximum number of keys accepted by a single S3 DeleteObjects call
pub const S3_DELETE_BATCH_SIZE: usize = 1000;
