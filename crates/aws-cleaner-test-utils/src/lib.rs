//! Shared test utilities for aws-cleaner
//!
//! ## Modules
//!
//! - [`aws`]: Region and profile detection for live AWS tests
//! - [`logs`]: Log line fixtures in the cleaner's file format

pub mod aws;
pub mod logs;

pub use aws::{get_test_profile, get_test_region};
pub use logs::{log_line, sample_log};
