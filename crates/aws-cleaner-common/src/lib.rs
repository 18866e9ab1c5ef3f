//! aws-cleaner-common - Shared types and constants
//!
//! This crate holds the pieces shared between the cleaner and the log
//! filter, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`log_format`]: Log line layout shared by the writer and the filter
//! - [`resource_kind`]: Cleanable resource types and their execution order

pub mod defaults;
pub mod log_format;
pub mod resource_kind;

pub use log_format::LogLevel;
pub use resource_kind::ResourceKind;
