//! aws-cleaner - enumerate and delete AWS account resources
//!
//! This crate provides the cleaners for each supported service, the
//! orchestrator that walks them across every enabled region, and the TUI
//! and headless front ends behind the `aws-cleaner` binary.

pub mod aws;
pub mod cleaner;
pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod profiles;
pub mod tui;
