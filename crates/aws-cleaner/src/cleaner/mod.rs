//! Per-resource cleaners
//!
//! Each submodule exposes one `clean` function that walks its service in a
//! fixed dependency order against a mockable `*Api` trait. The helpers here
//! give every cleaner the same logging shape:
//!
//! - dry run: `[DRY RUN] Would <verb> <target>` at INFO, no call issued
//! - live: `<Progressive> <target>` then `Successfully <past> <target>` at WARN
//! - expected rejections (in use, not found) at WARN, everything else at ERROR

pub mod cloudformation;
pub mod ec2;
pub mod iam;
pub mod lambda;
pub mod rds;
pub mod s3;
pub mod vpc;

use crate::aws::AwsError;
use aws_cleaner_common::ResourceKind;
use aws_cleaner_common::defaults::{
    DEFAULT_DELETION_PROTECTION_SETTLE_SECS, DEFAULT_VPN_DETACH_SETTLE_SECS,
};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fixed pauses after a prerequisite call, before the dependent delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After requesting a VPN gateway detach
    pub vpn_detach: Duration,
    /// After disabling RDS deletion protection
    pub deletion_protection: Duration,
}

impl SettleDelays {
    /// Same delay for every settle point
    pub fn uniform(delay: Duration) -> Self {
        Self {
            vpn_detach: delay,
            deletion_protection: delay,
        }
    }

    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            vpn_detach: Duration::from_secs(DEFAULT_VPN_DETACH_SETTLE_SECS),
            deletion_protection: Duration::from_secs(DEFAULT_DELETION_PROTECTION_SETTLE_SECS),
        }
    }
}

/// Options shared by every cleaner in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Log intended actions without issuing any mutating call
    pub dry_run: bool,
    pub settle: SettleDelays,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            settle: SettleDelays::default(),
        }
    }
}

/// Counters for one cleaner invocation (or a merge of several)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub found: usize,
    pub deleted: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub expected_failures: usize,
    pub failed: usize,
}

impl CleanupReport {
    pub fn merge(&mut self, other: &CleanupReport) {
        self.found += other.found;
        self.deleted += other.deleted;
        self.dry_run += other.dry_run;
        self.skipped += other.skipped;
        self.expected_failures += other.expected_failures;
        self.failed += other.failed;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "found {}, deleted {}", self.found, self.deleted)?;
        if self.dry_run > 0 {
            write!(f, ", would delete {}", self.dry_run)?;
        }
        write!(
            f,
            ", skipped {}, in use/not found {}, failed {}",
            self.skipped, self.expected_failures, self.failed
        )
    }
}

/// Outcome of a single mutating call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupResult {
    /// Call succeeded
    Deleted,
    /// Dry run; nothing was sent
    DryRun,
    /// Provider rejected it for an expected reason (in use, not found)
    ExpectedFailure,
    /// Any other provider error
    Failed,
}

impl CleanupResult {
    /// The call went through, or would have in a dry run
    pub fn proceeded(self) -> bool {
        matches!(self, CleanupResult::Deleted | CleanupResult::DryRun)
    }
}

/// Mutating call kinds, for log wording and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Delete,
    /// Asynchronous delete the provider finishes on its own
    InitiateDelete,
    Terminate,
    Release,
    Deregister,
    Empty,
    Detach,
    Disassociate,
    Deactivate,
    Remove,
    DisableProtection,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Delete | Action::InitiateDelete => "delete",
            Action::Terminate => "terminate",
            Action::Release => "release",
            Action::Deregister => "deregister",
            Action::Empty => "empty",
            Action::Detach => "detach",
            Action::Disassociate => "disassociate",
            Action::Deactivate => "deactivate",
            Action::Remove => "remove",
            Action::DisableProtection => "disable deletion protection on",
        }
    }

    fn progressive(self) -> &'static str {
        match self {
            Action::Delete | Action::InitiateDelete => "Deleting",
            Action::Terminate => "Terminating",
            Action::Release => "Releasing",
            Action::Deregister => "Deregistering",
            Action::Empty => "Emptying",
            Action::Detach => "Detaching",
            Action::Disassociate => "Disassociating",
            Action::Deactivate => "Deactivating",
            Action::Remove => "Removing",
            Action::DisableProtection => "Disabling deletion protection on",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Action::Delete => "deleted",
            Action::InitiateDelete => "initiated deletion of",
            Action::Terminate => "initiated termination of",
            Action::Release => "released",
            Action::Deregister => "deregistered",
            Action::Empty => "emptied",
            Action::Detach => "detached",
            Action::Disassociate => "disassociated",
            Action::Deactivate => "deactivated",
            Action::Remove => "removed",
            Action::DisableProtection => "disabled deletion protection on",
        }
    }

    /// Whether success removes a resource, as opposed to a prerequisite step
    fn removes_resource(self) -> bool {
        matches!(
            self,
            Action::Delete
                | Action::InitiateDelete
                | Action::Terminate
                | Action::Release
                | Action::Deregister
        )
    }
}

/// Run one mutating call, or log it in a dry run.
///
/// `call` is only invoked outside dry run, so nothing reaches the provider
/// when `opts.dry_run` is set.
pub(crate) async fn attempt<F, Fut>(
    report: &mut CleanupReport,
    opts: &CleanupOptions,
    action: Action,
    target: &str,
    call: F,
) -> CleanupResult
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), AwsError>>,
{
    if opts.dry_run {
        info!("[DRY RUN] Would {} {}", action.verb(), target);
        if action.removes_resource() {
            report.dry_run += 1;
        }
        return CleanupResult::DryRun;
    }

    warn!("{} {}", action.progressive(), target);
    match call().await {
        Ok(()) => {
            warn!("Successfully {} {}", action.past(), target);
            if action.removes_resource() {
                report.deleted += 1;
            }
            CleanupResult::Deleted
        }
        Err(e) if e.is_expected() => {
            warn!("Could not {} {}: {}", action.verb(), target, e);
            report.expected_failures += 1;
            CleanupResult::ExpectedFailure
        }
        Err(e) => {
            error!("Failed to {} {}: {}", action.verb(), target, e);
            report.failed += 1;
            CleanupResult::Failed
        }
    }
}

/// Unwrap a listing result, logging and counting a failure as empty.
pub(crate) fn listed<T>(
    report: &mut CleanupReport,
    what: &str,
    scope: &str,
    result: Result<Vec<T>, AwsError>,
) -> Vec<T> {
    match result {
        Ok(items) => {
            if items.is_empty() {
                info!("No {} found in {}", what, scope);
            }
            report.found += items.len();
            items
        }
        Err(e) => {
            error!("Error listing {} in {}: {}", what, scope, e);
            report.failed += 1;
            Vec::new()
        }
    }
}

/// Like [`listed`], but a feature the region does not offer is not a failure.
pub(crate) fn listed_if_available<T>(
    report: &mut CleanupReport,
    what: &str,
    scope: &str,
    result: Result<Vec<T>, AwsError>,
) -> Vec<T> {
    match result {
        Err(e) if e.is_unavailable() => {
            info!("{} not available or not authorized in {}", what, scope);
            Vec::new()
        }
        other => listed(report, what, scope, other),
    }
}

/// Record a resource left alone because of its state.
pub(crate) fn skip(report: &mut CleanupReport, target: &str, reason: &str) {
    info!("Skipping {} as it's {}", target, reason);
    report.skipped += 1;
}

/// Sleep for a settle delay; zero delays return immediately.
pub(crate) async fn settle(delay: Duration, reason: &str) {
    if delay.is_zero() {
        return;
    }
    debug!(delay_secs = delay.as_secs_f64(), "Waiting for {}", reason);
    tokio::time::sleep(delay).await;
}

pub(crate) fn completed(kind: ResourceKind, scope: Option<&str>) {
    match scope {
        Some(region) => info!(
            "Completed {} resource cleanup in {}",
            kind.display_name(),
            region
        ),
        None => info!("Completed {} resource cleanup", kind.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;

    #[test]
    fn report_display() {
        let mut report = CleanupReport {
            found: 4,
            deleted: 2,
            skipped: 1,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "found 4, deleted 2, skipped 1, in use/not found 0, failed 1"
        );
        report.dry_run = 3;
        assert!(report.to_string().contains("would delete 3"));
    }

    fn live() -> CleanupOptions {
        CleanupOptions {
            dry_run: false,
            settle: SettleDelays::none(),
        }
    }

    #[tokio::test]
    async fn dry_run_never_invokes_call() {
        let mut report = CleanupReport::default();
        let opts = CleanupOptions {
            dry_run: true,
            settle: SettleDelays::none(),
        };

        let mut called = false;
        let result = attempt(&mut report, &opts, Action::Delete, "thing t-1", || {
            called = true;
            async { Ok(()) }
        })
        .await;

        assert!(!called);
        assert_eq!(result, CleanupResult::DryRun);
        assert_eq!(report.dry_run, 1);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn outcomes_are_counted_by_class() {
        let mut report = CleanupReport::default();
        let opts = live();

        let ok = attempt(&mut report, &opts, Action::Delete, "a", || async { Ok(()) }).await;
        let in_use = attempt(&mut report, &opts, Action::Delete, "b", || async {
            Err(classify_aws_error(Some("DependencyViolation"), Some("busy")))
        })
        .await;
        let denied = attempt(&mut report, &opts, Action::Delete, "c", || async {
            Err(classify_aws_error(Some("AccessDenied"), Some("no")))
        })
        .await;

        assert_eq!(ok, CleanupResult::Deleted);
        assert_eq!(in_use, CleanupResult::ExpectedFailure);
        assert_eq!(denied, CleanupResult::Failed);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.expected_failures, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn prerequisite_actions_do_not_count_as_deletions() {
        let mut report = CleanupReport::default();
        attempt(&mut report, &live(), Action::Detach, "igw", || async { Ok(()) }).await;
        assert_eq!(report.deleted, 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn listing_failure_counts_and_yields_nothing() {
        let mut report = CleanupReport::default();
        let items: Vec<u8> = listed(
            &mut report,
            "widgets",
            "us-east-1",
            Err(classify_aws_error(Some("AccessDenied"), None)),
        );
        assert!(items.is_empty());
        assert_eq!(report.failed, 1);

        let items = listed(&mut report, "widgets", "us-east-1", Ok(vec![1, 2]));
        assert_eq!(items, vec![1, 2]);
        assert_eq!(report.found, 2);
    }

    #[test]
    fn unavailable_feature_is_not_a_failure() {
        let mut report = CleanupReport::default();
        let items: Vec<u8> = listed_if_available(
            &mut report,
            "Transit Gateways",
            "ap-east-1",
            Err(classify_aws_error(Some("InvalidAction"), None)),
        );
        assert!(items.is_empty());
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn merge_adds_every_counter() {
        let mut total = CleanupReport {
            found: 1,
            deleted: 1,
            ..Default::default()
        };
        total.merge(&CleanupReport {
            found: 2,
            skipped: 1,
            failed: 1,
            ..Default::default()
        });
        assert_eq!(total.found, 3);
        assert_eq!(total.deleted, 1);
        assert_eq!(total.skipped, 1);
        assert!(total.has_failures());
    }
}
