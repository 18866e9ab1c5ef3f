//! Cleanup run orchestration
//!
//! One run validates the session, resolves the region list once, runs the
//! global IAM cleaner once and then walks every region through the selected
//! regional cleaners in execution order. Every scope is isolated: an error in
//! one cleaner or region is logged and recorded in the summary, and the walk
//! carries on. Only a failed credential check aborts the run.

use crate::aws::{
    AccountId, AwsContext, CloudFormationClient, Ec2Client, FromAwsContext, IamClient,
    LambdaClient, RdsClient, S3Client, get_current_account_id,
};
use crate::cleaner::{self, CleanupOptions, CleanupReport};
use crate::config::RunConfig;
use anyhow::{Context, Result, bail};
use aws_cleaner_common::ResourceKind;
use aws_cleaner_common::defaults::BOOTSTRAP_REGION;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The provider surface a run needs.
///
/// [`AwsBackend`] dispatches to the real cleaners; tests substitute a mock to
/// exercise the walk itself.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait CleanupBackend: Send + Sync {
    /// Validate the session and return the caller's account
    async fn account_id(&self) -> Result<AccountId>;

    /// Regions enabled for the account
    async fn list_regions(&self) -> Result<Vec<String>>;

    async fn clean_global(&self, kind: ResourceKind, opts: &CleanupOptions)
    -> Result<CleanupReport>;

    async fn clean_region(
        &self,
        kind: ResourceKind,
        region: &str,
        account: &AccountId,
        opts: &CleanupOptions,
    ) -> Result<CleanupReport>;
}

/// Backend over a live AWS session
pub struct AwsBackend {
    session: AwsContext,
}

impl AwsBackend {
    /// Load the session for `profile` (default credential chain when `None`).
    pub async fn connect(profile: Option<&str>) -> Self {
        Self {
            session: AwsContext::with_profile(BOOTSTRAP_REGION, profile).await,
        }
    }
}

impl CleanupBackend for AwsBackend {
    async fn account_id(&self) -> Result<AccountId> {
        get_current_account_id(&self.session).await
    }

    async fn list_regions(&self) -> Result<Vec<String>> {
        Ec2Client::from_context(&self.session)
            .describe_regions()
            .await
            .context("Failed to list AWS regions")
    }

    async fn clean_global(
        &self,
        kind: ResourceKind,
        opts: &CleanupOptions,
    ) -> Result<CleanupReport> {
        match kind {
            ResourceKind::Iam => {
                let iam = IamClient::from_context(&self.session);
                Ok(cleaner::iam::clean(&iam, opts).await)
            }
            other => bail!("{other} is a regional resource type"),
        }
    }

    async fn clean_region(
        &self,
        kind: ResourceKind,
        region: &str,
        account: &AccountId,
        opts: &CleanupOptions,
    ) -> Result<CleanupReport> {
        let ctx = self.session.for_region(region);
        let report = match kind {
            ResourceKind::Ec2 => {
                cleaner::ec2::clean(&Ec2Client::from_context(&ctx), region, account, opts).await
            }
            ResourceKind::S3 => {
                cleaner::s3::clean(&S3Client::from_context(&ctx), region, opts).await
            }
            ResourceKind::Lambda => {
                cleaner::lambda::clean(&LambdaClient::from_context(&ctx), region, opts).await
            }
            ResourceKind::CloudFormation => {
                cleaner::cloudformation::clean(
                    &CloudFormationClient::from_context(&ctx),
                    region,
                    opts,
                )
                .await
            }
            ResourceKind::Rds => {
                cleaner::rds::clean(&RdsClient::from_context(&ctx), region, opts).await
            }
            ResourceKind::Vpc => {
                cleaner::vpc::clean(&Ec2Client::from_context(&ctx), region, opts).await
            }
            ResourceKind::Iam => bail!("IAM is global and has no region scope"),
        };
        Ok(report)
    }
}

/// Progress updates sent to the front end while a run is in flight
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Credentials validated
    Account(String),
    /// Regions the walk will visit
    Regions(Vec<String>),
    /// A cleaner is starting on a scope
    Started {
        kind: ResourceKind,
        region: Option<String>,
    },
    /// A cleaner finished a scope
    Finished {
        kind: ResourceKind,
        region: Option<String>,
        report: CleanupReport,
    },
}

/// Outcome of one cleaner on one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    pub kind: ResourceKind,
    /// `None` for global kinds
    pub region: Option<String>,
    pub report: CleanupReport,
}

/// Everything a run did, returned to the front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub account_id: Option<String>,
    pub dry_run: bool,
    pub regions: Vec<String>,
    pub reports: Vec<ScopeReport>,
    /// Scopes whose cleaner or setup step failed outright
    pub failed_scopes: Vec<String>,
    /// Set when the run stopped before touching any scope
    pub aborted: Option<String>,
}

impl RunSummary {
    /// All per-scope counters added up
    pub fn totals(&self) -> CleanupReport {
        let mut total = CleanupReport::default();
        for scope in &self.reports {
            total.merge(&scope.report);
        }
        total
    }

    /// Totals per resource kind, in execution order
    pub fn by_kind(&self) -> Vec<(ResourceKind, CleanupReport)> {
        let mut kinds: Vec<(ResourceKind, CleanupReport)> = Vec::new();
        for scope in &self.reports {
            match kinds.iter_mut().find(|(k, _)| *k == scope.kind) {
                Some((_, total)) => total.merge(&scope.report),
                None => kinds.push((scope.kind, scope.report)),
            }
        }
        kinds.sort_by_key(|(k, _)| k.execution_priority());
        kinds
    }

    pub fn has_failures(&self) -> bool {
        self.aborted.is_some() || !self.failed_scopes.is_empty() || self.totals().has_failures()
    }

    /// Human-readable summary, one line per fact
    pub fn describe(&self) -> Vec<String> {
        let mode = if self.dry_run { "Dry run" } else { "Cleanup" };
        let mut lines = Vec::new();
        if let Some(reason) = &self.aborted {
            lines.push(format!("{mode} aborted: {reason}"));
            return lines;
        }

        lines.push(format!(
            "{mode} finished for account {} across {} region(s)",
            self.account_id.as_deref().unwrap_or("unknown"),
            self.regions.len()
        ));
        for (kind, report) in self.by_kind() {
            lines.push(format!("{:<15} {}", kind.display_name(), report));
        }
        lines.push(format!("{:<15} {}", "Total", self.totals()));
        if !self.failed_scopes.is_empty() {
            lines.push(format!("Failed scopes: {}", self.failed_scopes.join(", ")));
        }
        lines
    }
}

async fn notify(progress: Option<&mpsc::Sender<Progress>>, update: Progress) {
    if let Some(tx) = progress {
        let _ = tx.send(update).await;
    }
}

fn scope_label(kind: ResourceKind, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{kind} in {region}"),
        None => kind.to_string(),
    }
}

/// Keep the regions the operator asked for, warning about unknown names.
fn select_regions(available: Vec<String>, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return available;
    }
    for name in requested {
        if !available.contains(name) {
            warn!(region = %name, "Requested region is not enabled for this account");
        }
    }
    available
        .into_iter()
        .filter(|r| requested.contains(r))
        .collect()
}

/// Run a whole cleanup against `backend`.
///
/// Never fails: setup and per-scope errors are logged and land in the
/// returned summary.
pub async fn run<B: CleanupBackend>(
    backend: &B,
    config: &RunConfig,
    progress: Option<&mpsc::Sender<Progress>>,
) -> RunSummary {
    let opts = config.cleanup_options();
    let kinds = ResourceKind::execution_order(config.resources());
    let mut summary = RunSummary {
        dry_run: opts.dry_run,
        ..Default::default()
    };

    if opts.dry_run {
        warn!("Running in DRY RUN mode. No resources will be deleted.");
    } else {
        warn!("Running in LIVE mode. Resources will be permanently deleted.");
    }

    let account = match backend.account_id().await {
        Ok(account) => account,
        Err(e) => {
            error!("Failed to validate AWS credentials: {:#}", e);
            summary.aborted = Some(format!("{e:#}"));
            return summary;
        }
    };
    info!(account_id = %account, "Starting AWS resource cleanup");
    summary.account_id = Some(account.to_string());
    notify(progress, Progress::Account(account.to_string())).await;

    let regional: Vec<ResourceKind> = kinds.iter().copied().filter(|k| !k.is_global()).collect();
    if !regional.is_empty() {
        match backend.list_regions().await {
            Ok(available) => {
                summary.regions = select_regions(available, config.regions());
                info!(
                    count = summary.regions.len(),
                    "Regions to process: {}",
                    summary.regions.join(", ")
                );
            }
            Err(e) => {
                error!("Error listing regions: {:#}", e);
                summary.failed_scopes.push("region listing".to_string());
            }
        }
        notify(progress, Progress::Regions(summary.regions.clone())).await;
    }

    for kind in kinds.iter().copied().filter(|k| k.is_global()) {
        notify(progress, Progress::Started { kind, region: None }).await;
        info!("Cleaning {} resources (global)", kind);
        match backend.clean_global(kind, &opts).await {
            Ok(report) => {
                summary.reports.push(ScopeReport {
                    kind,
                    region: None,
                    report,
                });
                notify(
                    progress,
                    Progress::Finished {
                        kind,
                        region: None,
                        report,
                    },
                )
                .await;
            }
            Err(e) => {
                error!("Error cleaning {} resources: {:#}", kind, e);
                summary.failed_scopes.push(scope_label(kind, None));
            }
        }
    }

    let regions = summary.regions.clone();
    for region in &regions {
        info!("Processing region: {}", region);
        for kind in regional.iter().copied() {
            let scope = Some(region.clone());
            notify(
                progress,
                Progress::Started {
                    kind,
                    region: scope.clone(),
                },
            )
            .await;
            match backend.clean_region(kind, region, &account, &opts).await {
                Ok(report) => {
                    summary.reports.push(ScopeReport {
                        kind,
                        region: scope.clone(),
                        report,
                    });
                    notify(
                        progress,
                        Progress::Finished {
                            kind,
                            region: scope,
                            report,
                        },
                    )
                    .await;
                }
                Err(e) => {
                    error!("Error cleaning {} resources in {}: {:#}", kind, region, e);
                    summary.failed_scopes.push(scope_label(kind, Some(region)));
                }
            }
        }
    }

    let totals = summary.totals();
    info!(
        found = totals.found,
        deleted = totals.deleted,
        would_delete = totals.dry_run,
        skipped = totals.skipped,
        expected_failures = totals.expected_failures,
        failed = totals.failed,
        "AWS resource cleanup completed"
    );
    summary
}

/// Start the single background worker for a run.
///
/// The session is loaded inside the task so the UI stays responsive while
/// credentials resolve.
pub fn spawn_worker(config: RunConfig, progress: mpsc::Sender<Progress>) -> JoinHandle<RunSummary> {
    tokio::spawn(async move {
        let backend = AwsBackend::connect(config.profile()).await;
        run(&backend, &config, Some(&progress)).await
    })
}
