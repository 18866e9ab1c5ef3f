//! RDS cleanup
//!
//! Databases first (instances, then clusters), then snapshots, then the
//! groups and subscriptions that databases reference. AWS-managed `default`
//! groups are filtered out at list time.

use super::{
    Action, CleanupOptions, CleanupReport, CleanupResult, attempt, completed, listed, settle, skip,
};
use crate::aws::{AwsError, RdsApi};
use crate::aws::rds::is_deleting;
use aws_cleaner_common::ResourceKind;
use tracing::info;

fn custom_only(
    result: Result<Vec<String>, AwsError>,
    is_managed: impl Fn(&str) -> bool,
) -> Result<Vec<String>, AwsError> {
    result.map(|names| names.into_iter().filter(|n| !is_managed(n)).collect())
}

pub async fn clean<A: RdsApi>(api: &A, region: &str, opts: &CleanupOptions) -> CleanupReport {
    let mut report = CleanupReport::default();

    info!("Checking for RDS DB instances in {}...", region);
    for instance in listed(
        &mut report,
        "RDS DB instances",
        region,
        api.list_instances().await,
    ) {
        let target = format!("RDS instance {}", instance.id);
        info!(
            instance = %instance.id,
            engine = %instance.engine.as_deref().unwrap_or("N/A"),
            status = %instance.status,
            "Found RDS instance"
        );
        if is_deleting(&instance.status) {
            skip(&mut report, &target, "already deleting");
            continue;
        }
        if let Some(cluster) = &instance.cluster_id {
            skip(
                &mut report,
                &target,
                &format!("part of cluster {} (deleted with the cluster)", cluster),
            );
            continue;
        }
        if instance.deletion_protection {
            let disabled = attempt(&mut report, opts, Action::DisableProtection, &target, || {
                api.disable_instance_protection(&instance.id)
            })
            .await;
            if disabled == CleanupResult::Deleted {
                settle(
                    opts.settle.deletion_protection,
                    "deletion protection change to apply",
                )
                .await;
            }
        }
        attempt(&mut report, opts, Action::InitiateDelete, &target, || {
            api.delete_instance(&instance.id)
        })
        .await;
    }

    info!("Checking for RDS DB clusters in {}...", region);
    for cluster in listed(
        &mut report,
        "RDS DB clusters",
        region,
        api.list_clusters().await,
    ) {
        let target = format!("RDS cluster {}", cluster.id);
        info!(
            cluster = %cluster.id,
            engine = %cluster.engine.as_deref().unwrap_or("N/A"),
            status = %cluster.status,
            "Found RDS cluster"
        );
        if is_deleting(&cluster.status) {
            skip(&mut report, &target, "already deleting");
            continue;
        }
        if cluster.deletion_protection {
            let disabled = attempt(&mut report, opts, Action::DisableProtection, &target, || {
                api.disable_cluster_protection(&cluster.id)
            })
            .await;
            if disabled == CleanupResult::Deleted {
                settle(
                    opts.settle.deletion_protection,
                    "deletion protection change to apply",
                )
                .await;
            }
        }
        attempt(&mut report, opts, Action::InitiateDelete, &target, || {
            api.delete_cluster(&cluster.id)
        })
        .await;
    }

    info!("Checking for RDS DB snapshots in {}...", region);
    for snapshot in listed(
        &mut report,
        "RDS DB snapshots",
        region,
        api.list_snapshots().await,
    ) {
        let target = format!("RDS snapshot {}", snapshot.id);
        if is_deleting(&snapshot.status) {
            skip(&mut report, &target, "already deleting");
            continue;
        }
        attempt(&mut report, opts, Action::Delete, &target, || {
            api.delete_snapshot(&snapshot.id)
        })
        .await;
    }

    info!("Checking for RDS DB cluster snapshots in {}...", region);
    for snapshot in listed(
        &mut report,
        "RDS DB cluster snapshots",
        region,
        api.list_cluster_snapshots().await,
    ) {
        let target = format!("RDS cluster snapshot {}", snapshot.id);
        if is_deleting(&snapshot.status) {
            skip(&mut report, &target, "already deleting");
            continue;
        }
        attempt(&mut report, opts, Action::Delete, &target, || {
            api.delete_cluster_snapshot(&snapshot.id)
        })
        .await;
    }

    info!("Checking for custom RDS parameter groups in {}...", region);
    for name in listed(
        &mut report,
        "custom RDS parameter groups",
        region,
        custom_only(api.list_parameter_groups().await, |n| {
            n.starts_with("default.")
        }),
    ) {
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("RDS parameter group {}", name),
            || api.delete_parameter_group(&name),
        )
        .await;
    }

    info!("Checking for custom RDS cluster parameter groups in {}...", region);
    for name in listed(
        &mut report,
        "custom RDS cluster parameter groups",
        region,
        custom_only(api.list_cluster_parameter_groups().await, |n| {
            n.starts_with("default.")
        }),
    ) {
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("RDS cluster parameter group {}", name),
            || api.delete_cluster_parameter_group(&name),
        )
        .await;
    }

    info!("Checking for RDS subnet groups in {}...", region);
    for name in listed(
        &mut report,
        "RDS subnet groups",
        region,
        custom_only(api.list_subnet_groups().await, |n| n == "default"),
    ) {
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("RDS subnet group {}", name),
            || api.delete_subnet_group(&name),
        )
        .await;
    }

    info!("Checking for custom RDS option groups in {}...", region);
    for name in listed(
        &mut report,
        "custom RDS option groups",
        region,
        custom_only(api.list_option_groups().await, |n| n.starts_with("default:")),
    ) {
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("RDS option group {}", name),
            || api.delete_option_group(&name),
        )
        .await;
    }

    info!("Checking for RDS event subscriptions in {}...", region);
    for name in listed(
        &mut report,
        "RDS event subscriptions",
        region,
        api.list_event_subscriptions().await,
    ) {
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("RDS event subscription {}", name),
            || api.delete_event_subscription(&name),
        )
        .await;
    }

    completed(ResourceKind::Rds, Some(region));
    report
}
