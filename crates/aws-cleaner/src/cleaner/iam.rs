//! IAM cleanup (global, runs once per invocation)
//!
//! IAM refuses to delete an entity that still has anything attached, so each
//! user, group, role and policy is stripped of its attachments first.
//! Attachment listings are not counted as found resources; only the entities
//! and the things that get deleted along with them are.

use super::{Action, CleanupOptions, CleanupReport, attempt, completed, listed, skip};
use crate::aws::{AwsError, IamApi, ignore_not_found};
use aws_cleaner_common::ResourceKind;
use tracing::{error, info};

const SCOPE: &str = "the account";

/// Unwrap an attachment listing, logging and counting a failure as empty.
fn dependents<T>(
    report: &mut CleanupReport,
    what: &str,
    owner: &str,
    result: Result<Vec<T>, AwsError>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!("Error listing {} for {}: {}", what, owner, e);
        report.failed += 1;
        Vec::new()
    })
}

pub async fn clean<A: IamApi>(api: &A, opts: &CleanupOptions) -> CleanupReport {
    let mut report = CleanupReport::default();

    match api.account_alias().await {
        Ok(alias) => info!(
            "Cleaning IAM resources for account alias: {}",
            alias.as_deref().unwrap_or("No alias")
        ),
        Err(e) => error!("Error getting account alias: {}", e),
    }

    info!("Checking for IAM users...");
    for user in listed(&mut report, "IAM users", SCOPE, api.list_users().await) {
        clean_user(api, opts, &mut report, &user).await;
    }

    info!("Checking for IAM groups...");
    for group in listed(&mut report, "IAM groups", SCOPE, api.list_groups().await) {
        clean_group(api, opts, &mut report, &group).await;
    }

    info!("Checking for IAM roles...");
    for role in listed(&mut report, "IAM roles", SCOPE, api.list_roles().await) {
        if role.is_service_role() {
            skip(
                &mut report,
                &format!("IAM role {}", role.name),
                &format!("a service role ({})", role.path),
            );
            continue;
        }
        clean_role(api, opts, &mut report, &role.name).await;
    }

    info!("Checking for customer-managed IAM policies...");
    for policy in listed(
        &mut report,
        "customer-managed IAM policies",
        SCOPE,
        api.list_local_policies().await,
    ) {
        let target = format!("IAM policy {}", policy.name);

        match api.list_entities_for_policy(&policy.arn).await {
            Ok(entities) => {
                for user in &entities.users {
                    attempt(
                        &mut report,
                        opts,
                        Action::Detach,
                        &format!("{} from user {}", target, user),
                        || api.detach_user_policy(user, &policy.arn),
                    )
                    .await;
                }
                for group in &entities.groups {
                    attempt(
                        &mut report,
                        opts,
                        Action::Detach,
                        &format!("{} from group {}", target, group),
                        || api.detach_group_policy(group, &policy.arn),
                    )
                    .await;
                }
                for role in &entities.roles {
                    attempt(
                        &mut report,
                        opts,
                        Action::Detach,
                        &format!("{} from role {}", target, role),
                        || api.detach_role_policy(role, &policy.arn),
                    )
                    .await;
                }
            }
            Err(e) => {
                error!("Error listing entities for {}: {}", target, e);
                report.failed += 1;
            }
        }

        let versions = dependents(
            &mut report,
            "policy versions",
            &target,
            api.list_policy_versions(&policy.arn).await,
        );
        for version in versions.iter().filter(|v| !v.is_default) {
            attempt(
                &mut report,
                opts,
                Action::Delete,
                &format!("{} version {}", target, version.id),
                || api.delete_policy_version(&policy.arn, &version.id),
            )
            .await;
        }

        attempt(&mut report, opts, Action::Delete, &target, || {
            api.delete_policy(&policy.arn)
        })
        .await;
    }

    completed(ResourceKind::Iam, None);
    report
}

async fn clean_user<A: IamApi>(
    api: &A,
    opts: &CleanupOptions,
    report: &mut CleanupReport,
    user: &str,
) {
    let target = format!("IAM user {}", user);

    let keys = dependents(report, "access keys", &target, api.list_access_keys(user).await);
    for key in &keys {
        attempt(
            report,
            opts,
            Action::Delete,
            &format!("access key {} of {}", key, target),
            || api.delete_access_key(user, key),
        )
        .await;
    }

    let inline = dependents(
        report,
        "inline policies",
        &target,
        api.list_user_policies(user).await,
    );
    for policy in &inline {
        attempt(
            report,
            opts,
            Action::Delete,
            &format!("inline policy {} of {}", policy, target),
            || api.delete_user_policy(user, policy),
        )
        .await;
    }

    let attached = dependents(
        report,
        "attached policies",
        &target,
        api.list_attached_user_policies(user).await,
    );
    for arn in &attached {
        attempt(
            report,
            opts,
            Action::Detach,
            &format!("policy {} from {}", arn, target),
            || api.detach_user_policy(user, arn),
        )
        .await;
    }

    let groups = dependents(report, "groups", &target, api.list_groups_for_user(user).await);
    for group in &groups {
        attempt(
            report,
            opts,
            Action::Remove,
            &format!("{} from group {}", target, group),
            || api.remove_user_from_group(group, user),
        )
        .await;
    }

    let devices = dependents(report, "MFA devices", &target, api.list_mfa_devices(user).await);
    for serial in &devices {
        attempt(
            report,
            opts,
            Action::Deactivate,
            &format!("MFA device {} of {}", serial, target),
            || api.deactivate_mfa_device(user, serial),
        )
        .await;
    }

    attempt(
        report,
        opts,
        Action::Remove,
        &format!("login profile of {}", target),
        || async move { ignore_not_found(api.delete_login_profile(user).await) },
    )
    .await;

    attempt(report, opts, Action::Delete, &target, || {
        api.delete_user(user)
    })
    .await;
}

async fn clean_group<A: IamApi>(
    api: &A,
    opts: &CleanupOptions,
    report: &mut CleanupReport,
    group: &str,
) {
    let target = format!("IAM group {}", group);

    let inline = dependents(
        report,
        "inline policies",
        &target,
        api.list_group_policies(group).await,
    );
    for policy in &inline {
        attempt(
            report,
            opts,
            Action::Delete,
            &format!("inline policy {} of {}", policy, target),
            || api.delete_group_policy(group, policy),
        )
        .await;
    }

    let attached = dependents(
        report,
        "attached policies",
        &target,
        api.list_attached_group_policies(group).await,
    );
    for arn in &attached {
        attempt(
            report,
            opts,
            Action::Detach,
            &format!("policy {} from {}", arn, target),
            || api.detach_group_policy(group, arn),
        )
        .await;
    }

    attempt(report, opts, Action::Delete, &target, || {
        api.delete_group(group)
    })
    .await;
}

async fn clean_role<A: IamApi>(
    api: &A,
    opts: &CleanupOptions,
    report: &mut CleanupReport,
    role: &str,
) {
    let target = format!("IAM role {}", role);

    let inline = dependents(
        report,
        "inline policies",
        &target,
        api.list_role_policies(role).await,
    );
    for policy in &inline {
        attempt(
            report,
            opts,
            Action::Delete,
            &format!("inline policy {} of {}", policy, target),
            || api.delete_role_policy(role, policy),
        )
        .await;
    }

    let attached = dependents(
        report,
        "attached policies",
        &target,
        api.list_attached_role_policies(role).await,
    );
    for arn in &attached {
        attempt(
            report,
            opts,
            Action::Detach,
            &format!("policy {} from {}", arn, target),
            || api.detach_role_policy(role, arn),
        )
        .await;
    }

    let profiles = dependents(
        report,
        "instance profiles",
        &target,
        api.list_instance_profiles_for_role(role).await,
    );
    for profile in &profiles {
        let removed = attempt(
            report,
            opts,
            Action::Remove,
            &format!("{} from instance profile {}", target, profile),
            || api.remove_role_from_instance_profile(profile, role),
        )
        .await;
        if removed.proceeded() {
            attempt(
                report,
                opts,
                Action::Delete,
                &format!("instance profile {}", profile),
                || api.delete_instance_profile(profile),
            )
            .await;
        }
    }

    attempt(report, opts, Action::Delete, &target, || {
        api.delete_role(role)
    })
    .await;
}
