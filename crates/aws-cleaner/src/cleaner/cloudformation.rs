//! CloudFormation stack cleanup

use super::{Action, CleanupOptions, CleanupReport, attempt, completed, listed, skip};
use crate::aws::CloudFormationApi;
use aws_cleaner_common::ResourceKind;
use tracing::{error, info, warn};

/// Delete every root stack in the region.
///
/// Stacks stuck in a failed state are deleted with their failed resources
/// retained, since CloudFormation refuses a plain delete for them.
pub async fn clean<A: CloudFormationApi>(
    api: &A,
    region: &str,
    opts: &CleanupOptions,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    info!("Checking for CloudFormation stacks in {}...", region);
    for stack in listed(
        &mut report,
        "CloudFormation stacks",
        region,
        api.list_stacks().await,
    ) {
        info!(stack = %stack.name, stack_id = %stack.id, status = %stack.status, "Found CloudFormation stack");

        if stack.is_deleting() {
            skip(
                &mut report,
                &format!("stack {}", stack.name),
                "already being deleted",
            );
            continue;
        }
        if stack.is_nested() {
            skip(
                &mut report,
                &format!("stack {}", stack.name),
                "a nested stack (deleted with its root stack)",
            );
            continue;
        }

        let retain = if stack.is_failed() {
            match api.list_failed_resources(&stack.name).await {
                Ok(resources) => {
                    for resource in &resources {
                        warn!("Resource {} in failed state, will be retained", resource);
                    }
                    resources
                }
                Err(e) => {
                    error!("Error listing resources for failed stack {}: {}", stack.name, e);
                    warn!(
                        "Attempting to delete failed stack {} without RetainResources",
                        stack.name
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let target = if retain.is_empty() {
            format!("CloudFormation stack {}", stack.name)
        } else {
            format!(
                "CloudFormation stack {} (retaining {} resources)",
                stack.name,
                retain.len()
            )
        };
        attempt(&mut report, opts, Action::InitiateDelete, &target, || {
            api.delete_stack(&stack.name, retain)
        })
        .await;
    }

    completed(ResourceKind::CloudFormation, Some(region));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;
    use crate::aws::cloudformation::{MockCloudFormationApi, Stack};
    use crate::cleaner::SettleDelays;

    fn live() -> CleanupOptions {
        CleanupOptions {
            dry_run: false,
            settle: SettleDelays::none(),
        }
    }

    fn stack(name: &str, status: &str, root_id: Option<&str>) -> Stack {
        Stack {
            name: name.into(),
            id: format!("arn:stack/{name}"),
            status: status.into(),
            root_id: root_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn deleting_and_nested_stacks_are_skipped() {
        let mut mock = MockCloudFormationApi::new();
        mock.expect_list_stacks().returning(|| {
            Ok(vec![
                stack("app", "CREATE_COMPLETE", None),
                stack("old", "DELETE_IN_PROGRESS", None),
                stack("child", "CREATE_COMPLETE", Some("arn:stack/app")),
            ])
        });
        mock.expect_delete_stack()
            .withf(|name: &str, retain: &Vec<String>| name == "app" && retain.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let report = clean(&mock, "us-east-1", &live()).await;
        assert_eq!(report.skipped, 2);
        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn failed_stack_retains_failed_resources() {
        let mut mock = MockCloudFormationApi::new();
        mock.expect_list_stacks()
            .returning(|| Ok(vec![stack("broken", "DELETE_FAILED", None)]));
        mock.expect_list_failed_resources()
            .returning(|_| Ok(vec!["Bucket".into(), "Queue".into()]));
        mock.expect_delete_stack()
            .withf(|_, retain: &Vec<String>| retain == &vec!["Bucket".to_string(), "Queue".into()])
            .times(1)
            .returning(|_, _| Ok(()));

        let report = clean(&mock, "us-east-1", &live()).await;
        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn failed_resource_lookup_falls_back_to_plain_delete() {
        let mut mock = MockCloudFormationApi::new();
        mock.expect_list_stacks()
            .returning(|| Ok(vec![stack("broken", "ROLLBACK_FAILED", None)]));
        mock.expect_list_failed_resources()
            .returning(|_| Err(classify_aws_error(Some("ValidationError"), Some("nope"))));
        mock.expect_delete_stack()
            .withf(|_, retain: &Vec<String>| retain.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let report = clean(&mock, "us-east-1", &live()).await;
        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn dry_run_deletes_nothing() {
        let mut mock = MockCloudFormationApi::new();
        mock.expect_list_stacks()
            .returning(|| Ok(vec![stack("app", "UPDATE_COMPLETE", None)]));

        let report = clean(&mock, "us-east-1", &CleanupOptions::default()).await;
        assert_eq!(report.dry_run, 1);
    }
}
