//! CloudFormation stack adapter

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::AwsError;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::types::{ResourceStatus, StackStatus};

/// Stack statuses from which a plain delete may leave resources behind
const FAILED_STATUSES: &[&str] = &[
    "CREATE_FAILED",
    "ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_FAILED",
    "DELETE_FAILED",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub name: String,
    pub id: String,
    pub status: String,
    /// Set for nested stacks; points at the top-level stack
    pub root_id: Option<String>,
}

impl Stack {
    pub fn is_deleting(&self) -> bool {
        self.status == "DELETE_IN_PROGRESS"
    }

    /// Nested stacks go away with their root and are never deleted directly
    pub fn is_nested(&self) -> bool {
        self.root_id.as_deref().is_some_and(|root| root != self.id)
    }

    pub fn is_failed(&self) -> bool {
        FAILED_STATUSES.contains(&self.status.as_str())
    }
}

/// CloudFormation operations used by the stack cleaner.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait CloudFormationApi: Send + Sync {
    /// Every stack that is not `DELETE_COMPLETE`
    async fn list_stacks(&self) -> Result<Vec<Stack>, AwsError>;

    /// Logical ids of resources stuck in `CREATE_FAILED` or `DELETE_FAILED`
    async fn list_failed_resources(&self, stack_name: &str) -> Result<Vec<String>, AwsError>;

    async fn delete_stack(&self, stack_name: &str, retain: Vec<String>) -> Result<(), AwsError>;
}

/// CloudFormation client for one region
pub struct CloudFormationClient {
    client: Client,
}

impl FromAwsContext for CloudFormationClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }
}

fn live_statuses() -> Vec<StackStatus> {
    StackStatus::values()
        .iter()
        .filter(|s| **s != "DELETE_COMPLETE")
        .map(|s| StackStatus::from(*s))
        .collect()
}

impl CloudFormationApi for CloudFormationClient {
    async fn list_stacks(&self) -> Result<Vec<Stack>, AwsError> {
        let pages = self
            .client
            .list_stacks()
            .set_stack_status_filter(Some(live_statuses()))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.stack_summaries())
            .filter_map(|s| {
                Some(Stack {
                    name: s.stack_name()?.to_string(),
                    id: s.stack_id().unwrap_or_default().to_string(),
                    status: s
                        .stack_status()
                        .map(|st| st.as_str().to_string())
                        .unwrap_or_default(),
                    root_id: s.root_id().map(str::to_string),
                })
            })
            .collect())
    }

    async fn list_failed_resources(&self, stack_name: &str) -> Result<Vec<String>, AwsError> {
        let response = self
            .client
            .describe_stack_resources()
            .stack_name(stack_name)
            .send()
            .await?;

        Ok(response
            .stack_resources()
            .iter()
            .filter(|r| {
                matches!(
                    r.resource_status(),
                    Some(ResourceStatus::CreateFailed | ResourceStatus::DeleteFailed)
                )
            })
            .filter_map(|r| r.logical_resource_id())
            .map(str::to_string)
            .collect())
    }

    async fn delete_stack(&self, stack_name: &str, retain: Vec<String>) -> Result<(), AwsError> {
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .set_retain_resources((!retain.is_empty()).then_some(retain))
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(status: &str, root_id: Option<&str>) -> Stack {
        Stack {
            name: "app".into(),
            id: "arn:stack/app".into(),
            status: status.into(),
            root_id: root_id.map(str::to_string),
        }
    }

    #[test]
    fn nested_only_when_root_differs() {
        assert!(!stack("CREATE_COMPLETE", None).is_nested());
        assert!(!stack("CREATE_COMPLETE", Some("arn:stack/app")).is_nested());
        assert!(stack("CREATE_COMPLETE", Some("arn:stack/root")).is_nested());
    }

    #[test]
    fn failed_statuses() {
        assert!(stack("ROLLBACK_FAILED", None).is_failed());
        assert!(stack("DELETE_FAILED", None).is_failed());
        assert!(!stack("ROLLBACK_COMPLETE", None).is_failed());
        assert!(stack("DELETE_IN_PROGRESS", None).is_deleting());
    }

    #[test]
    fn live_statuses_exclude_delete_complete() {
        let statuses = live_statuses();
        assert!(!statuses.contains(&StackStatus::DeleteComplete));
        assert!(statuses.contains(&StackStatus::DeleteFailed));
    }
}
