//! AWS account identity

use crate::aws::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
///
/// Snapshots and AMIs are only cleaned when owned by this account, so the
/// owner filter always goes through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId for testing purposes
    #[cfg(test)]
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }
}

/// Fetch the current AWS account ID via STS GetCallerIdentity.
///
/// This call needs no permissions and succeeds whenever the credentials are
/// valid, which makes it the session check at the start of a run.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let identity = ctx
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId(account.to_string()))
}
