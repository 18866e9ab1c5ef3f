//! Shared AWS configuration context
//!
//! The session (credentials, retry config, HTTP client) is loaded once per
//! run. Per-region contexts are derived from it by swapping the region, so
//! walking every region never re-resolves the credential chain.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Loaded AWS configuration plus the region it targets.
///
/// # Example
/// ```ignore
/// let session = AwsContext::with_profile("us-east-1", Some("sandbox")).await;
///
/// for region in ["eu-west-1", "ap-south-1"] {
///     let ctx = session.for_region(region);
///     let ec2 = Ec2Client::from_context(&ctx);
///     // ...
/// }
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    profile: Option<String>,
}

impl AwsContext {
    /// Load AWS configuration for `region` using the default credential chain.
    pub async fn new(region: &str) -> Self {
        Self::with_profile(region, None).await
    }

    /// Load AWS configuration for `region`, optionally pinned to a named
    /// profile from the shared credentials/config files.
    pub async fn with_profile(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
            profile: profile.map(str::to_string),
        }
    }

    /// Derive a context for another region from the same session.
    pub fn for_region(&self, region: &str) -> Self {
        let config = self
            .config
            .to_builder()
            .region(Region::new(region.to_string()))
            .build();

        Self {
            config: Arc::new(config),
            region: region.to_string(),
            profile: self.profile.clone(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Profile name this session was loaded with, if any.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn ec2_client(&self) -> aws_sdk_ec2::Client {
        aws_sdk_ec2::Client::new(self.sdk_config())
    }

    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(self.sdk_config())
    }

    pub fn lambda_client(&self) -> aws_sdk_lambda::Client {
        aws_sdk_lambda::Client::new(self.sdk_config())
    }

    pub fn cloudformation_client(&self) -> aws_sdk_cloudformation::Client {
        aws_sdk_cloudformation::Client::new(self.sdk_config())
    }

    pub fn rds_client(&self) -> aws_sdk_rds::Client {
        aws_sdk_rds::Client::new(self.sdk_config())
    }

    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }

    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Trait for service clients constructed from an [`AwsContext`].
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_context_creation() {
        let ctx = AwsContext::new("us-east-2").await;
        assert_eq!(ctx.region(), "us-east-2");
        assert!(ctx.profile().is_none());
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_for_region_keeps_profile() {
        let session = AwsContext::with_profile("us-east-1", Some("default")).await;
        let derived = session.for_region("eu-west-1");

        assert_eq!(derived.region(), "eu-west-1");
        assert_eq!(derived.profile(), Some("default"));
        assert_eq!(
            derived.sdk_config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }
}
