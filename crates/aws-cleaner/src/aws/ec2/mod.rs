//! EC2 and VPC adapters
//!
//! One SDK client serves both the compute cleaner and the VPC cleaner, so
//! the inherent methods are split by concern (`compute`, `network`) while
//! the mockable surfaces live in `operations`.

mod compute;
mod network;
mod operations;
pub mod types;

pub use operations::{Ec2Api, VpcApi};

#[cfg(test)]
pub use operations::{MockEc2Api, MockVpcApi};

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::AwsError;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::Filter;
use tracing::debug;

/// EC2 client for one region
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}

impl Ec2Client {
    /// Regions enabled for this account, sorted by name.
    ///
    /// Opt-in regions that were never enabled are left out by the provider.
    pub async fn describe_regions(&self) -> Result<Vec<String>, AwsError> {
        let response = self.client.describe_regions().send().await?;

        let mut regions: Vec<String> = response
            .regions()
            .iter()
            .filter_map(|r| r.region_name())
            .map(str::to_string)
            .collect();
        regions.sort();

        debug!(count = regions.len(), "Enumerated regions");
        Ok(regions)
    }
}

/// `vpc-id` filter for describe calls scoped to one VPC
pub(crate) fn vpc_filter(vpc_id: &str) -> Filter {
    Filter::builder().name("vpc-id").values(vpc_id).build()
}
