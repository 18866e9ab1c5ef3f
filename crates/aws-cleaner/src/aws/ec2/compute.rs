//! Instances, security groups, addresses, volumes, snapshots and images

use super::types::{ElasticIp, Image, Instance, SecurityGroup, Snapshot, Volume};
use super::{Ec2Client, vpc_filter};
use crate::aws::error::AwsError;
use tracing::debug;

impl Ec2Client {
    pub async fn list_instances(&self) -> Result<Vec<Instance>, AwsError> {
        let pages = self
            .client
            .describe_instances()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.reservations())
            .flat_map(|r| r.instances())
            .map(Instance::from)
            .collect())
    }

    pub async fn terminate_instance(&self, instance_id: &str) -> Result<(), AwsError> {
        self.client
            .terminate_instances()
            .instance_ids(instance_id)
            .send()
            .await?;
        debug!(instance_id = %instance_id, "Termination requested");
        Ok(())
    }

    /// Security groups in the region, or in one VPC when `vpc_id` is given.
    pub async fn list_security_groups(
        &self,
        vpc_id: Option<&str>,
    ) -> Result<Vec<SecurityGroup>, AwsError> {
        let pages = self
            .client
            .describe_security_groups()
            .set_filters(vpc_id.map(|id| vec![vpc_filter(id)]))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.security_groups())
            .map(SecurityGroup::from)
            .collect())
    }

    pub async fn delete_security_group(&self, group_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_security_group()
            .group_id(group_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_addresses(&self) -> Result<Vec<ElasticIp>, AwsError> {
        let response = self.client.describe_addresses().send().await?;
        Ok(response.addresses().iter().map(ElasticIp::from).collect())
    }

    pub async fn release_address(&self, allocation_id: &str) -> Result<(), AwsError> {
        self.client
            .release_address()
            .allocation_id(allocation_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_volumes(&self) -> Result<Vec<Volume>, AwsError> {
        let pages = self
            .client
            .describe_volumes()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.volumes())
            .map(Volume::from)
            .collect())
    }

    pub async fn delete_volume(&self, volume_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_volume()
            .volume_id(volume_id)
            .send()
            .await?;
        Ok(())
    }

    /// Snapshots owned by `owner_id`; public and shared snapshots are never listed.
    pub async fn list_snapshots(&self, owner_id: &str) -> Result<Vec<Snapshot>, AwsError> {
        let pages = self
            .client
            .describe_snapshots()
            .owner_ids(owner_id)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.snapshots())
            .map(Snapshot::from)
            .collect())
    }

    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_snapshot()
            .snapshot_id(snapshot_id)
            .send()
            .await?;
        Ok(())
    }

    /// Images owned by `owner_id`, with their backing snapshot ids.
    pub async fn list_images(&self, owner_id: &str) -> Result<Vec<Image>, AwsError> {
        let response = self.client.describe_images().owners(owner_id).send().await?;
        Ok(response.images().iter().map(Image::from).collect())
    }

    pub async fn deregister_image(&self, image_id: &str) -> Result<(), AwsError> {
        self.client
            .deregister_image()
            .image_id(image_id)
            .send()
            .await?;
        Ok(())
    }
}
