//! S3 bucket adapter
//!
//! Buckets are listed globally but emptied and deleted through a client for
//! the bucket's own region, so the cleaner only touches buckets whose
//! location matches the region it was called for.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, classify_aws_error};
use aws_cleaner_common::defaults::S3_DELETE_BATCH_SIZE;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{BucketVersioningStatus, Delete, ObjectIdentifier};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
}

/// Normalize a `GetBucketLocation` constraint to a region name.
///
/// Buckets in `us-east-1` report no constraint at all, and the oldest
/// European buckets still report the legacy `EU` alias.
pub fn normalize_bucket_region(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => "us-east-1".to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// S3 operations used by the S3 cleaner.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait S3Api: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, AwsError>;

    /// Region the bucket lives in
    async fn bucket_region(&self, bucket: &str) -> Result<String, AwsError>;

    /// `Enabled` or `Suspended` versioning
    async fn is_versioned(&self, bucket: &str) -> Result<bool, AwsError>;

    async fn has_object_lock(&self, bucket: &str) -> Result<bool, AwsError>;

    /// Delete every object (or every version and delete marker), returning the count
    async fn delete_all_objects(&self, bucket: &str, versioned: bool) -> Result<usize, AwsError>;

    async fn delete_lifecycle(&self, bucket: &str) -> Result<(), AwsError>;
    async fn delete_policy(&self, bucket: &str) -> Result<(), AwsError>;
    async fn delete_bucket(&self, bucket: &str) -> Result<(), AwsError>;
}

/// S3 client for one region
pub struct S3Client {
    client: Client,
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }
}

impl S3Client {
    async fn versioned_identifiers(&self, bucket: &str) -> Result<Vec<ObjectIdentifier>, AwsError> {
        let mut identifiers = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_marker: Option<String> = None;

        loop {
            let response = self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_marker.take())
                .send()
                .await?;

            for version in response.versions() {
                if let Some(key) = version.key() {
                    identifiers.push(
                        ObjectIdentifier::builder()
                            .key(key)
                            .set_version_id(version.version_id().map(str::to_string))
                            .build()?,
                    );
                }
            }
            for marker in response.delete_markers() {
                if let Some(key) = marker.key() {
                    identifiers.push(
                        ObjectIdentifier::builder()
                            .key(key)
                            .set_version_id(marker.version_id().map(str::to_string))
                            .build()?,
                    );
                }
            }

            if response.is_truncated() == Some(true) {
                key_marker = response.next_key_marker().map(str::to_string);
                version_marker = response.next_version_id_marker().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(identifiers)
    }

    async fn object_identifiers(&self, bucket: &str) -> Result<Vec<ObjectIdentifier>, AwsError> {
        let pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        pages
            .iter()
            .flat_map(|p| p.contents())
            .filter_map(|o| o.key())
            .map(|key| ObjectIdentifier::builder().key(key).build().map_err(AwsError::from))
            .collect()
    }
}

impl S3Api for S3Client {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, AwsError> {
        let response = self.client.list_buckets().send().await?;
        Ok(response
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .map(|name| Bucket {
                name: name.to_string(),
            })
            .collect())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String, AwsError> {
        let response = self.client.get_bucket_location().bucket(bucket).send().await?;
        Ok(normalize_bucket_region(
            response.location_constraint().map(|c| c.as_str()),
        ))
    }

    async fn is_versioned(&self, bucket: &str) -> Result<bool, AwsError> {
        let response = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await?;
        Ok(matches!(
            response.status(),
            Some(BucketVersioningStatus::Enabled | BucketVersioningStatus::Suspended)
        ))
    }

    async fn has_object_lock(&self, bucket: &str) -> Result<bool, AwsError> {
        match self
            .client
            .get_object_lock_configuration()
            .bucket(bucket)
            .send()
            .await
        {
            Ok(response) => Ok(response
                .object_lock_configuration()
                .and_then(|c| c.object_lock_enabled())
                .is_some()),
            Err(e) => {
                let err = AwsError::from(e);
                if err.is_not_found() { Ok(false) } else { Err(err) }
            }
        }
    }

    async fn delete_all_objects(&self, bucket: &str, versioned: bool) -> Result<usize, AwsError> {
        let identifiers = if versioned {
            self.versioned_identifiers(bucket).await?
        } else {
            self.object_identifiers(bucket).await?
        };

        let mut deleted = 0;
        for batch in identifiers.chunks(S3_DELETE_BATCH_SIZE) {
            let delete = Delete::builder()
                .set_objects(Some(batch.to_vec()))
                .quiet(true)
                .build()?;
            let response = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await?;

            if let Some(first) = response.errors().first() {
                debug!(
                    bucket = %bucket,
                    failed = response.errors().len(),
                    "Batch delete reported per-object errors"
                );
                return Err(classify_aws_error(first.code(), first.message()));
            }
            deleted += batch.len();
        }

        Ok(deleted)
    }

    async fn delete_lifecycle(&self, bucket: &str) -> Result<(), AwsError> {
        self.client
            .delete_bucket_lifecycle()
            .bucket(bucket)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_policy(&self, bucket: &str) -> Result<(), AwsError> {
        self.client
            .delete_bucket_policy()
            .bucket(bucket)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), AwsError> {
        self.client.delete_bucket().bucket(bucket).send().await?;
        Ok(())
    }
}
