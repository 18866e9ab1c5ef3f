//! S3 bucket cleanup

use super::{Action, CleanupOptions, CleanupReport, attempt, completed};
use crate::aws::{S3Api, ignore_not_found};
use aws_cleaner_common::ResourceKind;
use tracing::{error, info, warn};

/// Empty and delete every bucket located in `region`.
pub async fn clean<A: S3Api>(api: &A, region: &str, opts: &CleanupOptions) -> CleanupReport {
    let mut report = CleanupReport::default();

    info!("Checking for S3 buckets in {}...", region);
    let buckets = match api.list_buckets().await {
        Ok(buckets) => buckets,
        Err(e) => {
            error!("Error listing S3 buckets in {}: {}", region, e);
            report.failed += 1;
            completed(ResourceKind::S3, Some(region));
            return report;
        }
    };

    let mut in_region = Vec::new();
    for bucket in buckets {
        match api.bucket_region(&bucket.name).await {
            Ok(location) if location == region => {
                info!(bucket = %bucket.name, "Found S3 bucket in {}", region);
                in_region.push(bucket);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Error getting location for bucket {}: {}", bucket.name, e);
                report.failed += 1;
            }
        }
    }
    if in_region.is_empty() {
        info!("No S3 buckets found in {}", region);
    }
    report.found += in_region.len();

    for bucket in &in_region {
        let name = bucket.name.as_str();

        let versioned = match api.is_versioned(name).await {
            Ok(versioned) => versioned,
            Err(e) => {
                // Version listing also covers unversioned buckets
                error!("Error checking versioning for bucket {}: {}", name, e);
                true
            }
        };
        info!(bucket = %name, versioned, "Processing bucket");

        match api.has_object_lock(name).await {
            Ok(true) => warn!(
                "Bucket {} has Object Lock enabled. Some objects may not be deletable.",
                name
            ),
            Ok(false) => {}
            Err(e) => error!("Error checking object lock for bucket {}: {}", name, e),
        }

        let contents = if versioned {
            format!("all objects and versions from bucket {}", name)
        } else {
            format!("all objects from bucket {}", name)
        };
        let emptied = attempt(&mut report, opts, Action::Empty, &contents, || async move {
            let count = api.delete_all_objects(name, versioned).await?;
            info!(bucket = %name, objects = count, "Bucket emptied");
            Ok(())
        })
        .await;
        if !emptied.proceeded() {
            continue;
        }

        attempt(
            &mut report,
            opts,
            Action::Remove,
            &format!("lifecycle configuration from bucket {}", name),
            || async move { ignore_not_found(api.delete_lifecycle(name).await) },
        )
        .await;
        attempt(
            &mut report,
            opts,
            Action::Remove,
            &format!("bucket policy from bucket {}", name),
            || async move { ignore_not_found(api.delete_policy(name).await) },
        )
        .await;

        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("bucket {}", name),
            || api.delete_bucket(name),
        )
        .await;
    }

    completed(ResourceKind::S3, Some(region));
    report
}
