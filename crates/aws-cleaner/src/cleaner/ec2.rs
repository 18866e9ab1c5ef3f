//! EC2 compute cleanup
//!
//! Order: instances, security groups, Elastic IPs, volumes, snapshots, then
//! AMIs together with their backing snapshots. Snapshots that still back an
//! AMI are rejected as in use in the snapshot step and removed again after
//! their image is deregistered.

use super::{Action, CleanupOptions, CleanupReport, attempt, completed, listed, skip};
use crate::aws::{AccountId, Ec2Api};
use aws_cleaner_common::ResourceKind;
use tracing::{info, warn};

pub async fn clean<A: Ec2Api>(
    api: &A,
    region: &str,
    account: &AccountId,
    opts: &CleanupOptions,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    info!("Checking for EC2 instances in {}...", region);
    for instance in listed(&mut report, "EC2 instances", region, api.list_instances().await) {
        let name = instance.name.as_deref().unwrap_or("N/A");
        if instance.is_terminating() {
            skip(
                &mut report,
                &format!("EC2 instance {}", instance.id),
                &instance.state,
            );
            continue;
        }
        info!(instance_id = %instance.id, name = %name, state = %instance.state, "Found EC2 instance");
        attempt(
            &mut report,
            opts,
            Action::Terminate,
            &format!("EC2 instance {} ({})", instance.id, name),
            || api.terminate_instance(&instance.id),
        )
        .await;
    }

    info!("Checking for security groups in {}...", region);
    for group in listed(
        &mut report,
        "security groups",
        region,
        api.list_security_groups().await,
    ) {
        if group.is_default() {
            skip(
                &mut report,
                &format!("security group {}", group.id),
                "the default group",
            );
            continue;
        }
        info!(group_id = %group.id, name = %group.name, "Found security group");
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("security group {} ({})", group.id, group.name),
            || api.delete_security_group(&group.id),
        )
        .await;
    }

    info!("Checking for Elastic IPs in {}...", region);
    for address in listed(&mut report, "Elastic IPs", region, api.list_addresses().await) {
        let public_ip = address.public_ip.as_deref().unwrap_or("N/A");
        let Some(allocation_id) = address.allocation_id.as_deref() else {
            skip(
                &mut report,
                &format!("Elastic IP {}", public_ip),
                "an EC2-Classic address without an allocation id",
            );
            continue;
        };
        info!(allocation_id = %allocation_id, public_ip = %public_ip, "Found Elastic IP");
        attempt(
            &mut report,
            opts,
            Action::Release,
            &format!("Elastic IP {} ({})", allocation_id, public_ip),
            || api.release_address(allocation_id),
        )
        .await;
    }

    info!("Checking for EBS volumes in {}...", region);
    for volume in listed(&mut report, "EBS volumes", region, api.list_volumes().await) {
        if volume.is_attached() {
            warn!("Volume {} is in-use, skipping", volume.id);
            report.skipped += 1;
            continue;
        }
        if volume.is_deleting() {
            skip(&mut report, &format!("volume {}", volume.id), &volume.state);
            continue;
        }
        info!(volume_id = %volume.id, state = %volume.state, "Found EBS volume");
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("volume {}", volume.id),
            || api.delete_volume(&volume.id),
        )
        .await;
    }

    info!("Checking for EBS snapshots in {}...", region);
    for snapshot in listed(
        &mut report,
        "EBS snapshots",
        region,
        api.list_snapshots(account).await,
    ) {
        info!(
            snapshot_id = %snapshot.id,
            description = %snapshot.description.as_deref().unwrap_or("N/A"),
            "Found EBS snapshot"
        );
        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("snapshot {}", snapshot.id),
            || api.delete_snapshot(&snapshot.id),
        )
        .await;
    }

    info!("Checking for AMIs in {}...", region);
    for image in listed(&mut report, "AMIs", region, api.list_images(account).await) {
        info!(
            image_id = %image.id,
            name = %image.name.as_deref().unwrap_or("N/A"),
            snapshots = image.snapshot_ids.len(),
            "Found AMI"
        );
        let deregistered = attempt(
            &mut report,
            opts,
            Action::Deregister,
            &format!("AMI {}", image.id),
            || api.deregister_image(&image.id),
        )
        .await;

        if !deregistered.proceeded() {
            continue;
        }
        for snapshot_id in &image.snapshot_ids {
            attempt(
                &mut report,
                opts,
                Action::Delete,
                &format!("snapshot {} of AMI {}", snapshot_id, image.id),
                || api.delete_snapshot(snapshot_id),
            )
            .await;
        }
    }

    completed(ResourceKind::Ec2, Some(region));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;
    use crate::aws::ec2::MockEc2Api;
    use crate::aws::ec2::types::{ElasticIp, Image, Instance, SecurityGroup, Snapshot, Volume};
    use crate::cleaner::SettleDelays;

    const ACCOUNT: &str = "123456789012";

    fn live() -> CleanupOptions {
        CleanupOptions {
            dry_run: false,
            settle: SettleDelays::none(),
        }
    }

    fn instance(id: &str, state: &str) -> Instance {
        Instance {
            id: id.into(),
            name: None,
            state: state.into(),
        }
    }

    fn group(id: &str, name: &str) -> SecurityGroup {
        SecurityGroup {
            id: id.into(),
            name: name.into(),
            vpc_id: None,
        }
    }

    fn volume(id: &str, state: &str) -> Volume {
        Volume {
            id: id.into(),
            name: None,
            state: state.into(),
        }
    }

    #[derive(Default)]
    struct Listing {
        instances: Vec<Instance>,
        groups: Vec<SecurityGroup>,
        addresses: Vec<ElasticIp>,
        volumes: Vec<Volume>,
        snapshots: Vec<Snapshot>,
        images: Vec<Image>,
    }

    /// Mock whose listings each return the given resources once
    fn mock_listing(listing: Listing) -> MockEc2Api {
        let Listing {
            instances,
            groups,
            addresses,
            volumes,
            snapshots,
            images,
        } = listing;

        let mut mock = MockEc2Api::new();
        mock.expect_list_instances()
            .return_once(move || Ok(instances));
        mock.expect_list_security_groups()
            .return_once(move || Ok(groups));
        mock.expect_list_addresses()
            .return_once(move || Ok(addresses));
        mock.expect_list_volumes().return_once(move || Ok(volumes));
        mock.expect_list_snapshots()
            .withf(|owner: &str| owner == ACCOUNT)
            .return_once(move |_| Ok(snapshots));
        mock.expect_list_images()
            .withf(|owner: &str| owner == ACCOUNT)
            .return_once(move |_| Ok(images));
        mock
    }

    async fn run(mock: &MockEc2Api, opts: &CleanupOptions) -> CleanupReport {
        clean(mock, "us-east-1", &AccountId::new(ACCOUNT), opts).await
    }

    #[tokio::test]
    async fn terminating_instances_are_skipped() {
        let mut mock = mock_listing(Listing {
            instances: vec![
                instance("i-running", "running"),
                instance("i-gone", "terminated"),
                instance("i-going", "shutting-down"),
            ],
            ..Default::default()
        });
        mock.expect_terminate_instance()
            .withf(|id: &str| id == "i-running")
            .times(1)
            .returning(|_| Ok(()));

        let report = run(&mock, &live()).await;

        assert_eq!(report.found, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn dry_run_issues_no_mutating_calls() {
        // No delete/terminate/release/deregister expectations: any such call panics
        let mock = mock_listing(Listing {
            instances: vec![instance("i-1", "running")],
            groups: vec![group("sg-1", "web")],
            addresses: vec![ElasticIp {
                allocation_id: Some("eipalloc-1".into()),
                public_ip: None,
            }],
            volumes: vec![volume("vol-1", "available")],
            snapshots: vec![Snapshot {
                id: "snap-1".into(),
                description: None,
            }],
            images: vec![Image {
                id: "ami-1".into(),
                name: None,
                snapshot_ids: vec!["snap-2".into()],
            }],
        });

        let report = run(&mock, &CleanupOptions::default()).await;

        assert_eq!(report.deleted, 0);
        // instance, group, address, volume, snapshot, AMI and its snapshot
        assert_eq!(report.dry_run, 7);
    }

    #[tokio::test]
    async fn default_group_classic_address_and_attached_volume_are_left_alone() {
        let mock = mock_listing(Listing {
            groups: vec![group("sg-default", "default")],
            addresses: vec![ElasticIp {
                allocation_id: None,
                public_ip: Some("203.0.113.7".into()),
            }],
            volumes: vec![volume("vol-1", "in-use")],
            ..Default::default()
        });

        let report = run(&mock, &live()).await;
        assert_eq!(report.skipped, 3);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn in_use_security_group_is_an_expected_failure() {
        let mut mock = mock_listing(Listing {
            groups: vec![group("sg-1", "app")],
            ..Default::default()
        });
        mock.expect_delete_security_group().returning(|_| {
            Err(classify_aws_error(
                Some("DependencyViolation"),
                Some("resource sg-1 has a dependent object"),
            ))
        });

        let report = run(&mock, &live()).await;
        assert_eq!(report.expected_failures, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn image_snapshots_follow_successful_deregistration_only() {
        let mut mock = mock_listing(Listing {
            images: vec![
                Image {
                    id: "ami-ok".into(),
                    name: None,
                    snapshot_ids: vec!["snap-a".into(), "snap-b".into()],
                },
                Image {
                    id: "ami-denied".into(),
                    name: None,
                    snapshot_ids: vec!["snap-c".into()],
                },
            ],
            ..Default::default()
        });
        mock.expect_deregister_image()
            .withf(|id: &str| id == "ami-ok")
            .returning(|_| Ok(()));
        mock.expect_deregister_image()
            .withf(|id: &str| id == "ami-denied")
            .returning(|_| Err(classify_aws_error(Some("AccessDenied"), None)));
        mock.expect_delete_snapshot()
            .withf(|id: &str| id == "snap-a" || id == "snap-b")
            .times(2)
            .returning(|_| Ok(()));

        let report = run(&mock, &live()).await;
        assert_eq!(report.deleted, 3);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn listing_failure_does_not_stop_later_steps() {
        let mut mock = MockEc2Api::new();
        mock.expect_list_instances()
            .returning(|| Err(classify_aws_error(Some("UnauthorizedOperation"), None)));
        mock.expect_list_security_groups().returning(|| Ok(vec![]));
        mock.expect_list_addresses().returning(|| Ok(vec![]));
        mock.expect_list_volumes()
            .returning(|| Ok(vec![volume("vol-1", "available")]));
        mock.expect_delete_volume().times(1).returning(|_| Ok(()));
        mock.expect_list_snapshots().returning(|_| Ok(vec![]));
        mock.expect_list_images().returning(|_| Ok(vec![]));

        let report = run(&mock, &live()).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.deleted, 1);
    }
}
