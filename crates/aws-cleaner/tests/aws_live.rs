//! Live AWS tests
//!
//! Every test here runs in dry-run mode and never issues a mutating call.
//!
//! Run with:
//! ```
//! AWS_PROFILE=your_profile cargo test -p aws-cleaner --test aws_live -- --ignored
//! ```

use aws_cleaner::cleaner::{CleanupOptions, SettleDelays};
use aws_cleaner::config::RunConfig;
use aws_cleaner::orchestrator::{self, AwsBackend, CleanupBackend};
use aws_cleaner::profiles::list_profiles;
use aws_cleaner_common::ResourceKind;
use aws_cleaner_test_utils::{get_test_profile, get_test_region};

fn dry_run_config(resources: &[ResourceKind]) -> RunConfig {
    let mut config = RunConfig::default();
    config.aws.profile = get_test_profile();
    config.aws.regions = vec![get_test_region()];
    config.resources = resources.to_vec();
    config.cleanup = CleanupOptions {
        dry_run: true,
        settle: SettleDelays::none(),
    };
    config
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn session_validates_and_lists_regions() {
    let backend = AwsBackend::connect(get_test_profile().as_deref()).await;

    let account = backend.account_id().await.expect("credentials should be valid");
    assert_eq!(account.len(), 12, "account id should be 12 digits: {account}");

    let regions = backend.list_regions().await.expect("region listing failed");
    assert!(
        regions.contains(&get_test_region()),
        "test region missing from {regions:?}"
    );
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn dry_run_over_every_kind_deletes_nothing() {
    let config = dry_run_config(&ResourceKind::ALL);
    let backend = AwsBackend::connect(config.profile()).await;

    let summary = orchestrator::run(&backend, &config, None).await;

    assert!(summary.aborted.is_none(), "run aborted: {:?}", summary.aborted);
    assert_eq!(summary.regions, vec![get_test_region()]);
    let totals = summary.totals();
    assert_eq!(totals.deleted, 0);
    // Each regional kind plus IAM reported once
    assert_eq!(summary.reports.len(), ResourceKind::ALL.len());
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn region_filter_limits_the_walk() {
    let config = dry_run_config(&[ResourceKind::Lambda]);
    let backend = AwsBackend::connect(config.profile()).await;

    let summary = orchestrator::run(&backend, &config, None).await;

    assert!(summary.reports.iter().all(|r| r.kind == ResourceKind::Lambda));
    assert!(
        summary
            .reports
            .iter()
            .all(|r| r.region.as_deref() == Some(get_test_region().as_str()))
    );
}

#[test]
#[ignore = "requires AWS credentials"]
fn shared_files_list_at_least_one_profile() {
    let profiles = list_profiles().expect("profile files should be readable");
    assert!(!profiles.is_empty());
    if let Some(profile) = get_test_profile() {
        assert!(profiles.contains(&profile), "{profile} missing from {profiles:?}");
    }
}
