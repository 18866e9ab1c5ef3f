//! Lambda cleanup: functions (after their event source mappings), then layers

use super::{Action, CleanupOptions, CleanupReport, attempt, completed, listed};
use crate::aws::LambdaApi;
use aws_cleaner_common::ResourceKind;
use tracing::{error, info};

pub async fn clean<A: LambdaApi>(api: &A, region: &str, opts: &CleanupOptions) -> CleanupReport {
    let mut report = CleanupReport::default();

    info!("Checking for Lambda functions in {}...", region);
    for function in listed(
        &mut report,
        "Lambda functions",
        region,
        api.list_functions().await,
    ) {
        info!(
            function = %function.name,
            runtime = %function.runtime.as_deref().unwrap_or("N/A"),
            "Found Lambda function"
        );

        let scope = format!("function {}", function.name);
        for mapping in listed(
            &mut report,
            "event source mappings",
            &scope,
            api.list_event_source_mappings(&function.name).await,
        ) {
            attempt(
                &mut report,
                opts,
                Action::Delete,
                &format!(
                    "event source mapping {} for function {}",
                    mapping.uuid, function.name
                ),
                || api.delete_event_source_mapping(&mapping.uuid),
            )
            .await;
        }

        attempt(
            &mut report,
            opts,
            Action::Delete,
            &format!("Lambda function {}", function.name),
            || api.delete_function(&function.name),
        )
        .await;
    }

    info!("Checking for Lambda layers in {}...", region);
    for layer in listed(&mut report, "Lambda layers", region, api.list_layers().await) {
        info!(layer = %layer.name, "Found Lambda layer");
        let scope = format!("layer {}", layer.name);
        let versions = match api.list_layer_versions(&layer.name).await {
            Ok(versions) => {
                report.found += versions.len();
                versions
            }
            Err(e) => {
                error!("Error listing versions of {}: {}", scope, e);
                report.failed += 1;
                continue;
            }
        };
        for version in versions {
            attempt(
                &mut report,
                opts,
                Action::Delete,
                &format!("Lambda layer version {}:{}", layer.name, version),
                || api.delete_layer_version(&layer.name, version),
            )
            .await;
        }
    }

    completed(ResourceKind::Lambda, Some(region));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::lambda::{EventSourceMapping, Function, Layer, MockLambdaApi};
    use crate::cleaner::SettleDelays;
    use mockall::Sequence;

    fn live() -> CleanupOptions {
        CleanupOptions {
            dry_run: false,
            settle: SettleDelays::none(),
        }
    }

    fn one_of_each() -> MockLambdaApi {
        let mut mock = MockLambdaApi::new();
        mock.expect_list_functions().returning(|| {
            Ok(vec![Function {
                name: "ingest".into(),
                runtime: Some("python3.12".into()),
            }])
        });
        mock.expect_list_event_source_mappings()
            .withf(|name: &str| name == "ingest")
            .returning(|_| {
                Ok(vec![EventSourceMapping {
                    uuid: "esm-1".into(),
                    source_arn: None,
                }])
            });
        mock.expect_list_layers().returning(|| {
            Ok(vec![Layer {
                name: "deps".into(),
            }])
        });
        mock.expect_list_layer_versions().returning(|_| Ok(vec![3, 2, 1]));
        mock
    }

    #[tokio::test]
    async fn mappings_go_before_their_function() {
        let mut mock = one_of_each();
        let mut seq = Sequence::new();
        mock.expect_delete_event_source_mapping()
            .withf(|uuid: &str| uuid == "esm-1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_delete_function()
            .withf(|name: &str| name == "ingest")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_delete_layer_version()
            .withf(|name: &str, _| name == "deps")
            .times(3)
            .returning(|_, _| Ok(()));

        let report = clean(&mock, "us-east-1", &live()).await;
        // mapping, function, three layer versions
        assert_eq!(report.deleted, 5);
    }

    #[tokio::test]
    async fn dry_run_deletes_nothing() {
        let mock = one_of_each();
        let report = clean(&mock, "us-east-1", &CleanupOptions::default()).await;
        assert_eq!(report.dry_run, 5);
        assert_eq!(report.deleted, 0);
    }
}
