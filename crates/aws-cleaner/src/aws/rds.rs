//! RDS adapter
//!
//! Instances and clusters can carry deletion protection, which has to be
//! switched off (and given time to apply) before the delete is accepted.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::AwsError;
use aws_sdk_rds::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInstance {
    pub id: String,
    pub engine: Option<String>,
    pub status: String,
    /// Cluster members are deleted with their cluster
    pub cluster_id: Option<String>,
    pub deletion_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbCluster {
    pub id: String,
    pub engine: Option<String>,
    pub status: String,
    pub deletion_protection: bool,
}

/// Manual DB or cluster snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSnapshot {
    pub id: String,
    pub status: String,
}

/// Anything RDS reports as `deleting` is left alone
pub fn is_deleting(status: &str) -> bool {
    status == "deleting"
}

/// RDS operations used by the RDS cleaner.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait RdsApi: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<DbInstance>, AwsError>;
    async fn disable_instance_protection(&self, id: &str) -> Result<(), AwsError>;
    async fn delete_instance(&self, id: &str) -> Result<(), AwsError>;

    async fn list_clusters(&self) -> Result<Vec<DbCluster>, AwsError>;
    async fn disable_cluster_protection(&self, id: &str) -> Result<(), AwsError>;
    async fn delete_cluster(&self, id: &str) -> Result<(), AwsError>;

    async fn list_snapshots(&self) -> Result<Vec<DbSnapshot>, AwsError>;
    async fn delete_snapshot(&self, id: &str) -> Result<(), AwsError>;

    async fn list_cluster_snapshots(&self) -> Result<Vec<DbSnapshot>, AwsError>;
    async fn delete_cluster_snapshot(&self, id: &str) -> Result<(), AwsError>;

    async fn list_parameter_groups(&self) -> Result<Vec<String>, AwsError>;
    async fn delete_parameter_group(&self, name: &str) -> Result<(), AwsError>;

    async fn list_cluster_parameter_groups(&self) -> Result<Vec<String>, AwsError>;
    async fn delete_cluster_parameter_group(&self, name: &str) -> Result<(), AwsError>;

    async fn list_subnet_groups(&self) -> Result<Vec<String>, AwsError>;
    async fn delete_subnet_group(&self, name: &str) -> Result<(), AwsError>;

    async fn list_option_groups(&self) -> Result<Vec<String>, AwsError>;
    async fn delete_option_group(&self, name: &str) -> Result<(), AwsError>;

    async fn list_event_subscriptions(&self) -> Result<Vec<String>, AwsError>;
    async fn delete_event_subscription(&self, name: &str) -> Result<(), AwsError>;
}

/// RDS client for one region
pub struct RdsClient {
    client: Client,
}

impl FromAwsContext for RdsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.rds_client(),
        }
    }
}

impl RdsApi for RdsClient {
    async fn list_instances(&self) -> Result<Vec<DbInstance>, AwsError> {
        let pages = self
            .client
            .describe_db_instances()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_instances())
            .filter_map(|i| {
                Some(DbInstance {
                    id: i.db_instance_identifier()?.to_string(),
                    engine: i.engine().map(str::to_string),
                    status: i.db_instance_status().unwrap_or_default().to_string(),
                    cluster_id: i.db_cluster_identifier().map(str::to_string),
                    deletion_protection: i.deletion_protection().unwrap_or(false),
                })
            })
            .collect())
    }

    async fn disable_instance_protection(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .modify_db_instance()
            .db_instance_identifier(id)
            .deletion_protection(false)
            .apply_immediately(true)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_instance(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_instance()
            .db_instance_identifier(id)
            .skip_final_snapshot(true)
            .delete_automated_backups(true)
            .send()
            .await?;
        Ok(())
    }

    async fn list_clusters(&self) -> Result<Vec<DbCluster>, AwsError> {
        let pages = self
            .client
            .describe_db_clusters()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_clusters())
            .filter_map(|c| {
                Some(DbCluster {
                    id: c.db_cluster_identifier()?.to_string(),
                    engine: c.engine().map(str::to_string),
                    status: c.status().unwrap_or_default().to_string(),
                    deletion_protection: c.deletion_protection().unwrap_or(false),
                })
            })
            .collect())
    }

    async fn disable_cluster_protection(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .modify_db_cluster()
            .db_cluster_identifier(id)
            .deletion_protection(false)
            .apply_immediately(true)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_cluster(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_cluster()
            .db_cluster_identifier(id)
            .skip_final_snapshot(true)
            .send()
            .await?;
        Ok(())
    }

    async fn list_snapshots(&self) -> Result<Vec<DbSnapshot>, AwsError> {
        let pages = self
            .client
            .describe_db_snapshots()
            .snapshot_type("manual")
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_snapshots())
            .filter_map(|s| {
                Some(DbSnapshot {
                    id: s.db_snapshot_identifier()?.to_string(),
                    status: s.status().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_snapshot()
            .db_snapshot_identifier(id)
            .send()
            .await?;
        Ok(())
    }

    async fn list_cluster_snapshots(&self) -> Result<Vec<DbSnapshot>, AwsError> {
        let pages = self
            .client
            .describe_db_cluster_snapshots()
            .snapshot_type("manual")
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_cluster_snapshots())
            .filter_map(|s| {
                Some(DbSnapshot {
                    id: s.db_cluster_snapshot_identifier()?.to_string(),
                    status: s.status().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    async fn delete_cluster_snapshot(&self, id: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_cluster_snapshot()
            .db_cluster_snapshot_identifier(id)
            .send()
            .await?;
        Ok(())
    }

    async fn list_parameter_groups(&self) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .describe_db_parameter_groups()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_parameter_groups())
            .filter_map(|g| g.db_parameter_group_name())
            .map(str::to_string)
            .collect())
    }

    async fn delete_parameter_group(&self, name: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_parameter_group()
            .db_parameter_group_name(name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_cluster_parameter_groups(&self) -> Result<Vec<String>, AwsError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_db_cluster_parameter_groups()
                .set_marker(marker.take())
                .send()
                .await?;

            names.extend(
                response
                    .db_cluster_parameter_groups()
                    .iter()
                    .filter_map(|g| g.db_cluster_parameter_group_name())
                    .map(str::to_string),
            );

            match response.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn delete_cluster_parameter_group(&self, name: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_subnet_groups(&self) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .describe_db_subnet_groups()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.db_subnet_groups())
            .filter_map(|g| g.db_subnet_group_name())
            .map(str::to_string)
            .collect())
    }

    async fn delete_subnet_group(&self, name: &str) -> Result<(), AwsError> {
        self.client
            .delete_db_subnet_group()
            .db_subnet_group_name(name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_option_groups(&self) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .describe_option_groups()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.option_groups_list())
            .filter_map(|g| g.option_group_name())
            .map(str::to_string)
            .collect())
    }

    async fn delete_option_group(&self, name: &str) -> Result<(), AwsError> {
        self.client
            .delete_option_group()
            .option_group_name(name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_event_subscriptions(&self) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .describe_event_subscriptions()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.event_subscriptions_list())
            .filter_map(|s| s.cust_subscription_id())
            .map(str::to_string)
            .collect())
    }

    async fn delete_event_subscription(&self, name: &str) -> Result<(), AwsError> {
        self.client
            .delete_event_subscription()
            .subscription_name(name)
            .send()
            .await?;
        Ok(())
    }
}
