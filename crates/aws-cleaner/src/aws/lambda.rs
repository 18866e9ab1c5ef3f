//! Lambda function and layer adapter

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::AwsError;
use aws_sdk_lambda::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSourceMapping {
    pub uuid: String,
    pub source_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
}

/// Lambda operations used by the Lambda cleaner.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait LambdaApi: Send + Sync {
    async fn list_functions(&self) -> Result<Vec<Function>, AwsError>;
    async fn list_event_source_mappings(
        &self,
        function_name: &str,
    ) -> Result<Vec<EventSourceMapping>, AwsError>;
    async fn delete_event_source_mapping(&self, uuid: &str) -> Result<(), AwsError>;
    async fn delete_function(&self, function_name: &str) -> Result<(), AwsError>;

    async fn list_layers(&self) -> Result<Vec<Layer>, AwsError>;
    async fn list_layer_versions(&self, layer_name: &str) -> Result<Vec<i64>, AwsError>;
    async fn delete_layer_version(&self, layer_name: &str, version: i64) -> Result<(), AwsError>;
}

/// Lambda client for one region
pub struct LambdaClient {
    client: Client,
}

impl FromAwsContext for LambdaClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.lambda_client(),
        }
    }
}

impl LambdaApi for LambdaClient {
    async fn list_functions(&self) -> Result<Vec<Function>, AwsError> {
        let pages = self
            .client
            .list_functions()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.functions())
            .filter_map(|f| {
                Some(Function {
                    name: f.function_name()?.to_string(),
                    runtime: f.runtime().map(|r| r.as_str().to_string()),
                })
            })
            .collect())
    }

    async fn list_event_source_mappings(
        &self,
        function_name: &str,
    ) -> Result<Vec<EventSourceMapping>, AwsError> {
        let pages = self
            .client
            .list_event_source_mappings()
            .function_name(function_name)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.event_source_mappings())
            .filter_map(|m| {
                Some(EventSourceMapping {
                    uuid: m.uuid()?.to_string(),
                    source_arn: m.event_source_arn().map(str::to_string),
                })
            })
            .collect())
    }

    async fn delete_event_source_mapping(&self, uuid: &str) -> Result<(), AwsError> {
        self.client
            .delete_event_source_mapping()
            .uuid(uuid)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_function(&self, function_name: &str) -> Result<(), AwsError> {
        self.client
            .delete_function()
            .function_name(function_name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_layers(&self) -> Result<Vec<Layer>, AwsError> {
        let pages = self
            .client
            .list_layers()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.layers())
            .filter_map(|l| l.layer_name())
            .map(|name| Layer {
                name: name.to_string(),
            })
            .collect())
    }

    async fn list_layer_versions(&self, layer_name: &str) -> Result<Vec<i64>, AwsError> {
        let pages = self
            .client
            .list_layer_versions()
            .layer_name(layer_name)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.layer_versions())
            .map(|v| v.version())
            .collect())
    }

    async fn delete_layer_version(&self, layer_name: &str, version: i64) -> Result<(), AwsError> {
        self.client
            .delete_layer_version()
            .layer_name(layer_name)
            .version_number(version)
            .send()
            .await?;
        Ok(())
    }
}
