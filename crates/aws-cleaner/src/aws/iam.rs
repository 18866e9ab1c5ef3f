//! IAM adapter
//!
//! IAM is global: one client, built from any region's session, covers the
//! whole account. Entities cannot be deleted while anything is attached to
//! them, so the listing calls here expose every attachment the cleaner has
//! to undo first.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::AwsError;
use aws_sdk_iam::Client;
use aws_sdk_iam::types::PolicyScopeType;

/// Role path prefixes owned by AWS services; never touched
const SERVICE_ROLE_PATHS: &[&str] = &["/aws-service-role/", "/service-role/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub path: String,
}

impl Role {
    pub fn is_service_role(&self) -> bool {
        SERVICE_ROLE_PATHS.iter().any(|p| self.path.starts_with(p))
    }
}

/// Customer-managed policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub name: String,
    pub arn: String,
}

/// Everything a managed policy is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyEntities {
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub roles: Vec<String>,
}

impl PolicyEntities {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty() && self.roles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVersion {
    pub id: String,
    pub is_default: bool,
}

/// IAM operations used by the IAM cleaner.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait IamApi: Send + Sync {
    async fn account_alias(&self) -> Result<Option<String>, AwsError>;

    // Users
    async fn list_users(&self) -> Result<Vec<String>, AwsError>;
    async fn list_access_keys(&self, user: &str) -> Result<Vec<String>, AwsError>;
    async fn delete_access_key(&self, user: &str, key_id: &str) -> Result<(), AwsError>;
    async fn list_user_policies(&self, user: &str) -> Result<Vec<String>, AwsError>;
    async fn delete_user_policy(&self, user: &str, policy_name: &str) -> Result<(), AwsError>;
    async fn list_attached_user_policies(&self, user: &str) -> Result<Vec<String>, AwsError>;
    async fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<(), AwsError>;
    async fn list_groups_for_user(&self, user: &str) -> Result<Vec<String>, AwsError>;
    async fn remove_user_from_group(&self, group: &str, user: &str) -> Result<(), AwsError>;
    async fn list_mfa_devices(&self, user: &str) -> Result<Vec<String>, AwsError>;
    async fn deactivate_mfa_device(&self, user: &str, serial: &str) -> Result<(), AwsError>;
    async fn delete_login_profile(&self, user: &str) -> Result<(), AwsError>;
    async fn delete_user(&self, user: &str) -> Result<(), AwsError>;

    // Groups
    async fn list_groups(&self) -> Result<Vec<String>, AwsError>;
    async fn list_group_policies(&self, group: &str) -> Result<Vec<String>, AwsError>;
    async fn delete_group_policy(&self, group: &str, policy_name: &str) -> Result<(), AwsError>;
    async fn list_attached_group_policies(&self, group: &str) -> Result<Vec<String>, AwsError>;
    async fn detach_group_policy(&self, group: &str, policy_arn: &str) -> Result<(), AwsError>;
    async fn delete_group(&self, group: &str) -> Result<(), AwsError>;

    // Roles
    async fn list_roles(&self) -> Result<Vec<Role>, AwsError>;
    async fn list_role_policies(&self, role: &str) -> Result<Vec<String>, AwsError>;
    async fn delete_role_policy(&self, role: &str, policy_name: &str) -> Result<(), AwsError>;
    async fn list_attached_role_policies(&self, role: &str) -> Result<Vec<String>, AwsError>;
    async fn detach_role_policy(&self, role: &str, policy_arn: &str) -> Result<(), AwsError>;
    async fn list_instance_profiles_for_role(&self, role: &str) -> Result<Vec<String>, AwsError>;
    async fn remove_role_from_instance_profile(
        &self,
        profile: &str,
        role: &str,
    ) -> Result<(), AwsError>;
    async fn delete_instance_profile(&self, profile: &str) -> Result<(), AwsError>;
    async fn delete_role(&self, role: &str) -> Result<(), AwsError>;

    // Customer-managed policies
    async fn list_local_policies(&self) -> Result<Vec<Policy>, AwsError>;
    async fn list_entities_for_policy(&self, policy_arn: &str) -> Result<PolicyEntities, AwsError>;
    async fn list_policy_versions(&self, policy_arn: &str) -> Result<Vec<PolicyVersion>, AwsError>;
    async fn delete_policy_version(&self, policy_arn: &str, version_id: &str)
    -> Result<(), AwsError>;
    async fn delete_policy(&self, policy_arn: &str) -> Result<(), AwsError>;
}

/// Account-wide IAM client
pub struct IamClient {
    client: Client,
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

impl IamApi for IamClient {
    async fn account_alias(&self) -> Result<Option<String>, AwsError> {
        let response = self.client.list_account_aliases().send().await?;
        Ok(response.account_aliases().first().cloned())
    }

    async fn list_users(&self) -> Result<Vec<String>, AwsError> {
        let mut users = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_users();
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await?;

            users.extend(response.users().iter().map(|u| u.user_name().to_string()));

            if response.is_truncated() {
                marker = response.marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(users)
    }

    async fn list_access_keys(&self, user: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_access_keys()
            .user_name(user)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.access_key_metadata())
            .filter_map(|k| k.access_key_id())
            .map(str::to_string)
            .collect())
    }

    async fn delete_access_key(&self, user: &str, key_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_access_key()
            .user_name(user)
            .access_key_id(key_id)
            .send()
            .await?;
        Ok(())
    }

    async fn list_user_policies(&self, user: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_user_policies()
            .user_name(user)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages.iter().flat_map(|p| p.policy_names()).cloned().collect())
    }

    async fn delete_user_policy(&self, user: &str, policy_name: &str) -> Result<(), AwsError> {
        self.client
            .delete_user_policy()
            .user_name(user)
            .policy_name(policy_name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_attached_user_policies(&self, user: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_attached_user_policies()
            .user_name(user)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.attached_policies())
            .filter_map(|a| a.policy_arn())
            .map(str::to_string)
            .collect())
    }

    async fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<(), AwsError> {
        self.client
            .detach_user_policy()
            .user_name(user)
            .policy_arn(policy_arn)
            .send()
            .await?;
        Ok(())
    }

    async fn list_groups_for_user(&self, user: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_groups_for_user()
            .user_name(user)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.groups())
            .map(|g| g.group_name().to_string())
            .collect())
    }

    async fn remove_user_from_group(&self, group: &str, user: &str) -> Result<(), AwsError> {
        self.client
            .remove_user_from_group()
            .group_name(group)
            .user_name(user)
            .send()
            .await?;
        Ok(())
    }

    async fn list_mfa_devices(&self, user: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_mfa_devices()
            .user_name(user)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.mfa_devices())
            .map(|d| d.serial_number().to_string())
            .collect())
    }

    async fn deactivate_mfa_device(&self, user: &str, serial: &str) -> Result<(), AwsError> {
        self.client
            .deactivate_mfa_device()
            .user_name(user)
            .serial_number(serial)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_login_profile(&self, user: &str) -> Result<(), AwsError> {
        self.client
            .delete_login_profile()
            .user_name(user)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user: &str) -> Result<(), AwsError> {
        self.client.delete_user().user_name(user).send().await?;
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<String>, AwsError> {
        let mut groups = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_groups();
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await?;

            groups.extend(response.groups().iter().map(|g| g.group_name().to_string()));

            if response.is_truncated() {
                marker = response.marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(groups)
    }

    async fn list_group_policies(&self, group: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_group_policies()
            .group_name(group)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages.iter().flat_map(|p| p.policy_names()).cloned().collect())
    }

    async fn delete_group_policy(&self, group: &str, policy_name: &str) -> Result<(), AwsError> {
        self.client
            .delete_group_policy()
            .group_name(group)
            .policy_name(policy_name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_attached_group_policies(&self, group: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_attached_group_policies()
            .group_name(group)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.attached_policies())
            .filter_map(|a| a.policy_arn())
            .map(str::to_string)
            .collect())
    }

    async fn detach_group_policy(&self, group: &str, policy_arn: &str) -> Result<(), AwsError> {
        self.client
            .detach_group_policy()
            .group_name(group)
            .policy_arn(policy_arn)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> Result<(), AwsError> {
        self.client.delete_group().group_name(group).send().await?;
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AwsError> {
        let mut roles = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_roles();
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await?;

            roles.extend(response.roles().iter().map(|r| Role {
                name: r.role_name().to_string(),
                path: r.path().to_string(),
            }));

            if response.is_truncated() {
                marker = response.marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(roles)
    }

    async fn list_role_policies(&self, role: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_role_policies()
            .role_name(role)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages.iter().flat_map(|p| p.policy_names()).cloned().collect())
    }

    async fn delete_role_policy(&self, role: &str, policy_name: &str) -> Result<(), AwsError> {
        self.client
            .delete_role_policy()
            .role_name(role)
            .policy_name(policy_name)
            .send()
            .await?;
        Ok(())
    }

    async fn list_attached_role_policies(&self, role: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_attached_role_policies()
            .role_name(role)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.attached_policies())
            .filter_map(|a| a.policy_arn())
            .map(str::to_string)
            .collect())
    }

    async fn detach_role_policy(&self, role: &str, policy_arn: &str) -> Result<(), AwsError> {
        self.client
            .detach_role_policy()
            .role_name(role)
            .policy_arn(policy_arn)
            .send()
            .await?;
        Ok(())
    }

    async fn list_instance_profiles_for_role(&self, role: &str) -> Result<Vec<String>, AwsError> {
        let pages = self
            .client
            .list_instance_profiles_for_role()
            .role_name(role)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.instance_profiles())
            .map(|ip| ip.instance_profile_name().to_string())
            .collect())
    }

    async fn remove_role_from_instance_profile(
        &self,
        profile: &str,
        role: &str,
    ) -> Result<(), AwsError> {
        self.client
            .remove_role_from_instance_profile()
            .instance_profile_name(profile)
            .role_name(role)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_instance_profile(&self, profile: &str) -> Result<(), AwsError> {
        self.client
            .delete_instance_profile()
            .instance_profile_name(profile)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> Result<(), AwsError> {
        self.client.delete_role().role_name(role).send().await?;
        Ok(())
    }

    async fn list_local_policies(&self) -> Result<Vec<Policy>, AwsError> {
        let mut policies = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_policies().scope(PolicyScopeType::Local);
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await?;

            policies.extend(response.policies().iter().filter_map(|p| {
                Some(Policy {
                    name: p.policy_name()?.to_string(),
                    arn: p.arn()?.to_string(),
                })
            }));

            if response.is_truncated() {
                marker = response.marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(policies)
    }

    async fn list_entities_for_policy(&self, policy_arn: &str) -> Result<PolicyEntities, AwsError> {
        let mut entities = PolicyEntities::default();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_entities_for_policy().policy_arn(policy_arn);
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await?;

            entities.users.extend(
                response
                    .policy_users()
                    .iter()
                    .filter_map(|u| u.user_name())
                    .map(str::to_string),
            );
            entities.groups.extend(
                response
                    .policy_groups()
                    .iter()
                    .filter_map(|g| g.group_name())
                    .map(str::to_string),
            );
            entities.roles.extend(
                response
                    .policy_roles()
                    .iter()
                    .filter_map(|r| r.role_name())
                    .map(str::to_string),
            );

            if response.is_truncated() {
                marker = response.marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(entities)
    }

    async fn list_policy_versions(&self, policy_arn: &str) -> Result<Vec<PolicyVersion>, AwsError> {
        let response = self
            .client
            .list_policy_versions()
            .policy_arn(policy_arn)
            .send()
            .await?;

        Ok(response
            .versions()
            .iter()
            .filter_map(|v| {
                Some(PolicyVersion {
                    id: v.version_id()?.to_string(),
                    is_default: v.is_default_version(),
                })
            })
            .collect())
    }

    async fn delete_policy_version(
        &self,
        policy_arn: &str,
        version_id: &str,
    ) -> Result<(), AwsError> {
        self.client
            .delete_policy_version()
            .policy_arn(policy_arn)
            .version_id(version_id)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_policy(&self, policy_arn: &str) -> Result<(), AwsError> {
        self.client.delete_policy().policy_arn(policy_arn).send().await?;
        Ok(())
    }
}
