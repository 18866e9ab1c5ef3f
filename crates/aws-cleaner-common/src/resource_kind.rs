//! Cleanable resource types and execution ordering
//!
//! IAM is global and runs once before the regional walk. The regional kinds
//! run per region in a fixed order so that compute goes before the network
//! it lives in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Resource families the cleaner knows how to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Instances, security groups, Elastic IPs, volumes, snapshots, AMIs
    Ec2,
    /// Buckets and everything inside them
    S3,
    /// Functions, event source mappings, layers
    Lambda,
    /// Stacks
    CloudFormation,
    /// Instances, clusters, snapshots, parameter/subnet/option groups
    Rds,
    /// VPCs and the networking attached to them (runs last in a region)
    Vpc,
    /// Users, groups, roles, customer-managed policies (global)
    Iam,
}

impl ResourceKind {
    /// Every kind, in the order shown to the operator
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Ec2,
        ResourceKind::S3,
        ResourceKind::Lambda,
        ResourceKind::CloudFormation,
        ResourceKind::Rds,
        ResourceKind::Vpc,
        ResourceKind::Iam,
    ];

    /// Short lowercase identifier used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Ec2 => "ec2",
            ResourceKind::S3 => "s3",
            ResourceKind::Lambda => "lambda",
            ResourceKind::CloudFormation => "cloudformation",
            ResourceKind::Rds => "rds",
            ResourceKind::Vpc => "vpc",
            ResourceKind::Iam => "iam",
        }
    }

    /// Human-readable name used in logs and the UI
    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::Ec2 => "EC2",
            ResourceKind::S3 => "S3",
            ResourceKind::Lambda => "Lambda",
            ResourceKind::CloudFormation => "CloudFormation",
            ResourceKind::Rds => "RDS",
            ResourceKind::Vpc => "VPC",
            ResourceKind::Iam => "IAM",
        }
    }

    /// Global kinds have no region scope and run once per invocation
    pub fn is_global(self) -> bool {
        matches!(self, ResourceKind::Iam)
    }

    /// Get execution priority (lower number = runs first)
    ///
    /// - 0: IAM, once, before any region is touched
    /// - 1..=5: EC2, S3, Lambda, CloudFormation, RDS within each region
    /// - 6: VPC, after everything that can hold an ENI inside it
    pub fn execution_priority(self) -> u8 {
        match self {
            ResourceKind::Iam => 0,
            ResourceKind::Ec2 => 1,
            ResourceKind::S3 => 2,
            ResourceKind::Lambda => 3,
            ResourceKind::CloudFormation => 4,
            ResourceKind::Rds => 5,
            ResourceKind::Vpc => 6,
        }
    }

    /// Sort and dedupe a selection into execution order
    pub fn execution_order(selected: &[ResourceKind]) -> Vec<ResourceKind> {
        let mut kinds = selected.to_vec();
        kinds.sort_by_key(|k| k.execution_priority());
        kinds.dedup();
        kinds
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a resource kind name is not recognised
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resource type '{0}' (expected one of: ec2, s3, lambda, cloudformation, rds, vpc, iam)")]
pub struct ParseResourceKindError(String);

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ec2" => Ok(ResourceKind::Ec2),
            "s3" => Ok(ResourceKind::S3),
            "lambda" => Ok(ResourceKind::Lambda),
            "cloudformation" | "cfn" => Ok(ResourceKind::CloudFormation),
            "rds" => Ok(ResourceKind::Rds),
            "vpc" => Ok(ResourceKind::Vpc),
            "iam" => Ok(ResourceKind::Iam),
            _ => Err(ParseResourceKindError(s.to_string())),
        }
    }
}
