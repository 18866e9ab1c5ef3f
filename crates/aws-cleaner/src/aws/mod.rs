//! AWS client adapters
//!
//! One module per service, each exposing plain descriptor structs and a
//! mockable `*Api` trait the cleaners are generic over:
//! - EC2 / VPC: compute and networking (one SDK client, two traits)
//! - S3: buckets and their contents
//! - Lambda: functions, event source mappings, layers
//! - CloudFormation: stacks
//! - RDS: instances, clusters, snapshots, groups, subscriptions
//! - IAM: users, groups, roles, customer-managed policies (global)
//! - STS: account id lookup

pub mod account;
pub mod cloudformation;
pub mod context;
pub mod ec2;
pub mod error;
pub mod iam;
pub mod lambda;
pub mod rds;
pub mod s3;

pub use account::{AccountId, get_current_account_id};
pub use cloudformation::{CloudFormationApi, CloudFormationClient};
pub use context::{AwsContext, FromAwsContext};
pub use ec2::{Ec2Api, Ec2Client, VpcApi};
pub use error::{AwsError, classify_aws_error, ignore_not_found};
pub use iam::{IamApi, IamClient};
pub use lambda::{LambdaApi, LambdaClient};
pub use rds::{RdsApi, RdsClient};
pub use s3::{S3Api, S3Client};
