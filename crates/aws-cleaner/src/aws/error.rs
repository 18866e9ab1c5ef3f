//! AWS error classification
//!
//! Every SDK error is turned into an [`AwsError`] from its `.code()` and
//! `.message()` (via `ProvideErrorMetadata`). The variant decides how loudly
//! a failure is logged: rejections that a cleanup run expects (the resource
//! is gone, or still has dependents) are warnings, anything else is an error.

use aws_sdk_ec2::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// AWS error categories for cleanup logic
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// Resource (or optional configuration) does not exist
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Resource still has dependents or is attached to something
    #[error("Resource in use: {message}")]
    InUse { message: String },

    /// Operation or feature not offered in this region or to this caller
    #[error("Operation unavailable ({code}): {message}")]
    Unavailable { code: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// Generic AWS SDK error with code and message
    #[error("AWS error{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is an "in use / has dependents" error
    pub fn is_in_use(&self) -> bool {
        matches!(self, AwsError::InUse { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AwsError::Unavailable { .. })
    }

    /// Expected rejections are logged as warnings and never count as failures
    pub fn is_expected(&self) -> bool {
        self.is_not_found() || self.is_in_use()
    }

    /// Provider error code, if the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::Unavailable { code, .. } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    // EC2 / VPC
    "InvalidInstanceID.NotFound",
    "InvalidGroup.NotFound",
    "InvalidAllocationID.NotFound",
    "InvalidVolume.NotFound",
    "InvalidSnapshot.NotFound",
    "InvalidAMIID.NotFound",
    "InvalidAMIID.Unavailable",
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidInternetGatewayID.NotFound",
    "InvalidVpnConnectionID.NotFound",
    "InvalidVpnGatewayID.NotFound",
    "InvalidVpnGatewayAttachment.NotFound",
    "InvalidTransitGatewayAttachmentID.NotFound",
    "InvalidTransitGatewayID.NotFound",
    "InvalidRouteTableID.NotFound",
    "InvalidAssociationID.NotFound",
    "InvalidSubnetID.NotFound",
    "InvalidNetworkAclID.NotFound",
    "InvalidVpcEndpointId.NotFound",
    "InvalidVpcPeeringConnectionID.NotFound",
    "InvalidVpcID.NotFound",
    "NatGatewayNotFound",
    // S3
    "NoSuchBucket",
    "NoSuchKey",
    "NoSuchLifecycleConfiguration",
    "NoSuchBucketPolicy",
    "ObjectLockConfigurationNotFoundError",
    // IAM
    "NoSuchEntity",
    // Lambda
    "ResourceNotFoundException",
    // RDS
    "DBInstanceNotFound",
    "DBClusterNotFoundFault",
    "DBSnapshotNotFound",
    "DBClusterSnapshotNotFoundFault",
    "DBParameterGroupNotFound",
    "DBClusterParameterGroupNotFound",
    "DBSubnetGroupNotFoundFault",
    "OptionGroupNotFoundFault",
    "SubscriptionNotFound",
];

/// Known AWS error codes for resources that still have dependents
const IN_USE_CODES: &[&str] = &[
    "DependencyViolation",
    "InvalidGroup.InUse",
    "InvalidSnapshot.InUse",
    "VolumeInUse",
    "IncorrectState",
    "InvalidState",
    "BucketNotEmpty",
    "DeleteConflict",
    "ResourceConflictException",
    "InvalidDBInstanceState",
    "InvalidDBClusterStateFault",
    "InvalidDBSnapshotState",
    "InvalidDBClusterSnapshotStateFault",
    "InvalidDBParameterGroupState",
    "InvalidDBSubnetGroupStateFault",
    "InvalidOptionGroupStateFault",
];

/// Message fragments that mark an in-use rejection under a generic code
const IN_USE_MESSAGES: &[&str] = &[
    "has a dependent object",
    "currently in use",
    "is being used by",
    "has dependencies",
    "is in use",
];

/// Codes meaning the operation is not offered to this caller or region
const UNAVAILABLE_CODES: &[&str] = &[
    "InvalidAction",
    "UnauthorizedOperation",
    "OptInRequired",
    "UnsupportedOperation",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Classify an AWS error from its code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        Some(c) if IN_USE_CODES.contains(&c) => AwsError::InUse { message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if UNAVAILABLE_CODES.contains(&c) => AwsError::Unavailable {
            code: c.to_string(),
            message,
        },
        _ if IN_USE_MESSAGES.iter().any(|m| message.contains(m)) => AwsError::InUse { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

impl<E, R> From<SdkError<E, R>> for AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        match err.message() {
            Some(message) => classify_aws_error(err.code(), Some(message)),
            // Dispatch and timeout failures carry no service metadata
            None => {
                let rendered = DisplayErrorContext(&err).to_string();
                classify_aws_error(err.code(), Some(&rendered))
            }
        }
    }
}

impl From<BuildError> for AwsError {
    fn from(err: BuildError) -> Self {
        AwsError::Sdk {
            code: None,
            message: err.to_string(),
        }
    }
}

/// Treat "not found" as success.
///
/// Used for deletes of optional configuration (lifecycle rules, bucket
/// policies, login profiles) where absence is the desired end state.
pub fn ignore_not_found(result: Result<(), AwsError>) -> Result<(), AwsError> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
            assert!(err.is_expected());
        }
    }

    #[test]
    fn in_use_codes() {
        for code in IN_USE_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_in_use(), "Expected InUse for code: {code}");
            assert!(err.is_expected());
        }
    }

    #[test]
    fn in_use_messages_under_generic_codes() {
        let cases = [
            (
                "InvalidParameterValue",
                "resource sg-1 has a dependent object",
            ),
            (
                "InvalidParameterValue",
                "Network interface is currently in use by instance i-1",
            ),
            ("InvalidParameterValue", "acl-1 is being used by subnet-1"),
            ("InvalidParameterValue", "The vpc 'vpc-1' has dependencies"),
        ];
        for (code, message) in cases {
            let err = classify_aws_error(Some(code), Some(message));
            assert!(err.is_in_use(), "Expected InUse for message: {message}");
        }
    }

    #[test]
    fn unavailable_codes_are_not_expected() {
        for code in UNAVAILABLE_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_unavailable(), "Expected Unavailable for code: {code}");
            assert!(!err.is_expected());
            assert_eq!(err.code(), Some(*code));
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(matches!(err, AwsError::Throttled));
            assert!(!err.is_expected());
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("AccessDenied"), Some("not allowed"));
        assert!(matches!(err, AwsError::Sdk { .. }));
        assert!(!err.is_expected());
        assert_eq!(err.code(), Some("AccessDenied"));

        let err2 = classify_aws_error(None, None);
        assert!(matches!(err2, AwsError::Sdk { code: None, ref message } if message == "Unknown error"));
    }

    #[test]
    fn code_list_wins_over_message() {
        // A not-found whose message happens to mention use stays not-found
        let err = classify_aws_error(
            Some("InvalidGroup.NotFound"),
            Some("group that was currently in use is gone"),
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn ignore_not_found_passes_other_errors() {
        assert!(ignore_not_found(Ok(())).is_ok());
        assert!(ignore_not_found(Err(classify_aws_error(Some("NoSuchEntity"), None))).is_ok());
        assert!(ignore_not_found(Err(classify_aws_error(Some("AccessDenied"), None))).is_err());
    }

    #[test]
    fn display_includes_code() {
        let err = classify_aws_error(Some("AccessDenied"), Some("nope"));
        assert_eq!(err.to_string(), "AWS error (AccessDenied): nope");
        let err = AwsError::Sdk {
            code: None,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "AWS error: boom");
    }
}
