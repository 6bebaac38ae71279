//! AWS error classification
//!
//! SDK errors are converted into [`AwsError`] at the call site using the
//! error metadata (`.code()` / `.message()`) every AWS service error carries,
//! so callers can tell a naming conflict from a missing resource or a quota
//! limit without string matching on Debug output.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// AWS error categories
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found
    #[error("Resource not found: {message}")]
    NotFound { code: String, message: String },

    /// Resource name is already taken
    #[error("Resource already exists: {message}")]
    AlreadyExists { code: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Resource is still referenced by another resource
    #[error("Resource in use: {message}")]
    InUse { code: String, message: String },

    /// Any other AWS SDK error
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Convert an SDK error from any service client.
    ///
    /// All `aws-sdk-*` crates re-export the same `ProvideErrorMetadata`
    /// trait, so this works for S3, EC2, ELBv2, Auto Scaling and SNS alike.
    pub fn from_sdk<E>(err: E) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error,
    {
        match err.code() {
            Some(code) => classify_aws_error(Some(code), err.message()),
            // Dispatch/timeout failures carry no service metadata
            None => AwsError::Sdk {
                code: None,
                message: DisplayErrorContext(&err).to_string(),
            },
        }
    }

    /// The AWS error code, if the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::AlreadyExists { code, .. }
            | AwsError::InUse { code, .. } => Some(code),
            AwsError::Throttled { .. } => None,
            AwsError::Sdk { code, .. } => code.as_deref(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "InvalidInstanceID.NotFound",
    "LoadBalancerNotFound",
    "TargetGroupNotFound",
    "NotFound",
];

/// Known AWS error codes for name conflicts
const ALREADY_EXISTS_CODES: &[&str] = &[
    "BucketAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "DuplicateLoadBalancerName",
    "DuplicateTargetGroupName",
    "AlreadyExists",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "SlowDown",
];

/// Known AWS error codes for resources still referenced elsewhere
const IN_USE_CODES: &[&str] = &[
    "DependencyViolation",
    "ResourceInUse",
    "ScalingActivityInProgress",
    "BucketNotEmpty",
];

/// Classify an AWS error by its code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { message },
        Some(c) if IN_USE_CODES.contains(&c) => AwsError::InUse {
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Find the classified AWS error in an anyhow error chain, if any.
pub fn classify_anyhow_error(error: &anyhow::Error) -> Option<&AwsError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "BucketAlreadyExists",
        "Bucket names are global across all AWS accounts. Pick another with --bucket-name.",
    ),
    (
        "BucketAlreadyOwnedByYou",
        "The bucket already exists in this account. Tear down the previous deployment first.",
    ),
    (
        "InvalidBucketName",
        "Bucket names must be 3-63 lowercase letters, digits, dots or hyphens.",
    ),
    (
        "DuplicateLoadBalancerName",
        "A load balancer with this name exists. Use --load-balancer-name.",
    ),
    (
        "DuplicateTargetGroupName",
        "A target group with this name exists. Use --target-group-name.",
    ),
    (
        "AlreadyExists",
        "An Auto Scaling group with this name exists. Use --asg-name.",
    ),
    (
        "InvalidAMIID.NotFound",
        "AMI IDs are regional. Pass an --image-id that exists in this region.",
    ),
    (
        "InvalidAMIID.Malformed",
        "AMI IDs look like ami-0123456789abcdef0.",
    ),
    (
        "InvalidKeyPair.NotFound",
        "Create the EC2 key pair first or pass an existing one with --key-name.",
    ),
    (
        "InvalidGroup.NotFound",
        "The security group does not exist in this region. Check --security-group-id.",
    ),
    (
        "InvalidSubnetID.NotFound",
        "A subnet does not exist in this region. Check --subnet-ids.",
    ),
    (
        "InvalidSubnet",
        "Load balancers need two subnets in different availability zones.",
    ),
    (
        "InstanceLimitExceeded",
        "Request a service limit increase via AWS Service Quotas console.",
    ),
    (
        "VcpuLimitExceeded",
        "Request a service limit increase via AWS Service Quotas console.",
    ),
    (
        "TooManyLoadBalancers",
        "Request a service limit increase via AWS Service Quotas console.",
    ),
    (
        "UnauthorizedOperation",
        "The active credentials lack permission for this call. Check the IAM policy.",
    ),
    (
        "AccessDenied",
        "The active credentials lack permission for this call. Check the IAM policy.",
    ),
    (
        "AuthorizationError",
        "The active credentials lack permission for this call. Check the IAM policy.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<&'static str> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
}
