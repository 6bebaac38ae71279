//! AWS client modules
//!
//! Thin wrappers around the AWS SDK clients for:
//! - S3: Asset bucket
//! - EC2: Web server instance
//! - ELBv2: Load balancer and target group
//! - Auto Scaling: Group and scale-out policy
//! - SNS: Alert topic
//! - STS: Account ID lookup

pub mod account;
pub mod autoscaling;
pub mod context;
pub mod ec2;
pub mod elb;
pub mod error;
pub mod operations;
pub mod s3;
pub mod sns;
pub mod tags;
pub mod types;

pub use account::{AccountId, get_current_account_id};
pub use autoscaling::AutoScalingClient;
pub use context::{AwsContext, FromAwsContext};
pub use ec2::Ec2Client;
pub use elb::ElbClient;
pub use error::{AwsError, classify_anyhow_error, classify_aws_error};
pub use operations::{AwsStack, StackOperations};
pub use s3::S3Client;
pub use sns::SnsClient;
pub use types::{
    AutoScalingGroupConfig, LaunchInstanceConfig, LoadBalancerConfig, ScalingPolicyConfig,
    TargetGroupConfig,
};

#[cfg(test)]
pub use operations::MockStackOperations;
#[cfg(test)]
pub use operations::mock_support::{mock_err, mock_ok};
