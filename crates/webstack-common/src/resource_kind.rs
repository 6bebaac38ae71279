//! AWS resource kinds and teardown ordering
//!
//! Teardown must run in dependency order: the auto-scaling group references
//! the target group and the instance, the load balancer fronts the target
//! group, and the bucket and topic stand alone.

use serde::{Deserialize, Serialize};

/// Types of AWS resources created by a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Auto Scaling group (references the instance and the target group)
    AutoScalingGroup,
    /// Application load balancer
    LoadBalancer,
    /// Target group (must outlive the load balancer)
    TargetGroup,
    /// EC2 instance
    Ec2Instance,
    /// S3 bucket
    S3Bucket,
    /// SNS topic
    SnsTopic,
}

impl ResourceKind {
    /// Every kind, in teardown order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::AutoScalingGroup,
        ResourceKind::LoadBalancer,
        ResourceKind::TargetGroup,
        ResourceKind::Ec2Instance,
        ResourceKind::S3Bucket,
        ResourceKind::SnsTopic,
    ];

    /// Stable identifier used in the state database
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::AutoScalingGroup => "auto_scaling_group",
            ResourceKind::LoadBalancer => "load_balancer",
            ResourceKind::TargetGroup => "target_group",
            ResourceKind::Ec2Instance => "ec2_instance",
            ResourceKind::S3Bucket => "s3_bucket",
            ResourceKind::SnsTopic => "sns_topic",
        }
    }

    /// Parse the database identifier back into a kind
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_starts_with_auto_scaling_group() {
        // The ASG references the instance and the target group.
        assert_eq!(ResourceKind::ALL[0], ResourceKind::AutoScalingGroup);
        let position = |kind| ResourceKind::ALL.iter().position(|k| *k == kind);
        assert!(position(ResourceKind::LoadBalancer) < position(ResourceKind::TargetGroup));
    }

    #[test]
    fn test_parse_known_and_unknown() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResourceKind::parse("iam_role"), None);
        assert_eq!(ResourceKind::parse(""), None);
    }

    #[test]
    fn test_serde_uses_database_names() {
        let json = serde_json::to_string(&ResourceKind::AutoScalingGroup).unwrap();
        assert_eq!(json, "\"auto_scaling_group\"");
    }
}
