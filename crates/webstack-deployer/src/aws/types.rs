//! Request parameters for the provider operations

/// Configuration for launching the web server instance
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchInstanceConfig {
    /// Deployment identifier for tagging
    pub deployment_id: String,
    /// AMI ID
    pub image_id: String,
    /// EC2 instance type (e.g., "t2.micro")
    pub instance_type: String,
    /// Existing key pair name
    pub key_name: String,
    /// Security groups attached to the instance
    pub security_group_ids: Vec<String>,
    /// Boot script (plain text, encoded before sending)
    pub user_data: String,
    /// Value of the `Name` tag
    pub name: String,
}

/// Configuration for the application load balancer
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancerConfig {
    pub name: String,
    /// Subnets in at least two availability zones
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

/// Configuration for the HTTP target group
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroupConfig {
    pub name: String,
    pub port: i32,
    pub vpc_id: String,
}

/// Configuration for the Auto Scaling group
#[derive(Debug, Clone, PartialEq)]
pub struct AutoScalingGroupConfig {
    pub name: String,
    /// Instance used as the launch template
    pub instance_id: String,
    pub target_group_arn: String,
    pub subnet_ids: Vec<String>,
    pub min_size: i32,
    pub max_size: i32,
    pub desired_capacity: i32,
}

impl AutoScalingGroupConfig {
    /// Subnets in the comma-separated form Auto Scaling expects
    pub fn vpc_zone_identifier(&self) -> String {
        self.subnet_ids.join(",")
    }
}

/// Configuration for the simple scale-out policy
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingPolicyConfig {
    pub asg_name: String,
    pub policy_name: String,
    /// Instances added per activation
    pub scaling_adjustment: i32,
    pub cooldown_secs: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vpc_zone_identifier_joins_subnets() {
        let config = AutoScalingGroupConfig {
            name: "asg".to_string(),
            instance_id: "i-1".to_string(),
            target_group_arn: "arn:tg".to_string(),
            subnet_ids: vec!["subnet-a".to_string(), "subnet-b".to_string()],
            min_size: 1,
            max_size: 3,
            desired_capacity: 1,
        };
        assert_eq!(config.vpc_zone_identifier(), "subnet-a,subnet-b");
    }
}
