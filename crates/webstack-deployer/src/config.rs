//! Stack configuration
//!
//! Composed of focused sub-configs, one per provisioning step. `Default`
//! yields the stack's literal parameters from `webstack_common::defaults`.

use crate::aws::{
    AutoScalingGroupConfig, LaunchInstanceConfig, LoadBalancerConfig, ScalingPolicyConfig,
    TargetGroupConfig,
};
use serde::{Deserialize, Serialize};
use webstack_common::defaults::*;

/// AWS account and region settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    /// Named profile (overrides default credential resolution)
    pub aws_profile: Option<String>,
}

/// Storage step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket_name: String,
}

/// Compute step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeConfig {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub instance_name: String,
    pub user_data: String,
}

/// Network placement shared by the instance, load balancer and ASG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Attached to the web server instance
    pub security_group_id: String,
    /// Attached to the load balancer
    pub load_balancer_security_group_id: String,
    pub subnet_ids: Vec<String>,
    pub vpc_id: String,
}

/// Load balancing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancingConfig {
    pub load_balancer_name: String,
    pub target_group_name: String,
    pub target_port: i32,
}

/// Auto-scaling step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub asg_name: String,
    pub min_size: i32,
    pub max_size: i32,
    pub desired_capacity: i32,
    pub policy_name: String,
    pub scaling_adjustment: i32,
    pub cooldown_secs: i32,
}

/// Notification step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub topic_name: String,
    pub alert_email: String,
}

/// Full description of the stack to deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    pub aws: AwsConfig,
    pub storage: StorageConfig,
    pub compute: ComputeConfig,
    pub network: NetworkConfig,
    pub load_balancing: LoadBalancingConfig,
    pub scaling: ScalingConfig,
    pub notification: NotificationConfig,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            aws: AwsConfig {
                region: DEFAULT_REGION.to_string(),
                aws_profile: None,
            },
            storage: StorageConfig {
                bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            },
            compute: ComputeConfig {
                image_id: DEFAULT_IMAGE_ID.to_string(),
                instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
                key_name: DEFAULT_KEY_NAME.to_string(),
                instance_name: DEFAULT_INSTANCE_NAME.to_string(),
                user_data: DEFAULT_USER_DATA.to_string(),
            },
            network: NetworkConfig {
                security_group_id: DEFAULT_SECURITY_GROUP_ID.to_string(),
                load_balancer_security_group_id: DEFAULT_LOAD_BALANCER_SECURITY_GROUP_ID
                    .to_string(),
                subnet_ids: default_subnet_ids(),
                vpc_id: DEFAULT_VPC_ID.to_string(),
            },
            load_balancing: LoadBalancingConfig {
                load_balancer_name: DEFAULT_LOAD_BALANCER_NAME.to_string(),
                target_group_name: DEFAULT_TARGET_GROUP_NAME.to_string(),
                target_port: DEFAULT_TARGET_PORT,
            },
            scaling: ScalingConfig {
                asg_name: DEFAULT_ASG_NAME.to_string(),
                min_size: DEFAULT_ASG_MIN_SIZE,
                max_size: DEFAULT_ASG_MAX_SIZE,
                desired_capacity: DEFAULT_ASG_DESIRED_CAPACITY,
                policy_name: DEFAULT_SCALING_POLICY_NAME.to_string(),
                scaling_adjustment: DEFAULT_SCALING_ADJUSTMENT,
                cooldown_secs: DEFAULT_SCALING_COOLDOWN_SECS,
            },
            notification: NotificationConfig {
                topic_name: DEFAULT_TOPIC_NAME.to_string(),
                alert_email: DEFAULT_ALERT_EMAIL.to_string(),
            },
        }
    }
}

// Request builders: each turns the relevant sub-configs (plus identifiers
// produced by earlier steps) into the parameters of one provider call.
impl StackConfig {
    pub fn region(&self) -> &str {
        &self.aws.region
    }

    pub fn launch_instance(&self, deployment_id: &str) -> LaunchInstanceConfig {
        LaunchInstanceConfig {
            deployment_id: deployment_id.to_string(),
            image_id: self.compute.image_id.clone(),
            instance_type: self.compute.instance_type.clone(),
            key_name: self.compute.key_name.clone(),
            security_group_ids: vec![self.network.security_group_id.clone()],
            user_data: self.compute.user_data.clone(),
            name: self.compute.instance_name.clone(),
        }
    }

    pub fn load_balancer(&self) -> LoadBalancerConfig {
        LoadBalancerConfig {
            name: self.load_balancing.load_balancer_name.clone(),
            subnet_ids: self.network.subnet_ids.clone(),
            security_group_ids: vec![self.network.load_balancer_security_group_id.clone()],
        }
    }

    pub fn target_group(&self) -> TargetGroupConfig {
        TargetGroupConfig {
            name: self.load_balancing.target_group_name.clone(),
            port: self.load_balancing.target_port,
            vpc_id: self.network.vpc_id.clone(),
        }
    }

    pub fn auto_scaling_group(
        &self,
        instance_id: &str,
        target_group_arn: &str,
    ) -> AutoScalingGroupConfig {
        AutoScalingGroupConfig {
            name: self.scaling.asg_name.clone(),
            instance_id: instance_id.to_string(),
            target_group_arn: target_group_arn.to_string(),
            subnet_ids: self.network.subnet_ids.clone(),
            min_size: self.scaling.min_size,
            max_size: self.scaling.max_size,
            desired_capacity: self.scaling.desired_capacity,
        }
    }

    pub fn scale_out_policy(&self) -> ScalingPolicyConfig {
        ScalingPolicyConfig {
            asg_name: self.scaling.asg_name.clone(),
            policy_name: self.scaling.policy_name.clone(),
            scaling_adjustment: self.scaling.scaling_adjustment,
            cooldown_secs: self.scaling.cooldown_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_literal_parameters() {
        let config = StackConfig::default();
        assert_eq!(config.compute.instance_type, "t2.micro");
        assert_eq!(config.network.subnet_ids.len(), 2);
        assert_eq!(config.scaling.min_size, 1);
        assert_eq!(config.scaling.max_size, 3);
        assert_eq!(config.scaling.desired_capacity, 1);
        assert_eq!(config.scaling.cooldown_secs, 300);
        assert_eq!(config.notification.topic_name, "infra-alerts");
    }

    #[test]
    fn launch_request_uses_instance_security_group() {
        let config = StackConfig::default();
        let launch = config.launch_instance("dep-1");

        assert_eq!(launch.deployment_id, "dep-1");
        assert_eq!(launch.security_group_ids, vec!["sg-0ff7dc4e0c607385a".to_string()]);
        assert!(launch.user_data.contains("nginx"));
    }

    #[test]
    fn load_balancer_has_its_own_security_group() {
        let mut config = StackConfig::default();
        let lb = config.load_balancer();

        assert_eq!(lb.security_group_ids, vec!["sg-123abc".to_string()]);
        assert_ne!(lb.security_group_ids, config.launch_instance("dep-1").security_group_ids);
        assert_eq!(lb.subnet_ids, config.network.subnet_ids);

        config.network.load_balancer_security_group_id = "sg-lb-override".to_string();
        assert_eq!(
            config.load_balancer().security_group_ids,
            vec!["sg-lb-override".to_string()]
        );
    }

    #[test]
    fn asg_request_threads_identifiers() {
        let config = StackConfig::default();
        let asg = config.auto_scaling_group("i-abc", "arn:tg:xyz");

        assert_eq!(asg.instance_id, "i-abc");
        assert_eq!(asg.target_group_arn, "arn:tg:xyz");
        assert_eq!(asg.subnet_ids, config.network.subnet_ids);
        assert_eq!(config.scale_out_policy().asg_name, asg.name);
    }

    #[test]
    fn config_serializes_for_the_state_store() {
        let config = StackConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: StackConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
