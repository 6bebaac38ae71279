//! Auto Scaling group and policy management

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::types::{AutoScalingGroupConfig, ScalingPolicyConfig};
use anyhow::{Context, Result};
use aws_sdk_autoscaling::Client;
use tracing::info;

/// Adjustment type for a policy that adds a fixed number of instances
const CHANGE_IN_CAPACITY: &str = "ChangeInCapacity";

/// Auto Scaling client
pub struct AutoScalingClient {
    client: Client,
}

impl FromAwsContext for AutoScalingClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.autoscaling_client(),
        }
    }
}

impl AutoScalingClient {
    /// Create an Auto Scaling group using an existing instance as template.
    pub async fn create_auto_scaling_group(&self, config: &AutoScalingGroupConfig) -> Result<()> {
        info!(
            name = %config.name,
            instance_id = %config.instance_id,
            target_group = %config.target_group_arn,
            min = config.min_size,
            max = config.max_size,
            desired = config.desired_capacity,
            "Creating Auto Scaling group"
        );

        self.client
            .create_auto_scaling_group()
            .auto_scaling_group_name(&config.name)
            .instance_id(&config.instance_id)
            .min_size(config.min_size)
            .max_size(config.max_size)
            .desired_capacity(config.desired_capacity)
            .target_group_arns(&config.target_group_arn)
            .vpc_zone_identifier(config.vpc_zone_identifier())
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to create Auto Scaling group {}", config.name))?;

        Ok(())
    }

    /// Attach a simple scale-out policy, returning the policy ARN.
    ///
    /// The policy is only a target for alarms; nothing here triggers it.
    pub async fn put_scale_out_policy(&self, config: &ScalingPolicyConfig) -> Result<String> {
        info!(
            asg = %config.asg_name,
            policy = %config.policy_name,
            adjustment = config.scaling_adjustment,
            cooldown_secs = config.cooldown_secs,
            "Putting scale-out policy"
        );

        let response = self
            .client
            .put_scaling_policy()
            .auto_scaling_group_name(&config.asg_name)
            .policy_name(&config.policy_name)
            .adjustment_type(CHANGE_IN_CAPACITY)
            .scaling_adjustment(config.scaling_adjustment)
            .cooldown(config.cooldown_secs)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to put scaling policy {}", config.policy_name))?;

        Ok(response.policy_arn().unwrap_or_default().to_string())
    }

    /// Force-delete an Auto Scaling group, terminating the instances it launched
    pub async fn delete_auto_scaling_group(&self, name: &str) -> Result<()> {
        info!(name = %name, "Deleting Auto Scaling group");

        self.client
            .delete_auto_scaling_group()
            .auto_scaling_group_name(name)
            .force_delete(true)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to delete Auto Scaling group {name}"))?;

        Ok(())
    }
}
