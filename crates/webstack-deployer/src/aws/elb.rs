//! Application load balancer and target group management

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::types::{LoadBalancerConfig, TargetGroupConfig};
use anyhow::{Context, Result};
use aws_sdk_elasticloadbalancingv2::Client;
use aws_sdk_elasticloadbalancingv2::types::{ProtocolEnum, TargetDescription, TargetTypeEnum};
use tracing::info;

/// ELBv2 client for the stack's load balancer
pub struct ElbClient {
    client: Client,
}

impl FromAwsContext for ElbClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.elb_client(),
        }
    }
}

impl ElbClient {
    /// Create an internet-facing application load balancer, returning its ARN
    pub async fn create_load_balancer(&self, config: &LoadBalancerConfig) -> Result<String> {
        info!(
            name = %config.name,
            subnets = ?config.subnet_ids,
            "Creating load balancer"
        );

        let response = self
            .client
            .create_load_balancer()
            .name(&config.name)
            .set_subnets(Some(config.subnet_ids.clone()))
            .set_security_groups(Some(config.security_group_ids.clone()))
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to create load balancer {}", config.name))?;

        let arn = response
            .load_balancers()
            .first()
            .and_then(|lb| lb.load_balancer_arn())
            .context("No load balancer ARN returned")?
            .to_string();

        info!(arn = %arn, "Load balancer created");
        Ok(arn)
    }

    /// Create an HTTP target group with instance targets, returning its ARN
    pub async fn create_target_group(&self, config: &TargetGroupConfig) -> Result<String> {
        info!(name = %config.name, port = config.port, vpc_id = %config.vpc_id, "Creating target group");

        let response = self
            .client
            .create_target_group()
            .name(&config.name)
            .protocol(ProtocolEnum::Http)
            .port(config.port)
            .vpc_id(&config.vpc_id)
            .target_type(TargetTypeEnum::Instance)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to create target group {}", config.name))?;

        let arn = response
            .target_groups()
            .first()
            .and_then(|tg| tg.target_group_arn())
            .context("No target group ARN returned")?
            .to_string();

        info!(arn = %arn, "Target group created");
        Ok(arn)
    }

    /// Register one instance with a target group
    pub async fn register_target(&self, target_group_arn: &str, instance_id: &str) -> Result<()> {
        info!(target_group = %target_group_arn, instance_id = %instance_id, "Registering target");

        self.client
            .register_targets()
            .target_group_arn(target_group_arn)
            .targets(TargetDescription::builder().id(instance_id).build()?)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to register {instance_id} with target group"))?;

        Ok(())
    }

    pub async fn delete_load_balancer(&self, arn: &str) -> Result<()> {
        info!(arn = %arn, "Deleting load balancer");

        self.client
            .delete_load_balancer()
            .load_balancer_arn(arn)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to delete load balancer {arn}"))?;

        Ok(())
    }

    pub async fn delete_target_group(&self, arn: &str) -> Result<()> {
        info!(arn = %arn, "Deleting target group");

        self.client
            .delete_target_group()
            .target_group_arn(arn)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to delete target group {arn}"))?;

        Ok(())
    }
}
