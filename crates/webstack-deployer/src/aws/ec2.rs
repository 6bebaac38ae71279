//! EC2 instance lifecycle

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::tags::{self, TAG_NAME};
use super::types::LaunchInstanceConfig;
use crate::wait::{WaitConfig, wait_for_resource};
use anyhow::{Context, Result};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::{InstanceStateName, InstanceType, ResourceType};
use base64::Engine;
use std::time::Duration;
use tracing::{debug, info};
use webstack_common::defaults::DEFAULT_TERMINATION_WAIT_TIMEOUT_SECS;

/// EC2 client for the web server instance
pub struct Ec2Client {
    client: Client,
    termination_timeout: Duration,
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
            termination_timeout: Duration::from_secs(DEFAULT_TERMINATION_WAIT_TIMEOUT_SECS),
        }
    }
}

impl Ec2Client {
    /// Launch exactly one instance and return its ID.
    ///
    /// Returns as soon as EC2 accepts the request; the instance is usually
    /// still `pending`.
    pub async fn launch_instance(&self, config: &LaunchInstanceConfig) -> Result<String> {
        let instance_type: InstanceType = config
            .instance_type
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid instance type: {}", config.instance_type))?;

        info!(
            image_id = %config.image_id,
            instance_type = %config.instance_type,
            key_name = %config.key_name,
            "Launching instance"
        );

        let user_data_b64 =
            base64::engine::general_purpose::STANDARD.encode(config.user_data.as_bytes());

        let response = self
            .client
            .run_instances()
            .image_id(&config.image_id)
            .instance_type(instance_type)
            .min_count(1)
            .max_count(1)
            .key_name(&config.key_name)
            .set_security_group_ids(Some(config.security_group_ids.clone()))
            .user_data(user_data_b64)
            .tag_specifications(tags::ec2_tag_spec(
                ResourceType::Instance,
                &config.deployment_id,
                &[(TAG_NAME, config.name.as_str())],
            ))
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .context("Failed to launch instance")?;

        let instance_id = response
            .instances()
            .first()
            .and_then(|i| i.instance_id())
            .context("No instance ID returned by RunInstances")?
            .to_string();

        info!(instance_id = %instance_id, "Instance launched");

        Ok(instance_id)
    }

    /// Terminate instances in a single API call
    pub async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        info!(instances = ?instance_ids, "Terminating instances");

        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .context("Failed to terminate instances")?;

        Ok(())
    }

    /// Block until every instance reports `terminated`.
    ///
    /// Polls DescribeInstances with exponential backoff (2-15s). Hitting the
    /// timeout is an error.
    pub async fn wait_for_terminated(&self, instance_ids: &[String]) -> Result<()> {
        info!(
            instances = ?instance_ids,
            timeout_secs = self.termination_timeout.as_secs(),
            "Waiting for instances to terminate"
        );

        wait_for_resource(
            WaitConfig {
                initial_delay: Duration::from_secs(2),
                max_delay: Duration::from_secs(15),
                timeout: self.termination_timeout,
            },
            || async {
                let response = self
                    .client
                    .describe_instances()
                    .set_instance_ids(Some(instance_ids.to_vec()))
                    .send()
                    .await
                    .map_err(AwsError::from_sdk)
                    .context("Failed to describe instances")?;

                let states: Vec<_> = response
                    .reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .map(|i| {
                        (
                            i.instance_id().unwrap_or_default(),
                            i.state().and_then(|s| s.name()),
                        )
                    })
                    .collect();

                for (id, state) in &states {
                    debug!(instance_id = %id, state = ?state, "Instance state");
                }

                Ok(all_terminated(states.iter().map(|(_, s)| *s)))
            },
            &format!("EC2 instances {} terminated", instance_ids.join(", ")),
        )
        .await
    }
}

/// An instance with no reported state is treated as gone.
fn all_terminated<'a>(states: impl IntoIterator<Item = Option<&'a InstanceStateName>>) -> bool {
    states
        .into_iter()
        .all(|s| matches!(s, None | Some(InstanceStateName::Terminated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_only_when_every_instance_is() {
        let terminated = InstanceStateName::Terminated;
        let shutting_down = InstanceStateName::ShuttingDown;

        assert!(all_terminated([Some(&terminated), Some(&terminated)]));
        assert!(all_terminated([Some(&terminated), None]));
        assert!(!all_terminated([Some(&terminated), Some(&shutting_down)]));
        assert!(all_terminated(std::iter::empty()));
    }
}
