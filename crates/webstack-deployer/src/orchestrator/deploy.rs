//! Deploy sequence

use super::types::DeployOutputs;
use crate::aws::StackOperations;
use crate::config::StackConfig;
use crate::state::{DeploymentStatus, StateRecorder};
use anyhow::Result;
use tracing::{error, info};
use webstack_common::ResourceKind;

/// Protocol of the alert subscription
const ALERT_PROTOCOL: &str = "email";

/// One deploy invocation: provider operations, the stack description and
/// the state recorder. Each step method is one stage of the sequence.
pub struct Deployer<'a, O> {
    ops: &'a O,
    config: &'a StackConfig,
    deployment_id: &'a str,
    recorder: &'a StateRecorder,
}

impl<'a, O: StackOperations> Deployer<'a, O> {
    pub fn new(
        ops: &'a O,
        config: &'a StackConfig,
        deployment_id: &'a str,
        recorder: &'a StateRecorder,
    ) -> Self {
        Self {
            ops,
            config,
            deployment_id,
            recorder,
        }
    }

    /// Create the bucket. No existence pre-check.
    pub async fn create_storage(&self) -> Result<()> {
        let bucket_name = &self.config.storage.bucket_name;

        self.ops
            .create_bucket(bucket_name, self.deployment_id)
            .await?;
        self.recorder.created(ResourceKind::S3Bucket, bucket_name).await;

        println!("S3 bucket {bucket_name} created successfully.");
        Ok(())
    }

    /// Launch the web server instance and return its id. Does not wait for
    /// it to reach `running`.
    pub async fn launch_compute(&self) -> Result<String> {
        let instance_id = self
            .ops
            .launch_instance(self.config.launch_instance(self.deployment_id))
            .await?;
        self.recorder
            .created(ResourceKind::Ec2Instance, &instance_id)
            .await;

        println!("EC2 instance {instance_id} launched successfully.");
        Ok(instance_id)
    }

    /// Create the load balancer and target group, then register the
    /// instance. Returns `(lb_arn, tg_arn)`.
    pub async fn create_load_balancer(&self, instance_id: &str) -> Result<(String, String)> {
        let lb_arn = self
            .ops
            .create_load_balancer(self.config.load_balancer())
            .await?;
        self.recorder.created(ResourceKind::LoadBalancer, &lb_arn).await;
        println!("Load balancer created with ARN: {lb_arn}");

        let tg_arn = self
            .ops
            .create_target_group(self.config.target_group())
            .await?;
        self.recorder.created(ResourceKind::TargetGroup, &tg_arn).await;

        self.ops.register_target(&tg_arn, instance_id).await?;
        println!("EC2 instance {instance_id} registered with target group {tg_arn}.");

        Ok((lb_arn, tg_arn))
    }

    /// Create the auto-scaling group from the instance and attach the
    /// scale-out policy. The policy is not bound to an alarm.
    pub async fn configure_auto_scaling(&self, instance_id: &str, tg_arn: &str) -> Result<()> {
        self.ops
            .create_auto_scaling_group(self.config.auto_scaling_group(instance_id, tg_arn))
            .await?;
        self.recorder
            .created(ResourceKind::AutoScalingGroup, &self.config.scaling.asg_name)
            .await;
        println!("Auto Scaling Group created and linked to target group.");

        let policy_arn = self
            .ops
            .put_scale_out_policy(self.config.scale_out_policy())
            .await?;
        info!(policy_arn = %policy_arn, "Scale-out policy attached");
        println!("Scaling policy for scale-out configured.");

        Ok(())
    }

    /// Create the alert topic and subscribe the alert address. Returns the
    /// topic ARN.
    pub async fn create_notification_topic(&self) -> Result<String> {
        let notification = &self.config.notification;

        let topic_arn = self.ops.create_topic(&notification.topic_name).await?;
        self.recorder.created(ResourceKind::SnsTopic, &topic_arn).await;

        self.ops
            .subscribe(&topic_arn, ALERT_PROTOCOL, &notification.alert_email)
            .await?;
        println!("SNS Topic {topic_arn} created and subscription added.");

        Ok(topic_arn)
    }

    async fn run_steps(&self) -> Result<DeployOutputs> {
        self.create_storage().await?;
        let instance_id = self.launch_compute().await?;
        let (load_balancer_arn, target_group_arn) =
            self.create_load_balancer(&instance_id).await?;
        self.configure_auto_scaling(&instance_id, &target_group_arn)
            .await?;
        let topic_arn = self.create_notification_topic().await?;

        Ok(DeployOutputs {
            load_balancer_arn,
            target_group_arn,
            instance_ids: vec![instance_id],
            topic_arn,
        })
    }

    /// Run every step in order. The first failure stops the sequence and
    /// leaves already-created resources in place.
    pub async fn run(&self) -> Result<DeployOutputs> {
        info!(
            deployment_id = %self.deployment_id,
            region = %self.config.region(),
            "Starting deployment"
        );
        self.recorder.begin(self.config).await?;

        match self.run_steps().await {
            Ok(outputs) => {
                self.recorder.finish(DeploymentStatus::Deployed).await;
                info!(deployment_id = %self.deployment_id, "Deployment complete");
                Ok(outputs)
            }
            Err(e) => {
                self.recorder.finish(DeploymentStatus::Failed).await;
                error!(deployment_id = %self.deployment_id, error = ?e, "Deployment failed");
                Err(e)
            }
        }
    }
}

/// Deploy the full stack described by `config`
pub async fn deploy<O: StackOperations>(
    ops: &O,
    config: &StackConfig,
    deployment_id: &str,
    recorder: &StateRecorder,
) -> Result<DeployOutputs> {
    Deployer::new(ops, config, deployment_id, recorder).run().await
}
