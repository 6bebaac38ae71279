//! Provider operations used by the sequencer
//!
//! One method per provider call the deploy and teardown sequences make, so
//! sequencing and identifier propagation can be tested without AWS.

use super::autoscaling::AutoScalingClient;
use super::context::{AwsContext, FromAwsContext};
use super::ec2::Ec2Client;
use super::elb::ElbClient;
use super::s3::S3Client;
use super::sns::SnsClient;
use super::types::{
    AutoScalingGroupConfig, LaunchInstanceConfig, LoadBalancerConfig, ScalingPolicyConfig,
    TargetGroupConfig,
};
use anyhow::Result;
use std::future::Future;

/// Trait for the stack's provider operations, mockable in tests.
///
/// Config parameters are taken by value to work around mockall lifetime
/// limitations.
#[cfg_attr(test, mockall::automock)]
pub trait StackOperations: Send + Sync {
    /// Create a bucket, tagged with the deployment
    fn create_bucket(
        &self,
        bucket_name: &str,
        deployment_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Launch one instance, returning its ID
    fn launch_instance(
        &self,
        config: LaunchInstanceConfig,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Create a load balancer, returning its ARN
    fn create_load_balancer(
        &self,
        config: LoadBalancerConfig,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Create a target group, returning its ARN
    fn create_target_group(
        &self,
        config: TargetGroupConfig,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Register an instance with a target group
    fn register_target(
        &self,
        target_group_arn: &str,
        instance_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Create an Auto Scaling group
    fn create_auto_scaling_group(
        &self,
        config: AutoScalingGroupConfig,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Attach a scale-out policy, returning its ARN
    fn put_scale_out_policy(
        &self,
        config: ScalingPolicyConfig,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Create a notification topic, returning its ARN
    fn create_topic(&self, name: &str) -> impl Future<Output = Result<String>> + Send;

    /// Subscribe an endpoint to a topic
    fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Force-delete an Auto Scaling group
    fn delete_auto_scaling_group(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete_load_balancer(&self, arn: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete_target_group(&self, arn: &str) -> impl Future<Output = Result<()>> + Send;

    /// Terminate instances
    fn terminate_instances(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Block until the instances are terminated
    fn wait_for_terminated(
        &self,
        instance_ids: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete every object in a bucket, returning the count
    fn empty_bucket(&self, bucket_name: &str) -> impl Future<Output = Result<usize>> + Send;

    fn delete_bucket(&self, bucket_name: &str) -> impl Future<Output = Result<()>> + Send;

    /// List subscription ARNs of a topic
    fn list_subscriptions(
        &self,
        topic_arn: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn unsubscribe(&self, subscription_arn: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete_topic(&self, topic_arn: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Real AWS implementation of [`StackOperations`]
pub struct AwsStack {
    pub s3: S3Client,
    pub ec2: Ec2Client,
    pub elb: ElbClient,
    pub autoscaling: AutoScalingClient,
    pub sns: SnsClient,
}

impl FromAwsContext for AwsStack {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            s3: S3Client::from_context(ctx),
            ec2: Ec2Client::from_context(ctx),
            elb: ElbClient::from_context(ctx),
            autoscaling: AutoScalingClient::from_context(ctx),
            sns: SnsClient::from_context(ctx),
        }
    }
}

impl StackOperations for AwsStack {
    async fn create_bucket(&self, bucket_name: &str, deployment_id: &str) -> Result<()> {
        self.s3.create_bucket(bucket_name, deployment_id).await
    }

    async fn launch_instance(&self, config: LaunchInstanceConfig) -> Result<String> {
        self.ec2.launch_instance(&config).await
    }

    async fn create_load_balancer(&self, config: LoadBalancerConfig) -> Result<String> {
        self.elb.create_load_balancer(&config).await
    }

    async fn create_target_group(&self, config: TargetGroupConfig) -> Result<String> {
        self.elb.create_target_group(&config).await
    }

    async fn register_target(&self, target_group_arn: &str, instance_id: &str) -> Result<()> {
        self.elb.register_target(target_group_arn, instance_id).await
    }

    async fn create_auto_scaling_group(&self, config: AutoScalingGroupConfig) -> Result<()> {
        self.autoscaling.create_auto_scaling_group(&config).await
    }

    async fn put_scale_out_policy(&self, config: ScalingPolicyConfig) -> Result<String> {
        self.autoscaling.put_scale_out_policy(&config).await
    }

    async fn create_topic(&self, name: &str) -> Result<String> {
        self.sns.create_topic(name).await
    }

    async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str) -> Result<()> {
        self.sns.subscribe(topic_arn, protocol, endpoint).await
    }

    async fn delete_auto_scaling_group(&self, name: &str) -> Result<()> {
        self.autoscaling.delete_auto_scaling_group(name).await
    }

    async fn delete_load_balancer(&self, arn: &str) -> Result<()> {
        self.elb.delete_load_balancer(arn).await
    }

    async fn delete_target_group(&self, arn: &str) -> Result<()> {
        self.elb.delete_target_group(arn).await
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.ec2.terminate_instances(instance_ids).await
    }

    async fn wait_for_terminated(&self, instance_ids: &[String]) -> Result<()> {
        self.ec2.wait_for_terminated(instance_ids).await
    }

    async fn empty_bucket(&self, bucket_name: &str) -> Result<usize> {
        self.s3.empty_bucket(bucket_name).await
    }

    async fn delete_bucket(&self, bucket_name: &str) -> Result<()> {
        self.s3.delete_bucket(bucket_name).await
    }

    async fn list_subscriptions(&self, topic_arn: &str) -> Result<Vec<String>> {
        self.sns.list_subscriptions(topic_arn).await
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        self.sns.unsubscribe(subscription_arn).await
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        self.sns.delete_topic(topic_arn).await
    }
}

/// Return values for `MockStackOperations` expectations
#[cfg(test)]
pub mod mock_support {
    use anyhow::Result;
    use std::future::{Future, ready};
    use std::pin::Pin;

    pub type MockFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

    pub fn mock_ok<T: Send + 'static>(value: T) -> MockFuture<T> {
        Box::pin(ready(Ok(value)))
    }

    pub fn mock_err<T: Send + 'static>(message: &'static str) -> MockFuture<T> {
        Box::pin(ready(Err(anyhow::anyhow!(message))))
    }
}
