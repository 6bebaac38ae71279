//! Teardown sequence

use super::types::TeardownTargets;
use crate::aws::StackOperations;
use crate::state::{DeploymentStatus, StateRecorder};
use anyhow::Result;
use tracing::{debug, info};
use webstack_common::ResourceKind;

/// Delete every resource named in `targets`, in dependency order:
///
/// 1. auto-scaling group (forced, takes its instances with it)
/// 2. load balancer
/// 3. target group
/// 4. instances, blocking until all report `terminated`
/// 5. bucket objects, then the bucket
/// 6. topic subscriptions, then the topic
///
/// There is no existence check and the first error aborts the remaining
/// steps. Absent targets are skipped.
pub async fn teardown<O: StackOperations>(
    ops: &O,
    targets: &TeardownTargets,
    recorder: &StateRecorder,
) -> Result<()> {
    info!(
        deployment_id = recorder.deployment_id().unwrap_or("-"),
        "Starting teardown"
    );

    if let Some(asg_name) = &targets.asg_name {
        ops.delete_auto_scaling_group(asg_name).await?;
        recorder
            .deleted(ResourceKind::AutoScalingGroup, asg_name)
            .await;
        println!("Auto Scaling Group {asg_name} deleted.");
    }

    if let Some(lb_arn) = &targets.load_balancer_arn {
        ops.delete_load_balancer(lb_arn).await?;
        recorder.deleted(ResourceKind::LoadBalancer, lb_arn).await;
        println!("Load Balancer {lb_arn} deleted.");
    }

    if let Some(tg_arn) = &targets.target_group_arn {
        ops.delete_target_group(tg_arn).await?;
        recorder.deleted(ResourceKind::TargetGroup, tg_arn).await;
        println!("Target Group {tg_arn} deleted.");
    }

    if !targets.instance_ids.is_empty() {
        let ids = &targets.instance_ids;
        ops.terminate_instances(ids).await?;
        println!("EC2 instances {ids:?} terminated.");

        ops.wait_for_terminated(ids).await?;
        for id in ids {
            recorder.deleted(ResourceKind::Ec2Instance, id).await;
        }
        println!("EC2 instances {ids:?} terminated and cleaned up.");
    }

    if let Some(bucket_name) = &targets.bucket_name {
        let deleted = ops.empty_bucket(bucket_name).await?;
        debug!(bucket = %bucket_name, objects = deleted, "Bucket emptied");
        println!("All objects in bucket {bucket_name} deleted.");

        ops.delete_bucket(bucket_name).await?;
        recorder.deleted(ResourceKind::S3Bucket, bucket_name).await;
        println!("S3 bucket {bucket_name} deleted.");
    }

    if let Some(topic_arn) = &targets.topic_arn {
        for subscription_arn in ops.list_subscriptions(topic_arn).await? {
            ops.unsubscribe(&subscription_arn).await?;
        }

        ops.delete_topic(topic_arn).await?;
        recorder.deleted(ResourceKind::SnsTopic, topic_arn).await;
        println!("SNS topic {topic_arn} deleted.");
    }

    recorder.finish(DeploymentStatus::TornDown).await;
    info!("Teardown complete");
    Ok(())
}
