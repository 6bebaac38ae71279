//! Identifiers produced by a deploy and consumed by a teardown

use crate::config::StackConfig;
use crate::state::Resource;
use serde::{Deserialize, Serialize};
use webstack_common::ResourceKind;

/// Provider identifiers returned by a successful deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutputs {
    pub load_balancer_arn: String,
    pub target_group_arn: String,
    /// Always exactly the instance launched by the compute step
    pub instance_ids: Vec<String>,
    pub topic_arn: String,
}

impl DeployOutputs {
    /// `(lb_arn, tg_arn, [instance_id], topic_arn)`
    pub fn into_tuple(self) -> (String, String, Vec<String>, String) {
        (
            self.load_balancer_arn,
            self.target_group_arn,
            self.instance_ids,
            self.topic_arn,
        )
    }
}

/// Everything a teardown needs. A resource field left `None` (or an empty
/// instance list) skips the matching teardown step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownTargets {
    /// Region the stack was deployed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// State database deployment this record belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    pub asg_name: Option<String>,
    pub load_balancer_arn: Option<String>,
    pub target_group_arn: Option<String>,
    #[serde(default)]
    pub instance_ids: Vec<String>,
    pub bucket_name: Option<String>,
    pub topic_arn: Option<String>,
}

impl TeardownTargets {
    pub fn new(
        asg_name: impl Into<String>,
        load_balancer_arn: impl Into<String>,
        target_group_arn: impl Into<String>,
        instance_ids: Vec<String>,
        bucket_name: impl Into<String>,
        topic_arn: impl Into<String>,
    ) -> Self {
        Self {
            region: None,
            deployment_id: None,
            asg_name: Some(asg_name.into()),
            load_balancer_arn: Some(load_balancer_arn.into()),
            target_group_arn: Some(target_group_arn.into()),
            instance_ids,
            bucket_name: Some(bucket_name.into()),
            topic_arn: Some(topic_arn.into()),
        }
    }

    /// Targets for a completed deploy: region and caller-chosen names come
    /// from the config, provider identifiers from the outputs.
    pub fn from_deployment(
        config: &StackConfig,
        deployment_id: &str,
        outputs: &DeployOutputs,
    ) -> Self {
        Self {
            region: Some(config.region().to_string()),
            deployment_id: Some(deployment_id.to_string()),
            ..Self::new(
                &config.scaling.asg_name,
                &outputs.load_balancer_arn,
                &outputs.target_group_arn,
                outputs.instance_ids.clone(),
                &config.storage.bucket_name,
                &outputs.topic_arn,
            )
        }
    }

    /// Rebuild targets from a deployment's undeleted state rows
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut targets = Self::default();

        for resource in resources {
            let id = Some(resource.resource_id.clone());
            match resource.resource_type {
                ResourceKind::AutoScalingGroup => targets.asg_name = id,
                ResourceKind::LoadBalancer => targets.load_balancer_arn = id,
                ResourceKind::TargetGroup => targets.target_group_arn = id,
                ResourceKind::Ec2Instance => targets.instance_ids.push(resource.resource_id.clone()),
                ResourceKind::S3Bucket => targets.bucket_name = id,
                ResourceKind::SnsTopic => targets.topic_arn = id,
            }
        }

        targets
    }

    /// True when no teardown step has anything to delete
    pub fn is_empty(&self) -> bool {
        self.asg_name.is_none()
            && self.load_balancer_arn.is_none()
            && self.target_group_arn.is_none()
            && self.instance_ids.is_empty()
            && self.bucket_name.is_none()
            && self.topic_arn.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resource(kind: ResourceKind, id: &str) -> Resource {
        Resource {
            id: 0,
            deployment_id: "dep-1".to_string(),
            account_id: "123456789012".to_string(),
            resource_type: kind,
            resource_id: id.to_string(),
            region: "us-east-1".to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn outputs() -> DeployOutputs {
        DeployOutputs {
            load_balancer_arn: "arn:lb:1".to_string(),
            target_group_arn: "arn:tg:1".to_string(),
            instance_ids: vec!["i-1234".to_string()],
            topic_arn: "arn:topic:1".to_string(),
        }
    }

    #[test]
    fn outputs_convert_to_tuple() {
        assert_eq!(
            outputs().into_tuple(),
            (
                "arn:lb:1".to_string(),
                "arn:tg:1".to_string(),
                vec!["i-1234".to_string()],
                "arn:topic:1".to_string()
            )
        );
    }

    #[test]
    fn targets_from_deployment_fill_every_field() {
        let mut config = StackConfig::default();
        config.aws.region = "eu-west-1".to_string();
        let targets = TeardownTargets::from_deployment(&config, "dep-1", &outputs());

        assert_eq!(targets.region.as_deref(), Some("eu-west-1"));
        assert_eq!(targets.deployment_id.as_deref(), Some("dep-1"));

        assert_eq!(targets.asg_name.as_deref(), Some(config.scaling.asg_name.as_str()));
        assert_eq!(
            targets.bucket_name.as_deref(),
            Some(config.storage.bucket_name.as_str())
        );
        assert_eq!(targets.load_balancer_arn.as_deref(), Some("arn:lb:1"));
        assert_eq!(targets.instance_ids, vec!["i-1234"]);
        assert_eq!(targets.topic_arn.as_deref(), Some("arn:topic:1"));
    }

    #[test]
    fn targets_from_partial_resources() {
        let targets = TeardownTargets::from_resources(&[
            resource(ResourceKind::S3Bucket, "bucket"),
            resource(ResourceKind::Ec2Instance, "i-1"),
            resource(ResourceKind::Ec2Instance, "i-2"),
        ]);

        assert_eq!(targets.bucket_name.as_deref(), Some("bucket"));
        assert_eq!(targets.instance_ids, vec!["i-1", "i-2"]);
        assert!(targets.asg_name.is_none());
        assert!(targets.load_balancer_arn.is_none());
        assert!(targets.topic_arn.is_none());
    }

    #[test]
    fn targets_json_round_trip() {
        let targets =
            TeardownTargets::from_deployment(&StackConfig::default(), "dep-1", &outputs());
        let json = serde_json::to_string_pretty(&targets).unwrap();
        assert!(json.contains(r#""region": "us-east-1""#));
        let back: TeardownTargets = serde_json::from_str(&json).unwrap();
        assert_eq!(back, targets);
    }

    #[test]
    fn missing_instance_list_defaults_to_empty() {
        let targets: TeardownTargets = serde_json::from_str(r#"{"bucket_name":"b"}"#).unwrap();
        assert!(targets.instance_ids.is_empty());
        assert!(!targets.is_empty());
        assert!(TeardownTargets::default().is_empty());
    }

    #[test]
    fn record_without_resources_is_empty() {
        let targets = TeardownTargets {
            region: Some("eu-west-1".to_string()),
            deployment_id: Some("dep-1".to_string()),
            ..Default::default()
        };
        assert!(targets.is_empty());
    }
}
