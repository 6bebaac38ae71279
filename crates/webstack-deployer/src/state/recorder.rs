//! Per-invocation handle on the state database
//!
//! The sequencer reports every created and deleted resource here. A detached
//! recorder (`--no-state`) accepts the same calls and writes nothing.

use super::crud::{insert_deployment, insert_resource, mark_resource_deleted, update_deployment_status};
use super::db::DbPool;
use super::types::DeploymentStatus;
use crate::aws::AccountId;
use crate::config::StackConfig;
use anyhow::{Context, Result};
use tracing::{debug, warn};
use webstack_common::ResourceKind;

pub struct StateRecorder {
    pool: Option<DbPool>,
    deployment_id: Option<String>,
    account_id: Option<AccountId>,
    region: String,
}

impl StateRecorder {
    /// Recorder that performs no writes
    pub fn detached() -> Self {
        Self {
            pool: None,
            deployment_id: None,
            account_id: None,
            region: String::new(),
        }
    }

    /// Recorder for a new deployment
    pub fn for_deployment(
        pool: DbPool,
        deployment_id: impl Into<String>,
        account_id: AccountId,
        region: impl Into<String>,
    ) -> Self {
        Self {
            pool: Some(pool),
            deployment_id: Some(deployment_id.into()),
            account_id: Some(account_id),
            region: region.into(),
        }
    }

    /// Recorder for a teardown. Without a deployment id only resource rows
    /// are updated.
    pub fn for_teardown(pool: DbPool, deployment_id: Option<String>) -> Self {
        Self {
            pool: Some(pool),
            deployment_id,
            account_id: None,
            region: String::new(),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.pool.is_none()
    }

    pub fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }

    /// Insert the deployment row. Fails the deploy before any resource
    /// exists if the database is unusable.
    pub async fn begin(&self, config: &StackConfig) -> Result<()> {
        let (Some(pool), Some(deployment_id), Some(account_id)) =
            (&self.pool, &self.deployment_id, &self.account_id)
        else {
            return Ok(());
        };

        let config_json = serde_json::to_string(config)?;
        insert_deployment(pool, deployment_id, account_id, &self.region, &config_json)
            .await
            .with_context(|| format!("Failed to record deployment {deployment_id}"))
    }

    /// Record a resource the provider just created. Failures are logged; the
    /// resource exists either way.
    pub async fn created(&self, kind: ResourceKind, resource_id: &str) {
        let (Some(pool), Some(deployment_id), Some(account_id)) =
            (&self.pool, &self.deployment_id, &self.account_id)
        else {
            return;
        };

        match insert_resource(pool, deployment_id, account_id, kind, resource_id, &self.region).await
        {
            Ok(()) => debug!(kind = %kind, id = %resource_id, "Recorded resource"),
            Err(e) => warn!(kind = %kind, id = %resource_id, error = ?e, "Failed to record resource"),
        }
    }

    pub async fn deleted(&self, kind: ResourceKind, resource_id: &str) {
        let Some(pool) = &self.pool else {
            return;
        };

        match mark_resource_deleted(pool, kind, resource_id).await {
            Ok(0) => debug!(kind = %kind, id = %resource_id, "Resource was not tracked"),
            Ok(_) => debug!(kind = %kind, id = %resource_id, "Marked resource deleted"),
            Err(e) => {
                warn!(kind = %kind, id = %resource_id, error = ?e, "Failed to mark resource deleted")
            }
        }
    }

    pub async fn finish(&self, status: DeploymentStatus) {
        let (Some(pool), Some(deployment_id)) = (&self.pool, &self.deployment_id) else {
            return;
        };

        if let Err(e) = update_deployment_status(pool, deployment_id, status).await {
            warn!(deployment_id = %deployment_id, status = %status, error = ?e, "Failed to update deployment status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::db::open_test_db;
    use crate::state::queries::{get_deployment, get_deployment_resources};

    #[tokio::test]
    async fn deployment_lifecycle_is_recorded() {
        let pool = open_test_db().await.unwrap();
        let recorder = StateRecorder::for_deployment(
            pool.clone(),
            "dep-rec",
            AccountId::new("123456789012"),
            "us-east-1",
        );

        recorder.begin(&StackConfig::default()).await.unwrap();
        recorder.created(ResourceKind::S3Bucket, "bucket").await;
        recorder.created(ResourceKind::Ec2Instance, "i-1234").await;
        recorder.finish(DeploymentStatus::Deployed).await;

        let deployment = get_deployment(&pool, "dep-rec").await.unwrap().unwrap();
        assert_eq!(deployment.status, DeploymentStatus::Deployed);
        let config: StackConfig = serde_json::from_str(&deployment.config).unwrap();
        assert_eq!(config, StackConfig::default());

        let resources = get_deployment_resources(&pool, "dep-rec").await.unwrap();
        assert_eq!(resources.len(), 2);
    }

    #[tokio::test]
    async fn teardown_recorder_marks_deleted() {
        let pool = open_test_db().await.unwrap();
        let deploy = StateRecorder::for_deployment(
            pool.clone(),
            "dep-td",
            AccountId::new("123456789012"),
            "us-east-1",
        );
        deploy.begin(&StackConfig::default()).await.unwrap();
        deploy.created(ResourceKind::SnsTopic, "arn:topic:1").await;

        let teardown = StateRecorder::for_teardown(pool.clone(), Some("dep-td".to_string()));
        teardown.created(ResourceKind::S3Bucket, "ignored").await;
        teardown.deleted(ResourceKind::SnsTopic, "arn:topic:1").await;
        teardown.finish(DeploymentStatus::TornDown).await;

        assert!(get_deployment_resources(&pool, "dep-td").await.unwrap().is_empty());
        let deployment = get_deployment(&pool, "dep-td").await.unwrap().unwrap();
        assert_eq!(deployment.status, DeploymentStatus::TornDown);
    }

    #[tokio::test]
    async fn detached_recorder_is_inert() {
        let recorder = StateRecorder::detached();
        assert!(recorder.is_detached());
        assert!(recorder.deployment_id().is_none());

        recorder.begin(&StackConfig::default()).await.unwrap();
        recorder.created(ResourceKind::S3Bucket, "bucket").await;
        recorder.deleted(ResourceKind::S3Bucket, "bucket").await;
        recorder.finish(DeploymentStatus::Deployed).await;
    }
}
