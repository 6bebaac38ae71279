//! CRUD operations for the state database

use super::db::DbPool;
use super::types::DeploymentStatus;
use crate::aws::AccountId;
use anyhow::Result;
use chrono::Utc;
use webstack_common::ResourceKind;

/// Insert a new deployment in `deploying` state
pub async fn insert_deployment(
    pool: &DbPool,
    deployment_id: &str,
    account_id: &AccountId,
    region: &str,
    config: &str,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO deployments (deployment_id, account_id, created_at, status, region, config)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(deployment_id)
    .bind(account_id.as_str())
    .bind(&now)
    .bind(DeploymentStatus::Deploying.as_str())
    .bind(region)
    .bind(config)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_resource(
    pool: &DbPool,
    deployment_id: &str,
    account_id: &AccountId,
    resource_type: ResourceKind,
    resource_id: &str,
    region: &str,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO resources (deployment_id, account_id, resource_type, resource_id, region, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(deployment_id)
    .bind(account_id.as_str())
    .bind(resource_type.as_str())
    .bind(resource_id)
    .bind(region)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark every live row for this resource as deleted, returning how many
/// rows changed
pub async fn mark_resource_deleted(
    pool: &DbPool,
    resource_type: ResourceKind,
    resource_id: &str,
) -> Result<u64> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "UPDATE resources SET deleted_at = ?
         WHERE resource_type = ? AND resource_id = ? AND deleted_at IS NULL",
    )
    .bind(&now)
    .bind(resource_type.as_str())
    .bind(resource_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn update_deployment_status(
    pool: &DbPool,
    deployment_id: &str,
    status: DeploymentStatus,
) -> Result<()> {
    sqlx::query("UPDATE deployments SET status = ? WHERE deployment_id = ?")
        .bind(status.as_str())
        .bind(deployment_id)
        .execute(pool)
        .await?;

    Ok(())
}
