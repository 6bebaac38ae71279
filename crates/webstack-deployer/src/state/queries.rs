//! Query operations for the state database

use super::db::DbPool;
use super::types::{Deployment, Resource};
use anyhow::Result;

const RESOURCE_COLUMNS: &str =
    "id, deployment_id, account_id, resource_type, resource_id, region, created_at, deleted_at";

/// Undeleted resources of one deployment, oldest first
pub async fn get_deployment_resources(pool: &DbPool, deployment_id: &str) -> Result<Vec<Resource>> {
    let rows = sqlx::query(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources
         WHERE deployment_id = ? AND deleted_at IS NULL ORDER BY id"
    ))
    .bind(deployment_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Resource::from_row).collect()
}

pub async fn get_undeleted_resources(pool: &DbPool) -> Result<Vec<Resource>> {
    let rows = sqlx::query(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE deleted_at IS NULL ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(Resource::from_row).collect()
}

pub async fn get_deployment(pool: &DbPool, deployment_id: &str) -> Result<Option<Deployment>> {
    let row = sqlx::query(
        "SELECT deployment_id, account_id, created_at, status, region, config
         FROM deployments WHERE deployment_id = ?",
    )
    .bind(deployment_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Deployment::from_row).transpose()
}

/// All deployments, newest first
pub async fn list_deployments(pool: &DbPool) -> Result<Vec<Deployment>> {
    let rows = sqlx::query(
        "SELECT deployment_id, account_id, created_at, status, region, config
         FROM deployments ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(Deployment::from_row).collect()
}
