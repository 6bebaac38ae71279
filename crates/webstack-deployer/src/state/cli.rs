//! `webstack state` subcommands

use super::db::DbPool;
use super::queries::{get_undeleted_resources, list_deployments};
use super::types::{Deployment, Resource};
use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(Cell::new));
    table
}

fn resources_table(resources: &[Resource]) -> Table {
    let mut table = new_table(&["Deployment", "Type", "ID", "Region", "Account", "Created"]);
    for resource in resources {
        table.add_row(vec![
            Cell::new(&resource.deployment_id),
            Cell::new(resource.resource_type.as_str()),
            Cell::new(&resource.resource_id),
            Cell::new(&resource.region),
            Cell::new(&resource.account_id),
            Cell::new(resource.created_at.format(TIMESTAMP_FORMAT).to_string()),
        ]);
    }
    table
}

fn deployments_table(deployments: &[Deployment]) -> Table {
    let mut table = new_table(&["Deployment", "Status", "Region", "Account", "Created"]);
    for deployment in deployments {
        table.add_row(vec![
            Cell::new(&deployment.deployment_id),
            Cell::new(deployment.status.as_str()),
            Cell::new(&deployment.region),
            Cell::new(&deployment.account_id),
            Cell::new(deployment.created_at.format(TIMESTAMP_FORMAT).to_string()),
        ]);
    }
    table
}

/// List all tracked, undeleted resources
pub async fn list_resources(pool: &DbPool) -> Result<()> {
    let resources = get_undeleted_resources(pool).await?;

    if resources.is_empty() {
        println!("No tracked resources");
        return Ok(());
    }

    println!("{}", resources_table(&resources));
    Ok(())
}

pub async fn list_deployments_table(pool: &DbPool) -> Result<()> {
    let deployments = list_deployments(pool).await?;

    if deployments.is_empty() {
        println!("No recorded deployments");
        return Ok(());
    }

    println!("{}", deployments_table(&deployments));
    Ok(())
}

/// Remove deleted resources and torn-down deployments older than 30 days.
/// Returns `(resources, deployments)` removed.
pub async fn prune_database(pool: &DbPool) -> Result<(u64, u64)> {
    let resources = sqlx::query(
        "DELETE FROM resources
         WHERE deleted_at IS NOT NULL
         AND datetime(deleted_at) < datetime('now', '-30 days')",
    )
    .execute(pool)
    .await?
    .rows_affected();

    println!("Pruned {resources} old resource records");

    let deployments = sqlx::query(
        "DELETE FROM deployments
         WHERE status = 'torn-down'
         AND datetime(created_at) < datetime('now', '-30 days')
         AND NOT EXISTS (
             SELECT 1 FROM resources WHERE resources.deployment_id = deployments.deployment_id
         )",
    )
    .execute(pool)
    .await?
    .rows_affected();

    println!("Pruned {deployments} old deployment records");

    Ok((resources, deployments))
}
