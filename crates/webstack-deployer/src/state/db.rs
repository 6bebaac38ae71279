//! Database setup and schema management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub type DbPool = SqlitePool;

fn get_db_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", "webstack").context("Failed to get project directories")?;

    let state_dir = proj_dirs.data_local_dir();
    fs::create_dir_all(state_dir).context("Failed to create state directory")?;

    Ok(state_dir.join("state.db"))
}

/// Open the state database, creating it if needed
pub async fn open_db() -> Result<DbPool> {
    let path = get_db_path()?;
    let db_url = format!("sqlite://{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open state database at {}", path.display()))?;

    setup_schema(&pool).await?;

    Ok(pool)
}

async fn setup_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deployments (
            deployment_id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            status TEXT NOT NULL,
            region TEXT NOT NULL,
            config TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Bucket, ASG and LB names are caller-chosen and may recur across
    // deployments, so uniqueness is per deployment.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY,
            deployment_id TEXT NOT NULL REFERENCES deployments(deployment_id),
            account_id TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            resource_id TEXT NOT NULL,
            region TEXT NOT NULL,
            created_at TEXT NOT NULL,
            deleted_at TEXT,
            UNIQUE(deployment_id, resource_type, resource_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_resources_deployment ON resources(deployment_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resources_type ON resources(resource_type)")
        .execute(pool)
        .await?;

    Ok(())
}

/// In-memory database with the schema applied
#[cfg(test)]
pub(crate) async fn open_test_db() -> Result<DbPool> {
    let pool = webstack_test_utils::open_test_db().await?;
    setup_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creates_both_tables() {
        let pool = open_test_db().await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
             AND name IN ('deployments', 'resources')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn schema_setup_is_repeatable() {
        let pool = open_test_db().await.unwrap();
        setup_schema(&pool).await.unwrap();
    }
}
