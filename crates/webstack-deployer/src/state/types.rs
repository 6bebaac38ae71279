//! State row types

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::fmt;
use webstack_common::ResourceKind;

/// Lifecycle of a deployment record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Deploying,
    Deployed,
    Failed,
    TornDown,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
            DeploymentStatus::TornDown => "torn-down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deploying" => Some(DeploymentStatus::Deploying),
            "deployed" => Some(DeploymentStatus::Deployed),
            "failed" => Some(DeploymentStatus::Failed),
            "torn-down" => Some(DeploymentStatus::TornDown),
            _ => None,
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked resource
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: i64,
    pub deployment_id: String,
    pub account_id: String,
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A deployment row. `config` is the JSON-serialized stack configuration.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub deployment_id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub status: DeploymentStatus,
    pub region: String,
    pub config: String,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp: {s}"))?
        .with_timezone(&Utc))
}

impl Resource {
    pub(super) fn from_row(row: &SqliteRow) -> Result<Self> {
        let kind: String = row.get("resource_type");
        let created_at: String = row.get("created_at");
        let deleted_at: Option<String> = row.get("deleted_at");

        Ok(Self {
            id: row.get("id"),
            deployment_id: row.get("deployment_id"),
            account_id: row.get("account_id"),
            resource_type: ResourceKind::parse(&kind)
                .with_context(|| format!("Unknown resource type: {kind}"))?,
            resource_id: row.get("resource_id"),
            region: row.get("region"),
            created_at: parse_timestamp(&created_at)?,
            deleted_at: deleted_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

impl Deployment {
    pub(super) fn from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");

        Ok(Self {
            deployment_id: row.get("deployment_id"),
            account_id: row.get("account_id"),
            created_at: parse_timestamp(&created_at)?,
            status: DeploymentStatus::parse(&status)
                .with_context(|| format!("Unknown deployment status: {status}"))?,
            region: row.get("region"),
            config: row.get("config"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            DeploymentStatus::Deploying,
            DeploymentStatus::Deployed,
            DeploymentStatus::Failed,
            DeploymentStatus::TornDown,
        ] {
            assert_eq!(DeploymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DeploymentStatus::TornDown.to_string(), "torn-down");
        assert_eq!(DeploymentStatus::parse("running"), None);
    }
}
