//! SQLite deployment record
//!
//! Every resource a deployment creates is recorded under its deployment id,
//! so a later `teardown --deployment-id` can recover the identifiers.

mod cli;
mod crud;
mod db;
mod queries;
mod recorder;
mod types;

pub use db::{DbPool, open_db};
pub use types::{Deployment, DeploymentStatus, Resource};

pub use crud::{insert_deployment, insert_resource, mark_resource_deleted, update_deployment_status};

pub use queries::{get_deployment, get_deployment_resources, get_undeleted_resources, list_deployments};

pub use cli::{list_deployments_table, list_resources, prune_database};

pub use recorder::StateRecorder;

#[cfg(test)]
pub(crate) use db::open_test_db;
