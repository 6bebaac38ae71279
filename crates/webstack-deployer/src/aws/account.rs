//! AWS account identity

use super::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account ID, e.g. one read back from the state database.
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fetch the current AWS account ID via STS GetCallerIdentity.
///
/// Needs no permissions, so it doubles as a credential check before any
/// resource is created.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let identity = ctx
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId(account.to_string()))
}
