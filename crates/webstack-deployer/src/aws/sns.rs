//! SNS topic and subscription management

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use anyhow::{Context, Result};
use aws_sdk_sns::Client;
use tracing::{debug, info};

/// Placeholder ARN SNS reports for subscriptions awaiting confirmation
const PENDING_CONFIRMATION: &str = "PendingConfirmation";

/// SNS client for the alert topic
pub struct SnsClient {
    client: Client,
}

impl FromAwsContext for SnsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.sns_client(),
        }
    }
}

impl SnsClient {
    /// Create a topic (idempotent on the SNS side), returning its ARN
    pub async fn create_topic(&self, name: &str) -> Result<String> {
        info!(name = %name, "Creating SNS topic");

        let response = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to create topic {name}"))?;

        let arn = response
            .topic_arn()
            .context("No topic ARN returned")?
            .to_string();

        info!(arn = %arn, "SNS topic created");
        Ok(arn)
    }

    /// Subscribe an endpoint. E-mail subscriptions stay pending until the
    /// recipient confirms.
    pub async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str) -> Result<()> {
        info!(topic = %topic_arn, protocol = %protocol, endpoint = %endpoint, "Subscribing");

        let response = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to subscribe {endpoint} to {topic_arn}"))?;

        debug!(subscription = ?response.subscription_arn(), "Subscription created");
        Ok(())
    }

    /// List the ARNs of confirmed subscriptions on a topic
    pub async fn list_subscriptions(&self, topic_arn: &str) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_subscriptions_by_topic()
                .topic_arn(topic_arn)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(AwsError::from_sdk)
                .with_context(|| format!("Failed to list subscriptions of {topic_arn}"))?;

            arns.extend(confirmed_arns(
                response
                    .subscriptions()
                    .iter()
                    .filter_map(|s| s.subscription_arn()),
            ));

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(topic = %topic_arn, count = arns.len(), "Listed subscriptions");
        Ok(arns)
    }

    pub async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        info!(subscription = %subscription_arn, "Unsubscribing");

        self.client
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to unsubscribe {subscription_arn}"))?;

        Ok(())
    }

    pub async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        info!(topic = %topic_arn, "Deleting SNS topic");

        self.client
            .delete_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to delete topic {topic_arn}"))?;

        Ok(())
    }
}

/// Drop subscriptions still awaiting confirmation; they cannot be unsubscribed.
fn confirmed_arns<'a>(arns: impl IntoIterator<Item = &'a str>) -> impl Iterator<Item = String> {
    arns.into_iter()
        .filter(|arn| *arn != PENDING_CONFIRMATION)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_subscriptions_are_skipped() {
        let arns: Vec<String> = confirmed_arns([
            "arn:aws:sns:us-east-1:123456789012:infra-alerts:1",
            PENDING_CONFIRMATION,
            "arn:aws:sns:us-east-1:123456789012:infra-alerts:2",
        ])
        .collect();

        assert_eq!(
            arns,
            vec![
                "arn:aws:sns:us-east-1:123456789012:infra-alerts:1",
                "arn:aws:sns:us-east-1:123456789012:infra-alerts:2",
            ]
        );
    }
}
