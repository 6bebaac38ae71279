//! SNS integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_sns_integration -- --ignored
//! ```

use webstack_deployer::aws::{AwsContext, FromAwsContext, SnsClient};
use webstack_test_utils::{get_test_region, test_deployment_id};

/// Topic with a pending e-mail subscription can be torn down: the pending
/// subscription is not listed and deleting the topic removes it.
#[tokio::test]
#[ignore]
async fn test_topic_lifecycle() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let client = SnsClient::from_context(&ctx);
    let topic_name = format!("webstack-{}", test_deployment_id());

    let topic_arn = client
        .create_topic(&topic_name)
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");

    client
        .subscribe(&topic_arn, "email", "webstack-test@example.com")
        .await
        .expect("Should subscribe");

    let subscriptions = client
        .list_subscriptions(&topic_arn)
        .await
        .expect("Should list subscriptions");
    assert!(subscriptions.is_empty(), "Pending subscriptions are not listed");

    client
        .delete_topic(&topic_arn)
        .await
        .expect("Should delete topic");
}

/// Creating a topic twice returns the same ARN
#[tokio::test]
#[ignore]
async fn test_create_topic_is_idempotent() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let client = SnsClient::from_context(&ctx);
    let topic_name = format!("webstack-{}", test_deployment_id());

    let first = client.create_topic(&topic_name).await.expect("AWS credentials required");
    let second = client.create_topic(&topic_name).await.expect("Should create topic");
    assert_eq!(first, second);

    client.delete_topic(&first).await.expect("Should delete topic");
}
