//! S3 bucket management

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::tags;
use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::{debug, info};

/// S3 client for the stack's asset bucket
pub struct S3Client {
    client: Client,
    region: String,
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
            region: ctx.region().to_string(),
        }
    }
}

impl S3Client {
    /// Create a bucket and tag it with the deployment.
    ///
    /// No existence check: a taken name surfaces as the provider's error.
    pub async fn create_bucket(&self, bucket_name: &str, deployment_id: &str) -> Result<()> {
        info!(bucket = %bucket_name, region = %self.region, "Creating S3 bucket");

        let mut request = self.client.create_bucket().bucket(bucket_name);

        // us-east-1 rejects an explicit location constraint
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to create bucket {bucket_name}"))?;

        self.client
            .put_bucket_tagging()
            .bucket(bucket_name)
            .tagging(tags::s3_tagging(deployment_id)?)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to tag bucket {bucket_name}"))?;

        Ok(())
    }

    /// Delete every object in a bucket, returning how many were removed.
    pub async fn empty_bucket(&self, bucket: &str) -> Result<usize> {
        info!(bucket = %bucket, "Emptying bucket");

        let mut deleted = 0;
        let mut continuation_token = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(AwsError::from_sdk)
                .with_context(|| format!("Failed to list objects in {bucket}"))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    debug!(key = %key, "Deleting object");
                    self.client
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .send()
                        .await
                        .map_err(AwsError::from_sdk)
                        .with_context(|| format!("Failed to delete object {key}"))?;
                    deleted += 1;
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(deleted)
    }

    /// Delete an empty bucket
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        info!(bucket = %bucket, "Deleting bucket");

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to delete bucket {bucket}"))?;

        Ok(())
    }

    /// Upload bytes to the bucket
    pub async fn upload_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        debug!(bucket = %bucket, key = %key, size = data.len(), "Uploading bytes");

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(AwsError::from_sdk)
            .with_context(|| format!("Failed to upload {key}"))?;

        Ok(())
    }
}
