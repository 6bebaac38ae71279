//! AWS test utilities
//!
//! Region detection and unique names for AWS integration tests.

use chrono::Utc;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-2
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-2".to_string())
}

/// Generate a unique deployment ID for test resources.
///
/// Format: `test-{timestamp_ms}-{counter}`, unique even when tests start
/// in the same millisecond.
///
/// # Example
///
/// ```
/// use webstack_test_utils::aws::test_deployment_id;
///
/// let id = test_deployment_id();
/// assert!(id.starts_with("test-"));
/// ```
pub fn test_deployment_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{}-{}", ts, counter)
}

/// Generate a unique, lowercase bucket name for test resources.
///
/// # Example
///
/// ```
/// use webstack_test_utils::aws::test_bucket_name;
///
/// let bucket = test_bucket_name();
/// assert!(bucket.starts_with("webstack-test-"));
/// ```
pub fn test_bucket_name() -> String {
    format!("webstack-{}", test_deployment_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_id_format() {
        let id = test_deployment_id();
        let parts: Vec<&str> = id.strip_prefix("test-").unwrap().split('-').collect();
        assert_eq!(parts.len(), 2);
        parts[0].parse::<i64>().expect("Should be valid timestamp");
        parts[1].parse::<u32>().expect("Should be valid counter");
    }

    #[test]
    fn test_deployment_id_unique() {
        let id1 = test_deployment_id();
        let id2 = test_deployment_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_bucket_name_is_valid_s3_name() {
        let bucket = test_bucket_name();
        assert!(bucket.len() <= 63);
        assert!(
            bucket
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }
}
