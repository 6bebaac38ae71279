//! AWS resource tag constants for webstack
//!
//! Resources that accept tags at creation time are tagged so a deployment can
//! be found from the AWS console even without the local state database.
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `webstack:tool` | Static identifier ("webstack") |
//! | `webstack:deployment-id` | Deployment identifier (UUID) |
//! | `webstack:created-at` | RFC 3339 creation timestamp |
//! | `Name` | Console display name (EC2 only) |

/// Tag key for tool identification
pub const TAG_TOOL: &str = "webstack:tool";

/// Tag value for tool identification
pub const TAG_TOOL_VALUE: &str = "webstack";

/// Tag key for the deployment a resource belongs to
pub const TAG_DEPLOYMENT_ID: &str = "webstack:deployment-id";

/// Tag key for creation timestamp (RFC 3339 format)
pub const TAG_CREATED_AT: &str = "webstack:created-at";

/// Tag key shown as the resource name in the EC2 console
pub const TAG_NAME: &str = "Name";

/// Helper to format creation timestamp for tags
pub fn format_created_at(time: chrono::DateTime<chrono::Utc>) -> String {
    time.to_rfc3339()
}

/// Standard key/value pairs for a deployment, in tag order.
pub fn standard_tags(deployment_id: &str) -> Vec<(&'static str, String)> {
    vec![
        (TAG_TOOL, TAG_TOOL_VALUE.to_string()),
        (TAG_DEPLOYMENT_ID, deployment_id.to_string()),
        (TAG_CREATED_AT, format_created_at(chrono::Utc::now())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_created_at_is_rfc3339() {
        let now = Utc::now();
        let parsed = DateTime::parse_from_rfc3339(&format_created_at(now)).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), now);
    }

    #[test]
    fn test_standard_tags_carry_deployment() {
        let tags = standard_tags("dep-42");
        let keys: Vec<&str> = tags.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![TAG_TOOL, TAG_DEPLOYMENT_ID, TAG_CREATED_AT]);
        assert_eq!(tags[1].1, "dep-42");
        assert!(DateTime::parse_from_rfc3339(&tags[2].1).is_ok());
    }
}
