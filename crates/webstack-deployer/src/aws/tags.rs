//! AWS tag builders
//!
//! Tag constants live in `webstack_common::tags`; this module turns them into
//! the SDK-specific tag types.

pub use webstack_common::tags::*;

/// Build an EC2 TagSpecification with the standard tags plus extra tags.
pub fn ec2_tag_spec(
    resource_type: aws_sdk_ec2::types::ResourceType,
    deployment_id: &str,
    extra_tags: &[(&str, &str)],
) -> aws_sdk_ec2::types::TagSpecification {
    use aws_sdk_ec2::types::{Tag, TagSpecification};

    let mut builder = TagSpecification::builder().resource_type(resource_type);
    for (k, v) in standard_tags(deployment_id) {
        builder = builder.tags(Tag::builder().key(k).value(v).build());
    }
    for (k, v) in extra_tags {
        builder = builder.tags(Tag::builder().key(*k).value(*v).build());
    }
    builder.build()
}

/// Build S3 bucket Tagging with the standard tags.
pub fn s3_tagging(deployment_id: &str) -> anyhow::Result<aws_sdk_s3::types::Tagging> {
    use aws_sdk_s3::types::{Tag, Tagging};

    let mut builder = Tagging::builder();
    for (k, v) in standard_tags(deployment_id) {
        builder = builder.tag_set(Tag::builder().key(k).value(v).build()?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::ResourceType;

    #[test]
    fn ec2_tag_spec_includes_extra_tags() {
        let spec = ec2_tag_spec(ResourceType::Instance, "dep-1", &[(TAG_NAME, "web")]);

        assert_eq!(spec.resource_type(), Some(&ResourceType::Instance));
        let tags = spec.tags();
        assert_eq!(tags.len(), 4);
        assert!(
            tags.iter()
                .any(|t| t.key() == Some(TAG_DEPLOYMENT_ID) && t.value() == Some("dep-1"))
        );
        assert!(
            tags.iter()
                .any(|t| t.key() == Some(TAG_NAME) && t.value() == Some("web"))
        );
    }

    #[test]
    fn s3_tagging_has_standard_tags() {
        let tagging = s3_tagging("dep-2").unwrap();
        let keys: Vec<&str> = tagging.tag_set().iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec![TAG_TOOL, TAG_DEPLOYMENT_ID, TAG_CREATED_AT]);
    }
}
