pub mod tutum;

use std::path::Path;

use serde::Deserialize;

use crate::error::{DeployError, DeployResult};

/// The container platform the stacks are deployed to.
///
/// Every call blocks until the platform answers. Implementations
/// fail with [`DeployError::CommandFailed`] (or similar) when the
/// platform rejects a request; callers never retry.
pub trait Platform {
    /// Raw stack listing, one stack per line:
    /// `NAME  UUID  STATUS ...`.
    fn list_stacks(&self) -> DeployResult<String>;

    /// Create a stack named `name` from a stack file.
    fn create_stack(&self, name: &str, stackfile: &Path) -> DeployResult<()>;

    /// Replace the definition of stack `id` with a stack file.
    fn update_stack(&self, id: &str, stackfile: &Path) -> DeployResult<()>;

    /// Image details as returned by the platform.
    fn inspect_image(&self, image: &str) -> DeployResult<serde_json::Value>;

    /// Service details. `id` is a UUID or `service.stack`.
    fn inspect_service(&self, id: &str) -> DeployResult<serde_json::Value>;

    /// Redeploy a running service.
    fn redeploy_service(&self, id: &str) -> DeployResult<()>;
}

#[derive(Debug, Deserialize)]
struct ImageDetails {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceDetails {
    #[serde(default)]
    public_dns: Option<String>,
    #[serde(default)]
    linked_to_service: Vec<ServiceLinkRef>,
}

#[derive(Debug, Deserialize)]
struct ServiceLinkRef {
    to_service: String,
}

/// Tag names of an image. The platform reports tags as resource
/// URIs; the name is the last path segment.
pub fn image_tags(image: &serde_json::Value) -> DeployResult<Vec<String>> {
    let details = ImageDetails::deserialize(image)?;
    Ok(details
        .tags
        .iter()
        .filter_map(|uri| last_segment(uri))
        .map(String::from)
        .collect())
}

/// Identifiers of the services a service links to.
pub fn linked_service_ids(service: &serde_json::Value) -> DeployResult<Vec<String>> {
    let details = ServiceDetails::deserialize(service)?;
    details
        .linked_to_service
        .iter()
        .map(|link| {
            last_segment(&link.to_service).map(String::from).ok_or_else(|| {
                DeployError::Discovery(format!("malformed service reference: {}", link.to_service))
            })
        })
        .collect()
}

/// Public DNS name of a service.
pub fn public_dns(service: &serde_json::Value) -> DeployResult<String> {
    ServiceDetails::deserialize(service)?
        .public_dns
        .filter(|dns| !dns.is_empty())
        .ok_or_else(|| DeployError::Discovery("service has no public DNS name".into()))
}

/// Fail unless `tag` is one of the tags of `image`.
pub fn validate_tag(platform: &dyn Platform, image: &str, tag: &str) -> DeployResult<()> {
    let details = platform.inspect_image(image)?;
    let available = image_tags(&details)?;

    if available.iter().any(|t| t == tag) {
        tracing::debug!(image, tag, "locked tag exists");
        Ok(())
    } else {
        Err(DeployError::UnknownTag {
            image: image.to_string(),
            tag: tag.to_string(),
            available,
        })
    }
}

fn last_segment(uri: &str) -> Option<&str> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(last_segment("/api/v1/service/abc-123/"), Some("abc-123"));
        assert_eq!(last_segment("abc"), Some("abc"));
        assert_eq!(last_segment("/"), None);
        assert_eq!(last_segment(""), None);
    }
}
