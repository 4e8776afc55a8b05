//! Load balancer link discovery.
//!
//! The shared load balancer reaches every deployed web service
//! through a platform link. Links are written as
//! `service.stack:alias`, where the alias is the service name with
//! the service prefix stripped, suffixed with the stack name.

use std::fmt;

use indexmap::IndexSet;

use crate::error::{DeployError, DeployResult};
use crate::platform::{self, Platform};
use crate::variables::VariableStore;

/// A link from the load balancer to `service` in `stack`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceLink {
    pub service: String,
    pub stack: String,
    pub alias: String,
}

impl ServiceLink {
    /// # Example
    ///
    /// ```
    /// use tutum_deploy::links::ServiceLink;
    ///
    /// let link = ServiceLink::new("staging-web", "yniche-linkedin-auth", "staging-");
    /// assert_eq!(
    ///     link.to_string(),
    ///     "staging-web.yniche-linkedin-auth:web-yniche-linkedin-auth"
    /// );
    /// ```
    #[must_use]
    pub fn new(service: &str, stack: &str, service_prefix: &str) -> Self {
        let label = service.strip_prefix(service_prefix).unwrap_or(service);
        Self {
            service: service.to_string(),
            stack: stack.to_string(),
            alias: format!("{label}-{stack}"),
        }
    }

    /// Build a link from a public DNS name of the form
    /// `service.stack.<anything>`.
    #[must_use]
    pub fn from_public_dns(dns: &str, service_prefix: &str) -> Option<Self> {
        let mut parts = dns.split('.');
        let service = parts.next().filter(|s| !s.is_empty())?;
        let stack = parts.next().filter(|s| !s.is_empty())?;
        Some(Self::new(service, stack, service_prefix))
    }
}

impl fmt::Display for ServiceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.service, self.stack, self.alias)
    }
}

/// Computes the link list of the shared load balancer.
pub struct Linker<'a> {
    platform: &'a dyn Platform,
    service_prefix: String,
}

impl<'a> Linker<'a> {
    #[must_use]
    pub fn new(platform: &'a dyn Platform, service_prefix: &str) -> Self {
        Self {
            platform,
            service_prefix: service_prefix.to_string(),
        }
    }

    /// Links the load balancer currently has. Discovery is best
    /// effort: any failure yields an empty list.
    #[must_use]
    pub fn existing_links(&self, load_balancer: &str) -> Vec<String> {
        match self.discover(load_balancer) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(load_balancer, error = %e, "link discovery failed, starting from no links");
                Vec::new()
            }
        }
    }

    /// Existing links, then links to the companion services of
    /// every locked tag, then `deployed`; duplicates removed.
    #[must_use]
    pub fn compute_links(
        &self,
        load_balancer: &str,
        vars: &VariableStore,
        deployed: &ServiceLink,
    ) -> Vec<String> {
        let existing = self.existing_links(load_balancer);
        let derived = derived_links(vars, &deployed.stack, &self.service_prefix);

        merge_links(
            existing
                .into_iter()
                .chain(derived)
                .chain(std::iter::once(deployed.to_string())),
        )
    }

    fn discover(&self, load_balancer: &str) -> DeployResult<Vec<String>> {
        let lb = self.platform.inspect_service(load_balancer)?;
        let ids = platform::linked_service_ids(&lb)?;

        ids.iter()
            .map(|id| {
                let service = self.platform.inspect_service(id)?;
                let dns = platform::public_dns(&service)?;
                ServiceLink::from_public_dns(&dns, &self.service_prefix)
                    .map(|link| link.to_string())
                    .ok_or_else(|| DeployError::Discovery(format!("unexpected public DNS name: {dns}")))
            })
            .collect()
    }
}

/// Links to the companion service of every `LOCKED_<NAME>_TAG`
/// variable: `LOCKED_API_TAG` maps to `<prefix>api` in `stack`.
#[must_use]
pub fn derived_links(vars: &VariableStore, stack: &str, service_prefix: &str) -> Vec<String> {
    vars.locked_tags()
        .map(|(name, _)| {
            let service = format!("{service_prefix}{}", name.to_lowercase().replace('_', "-"));
            ServiceLink::new(&service, stack, service_prefix).to_string()
        })
        .collect()
}

/// Deduplicate links, keeping the first occurrence of each.
#[must_use]
pub fn merge_links<I>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    links
        .into_iter()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Link list as a YAML flow sequence, ready for substitution into
/// a `links:` entry.
pub fn links_value(links: &[String]) -> DeployResult<String> {
    Ok(serde_json::to_string(links)?)
}
