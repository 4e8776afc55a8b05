use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Names, prefixes, and file locations used by a deployment.
///
/// # Example
///
/// ```
/// use tutum_deploy::DeployConfig;
///
/// let config = DeployConfig::new()
///     .stack_prefix("acme-")
///     .template_dir("deploy")
///     .locked_image("LOCKED_WORKER_TAG", "tutum.co/acme/worker");
///
/// assert_eq!(config.stack_name("feature-x"), "acme-feature-x");
/// assert_eq!(
///     config.stack_template_path(),
///     std::path::Path::new("deploy/staging.stack.template.yml")
/// );
/// assert_eq!(config.locked_images.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub stack_prefix: String,
    pub service_prefix: String,
    pub shared_stack: String,
    pub load_balancer: String,
    pub stack_template: String,
    pub solo_template: String,
    pub solo_output: String,
    /// Stack part that selects the production deploy.
    pub production_stack: String,
    pub production_template: String,
    pub production_output: String,
    /// Default locked tag in production.
    pub production_tag: String,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub links_variable: String,
    /// Locked tag variable -> image the tag must exist on.
    pub locked_images: IndexMap<String, String>,
    pub dns_flush: Option<Vec<String>>,
}

impl DeployConfig {
    #[must_use]
    pub fn new() -> Self {
        let mut locked_images = IndexMap::new();
        locked_images.insert(
            "LOCKED_API_TAG".to_string(),
            "tutum.co/yniche/api.yniche.com".to_string(),
        );

        Self {
            stack_prefix: "yniche-".to_string(),
            service_prefix: "staging-".to_string(),
            shared_stack: "yniche-staging-solo".to_string(),
            load_balancer: "lb".to_string(),
            stack_template: "staging.stack.template.yml".to_string(),
            solo_template: "staging.solo.template.yml".to_string(),
            solo_output: "staging.solo.yml".to_string(),
            production_stack: "production".to_string(),
            production_template: "production.template.yml".to_string(),
            production_output: "production.yml".to_string(),
            production_tag: "production".to_string(),
            template_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            links_variable: "LB_LINKS".to_string(),
            locked_images,
            dns_flush: Some(vec!["dscacheutil".to_string(), "-flushcache".to_string()]),
        }
    }

    #[must_use]
    pub fn stack_prefix(mut self, prefix: &str) -> Self {
        self.stack_prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub fn service_prefix(mut self, prefix: &str) -> Self {
        self.service_prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub fn shared_stack(mut self, name: &str) -> Self {
        self.shared_stack = name.to_string();
        self
    }

    #[must_use]
    pub fn load_balancer(mut self, service: &str) -> Self {
        self.load_balancer = service.to_string();
        self
    }

    #[must_use]
    pub fn stack_template(mut self, file: &str) -> Self {
        self.stack_template = file.to_string();
        self
    }

    #[must_use]
    pub fn solo_template(mut self, file: &str, output: &str) -> Self {
        self.solo_template = file.to_string();
        self.solo_output = output.to_string();
        self
    }

    #[must_use]
    pub fn production_template(mut self, file: &str, output: &str) -> Self {
        self.production_template = file.to_string();
        self.production_output = output.to_string();
        self
    }

    #[must_use]
    pub fn production_tag(mut self, tag: &str) -> Self {
        self.production_tag = tag.to_string();
        self
    }

    #[must_use]
    pub fn template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.template_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn links_variable(mut self, key: &str) -> Self {
        self.links_variable = key.to_string();
        self
    }

    #[must_use]
    pub fn locked_image(mut self, key: &str, image: &str) -> Self {
        self.locked_images.insert(key.to_string(), image.to_string());
        self
    }

    #[must_use]
    pub fn without_locked_images(mut self) -> Self {
        self.locked_images.clear();
        self
    }

    /// Command flushing the local DNS cache; `None` disables it.
    #[must_use]
    pub fn dns_flush(mut self, command: Option<&[&str]>) -> Self {
        self.dns_flush = command.map(|c| c.iter().map(|s| (*s).to_string()).collect());
        self
    }

    #[must_use]
    pub fn stack_name(&self, stack: &str) -> String {
        format!("{}{stack}", self.stack_prefix)
    }

    /// Identifier of the load balancer service in the shared stack.
    #[must_use]
    pub fn load_balancer_id(&self) -> String {
        format!("{}.{}", self.load_balancer, self.shared_stack)
    }

    #[must_use]
    pub fn stack_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.stack_template)
    }

    #[must_use]
    pub fn stack_output_path(&self, stack_name: &str) -> PathBuf {
        self.output_dir.join(format!("{stack_name}.yml"))
    }

    #[must_use]
    pub fn is_production(&self, stack: &str) -> bool {
        stack == self.production_stack
    }

    /// Template the stack part `stack` is rendered from.
    #[must_use]
    pub fn template_path_for(&self, stack: &str) -> PathBuf {
        if self.is_production(stack) {
            self.template_dir.join(&self.production_template)
        } else {
            self.stack_template_path()
        }
    }

    /// Stack file written for the stack part `stack`.
    #[must_use]
    pub fn output_path_for(&self, stack: &str) -> PathBuf {
        if self.is_production(stack) {
            self.output_dir.join(&self.production_output)
        } else {
            self.stack_output_path(&self.stack_name(stack))
        }
    }

    #[must_use]
    pub fn solo_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.solo_template)
    }

    #[must_use]
    pub fn solo_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.solo_output)
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self::new()
    }
}
