use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{DeployError, DeployResult};

/// Tag used for a locked tag variable with no environment
/// override.
pub const DEFAULT_LOCKED_TAG: &str = "latest";

static LOCKED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LOCKED_([A-Za-z0-9_]+)_TAG$").expect("valid locked tag pattern"));

/// How [`VariableStore::resolve`] treats keys that were never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Every unknown key is an error.
    Strict,
    /// `LOCKED_<NAME>_TAG` keys fall back to the environment, then
    /// to the default tag (`"latest"` unless changed). Other unknown
    /// keys are still an error.
    #[default]
    LockedTagFallback,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Values substituted into stack templates.
///
/// Keys are case-sensitive. Values derived through the
/// locked tag fallback are cached, so [`VariableStore::locked_tags`]
/// sees every tag a template asked for.
///
/// # Example
///
/// ```
/// use tutum_deploy::variables::{Resolution, VariableStore};
///
/// let mut vars = VariableStore::new(Resolution::LockedTagFallback)
///     .with_env(|_| None);
/// vars.set("BRANCH", "linkedin-auth");
///
/// assert_eq!(vars.resolve("BRANCH").unwrap(), "linkedin-auth");
/// assert_eq!(vars.resolve("LOCKED_API_TAG").unwrap(), "latest");
/// assert!(vars.resolve("NOPE").is_err());
/// ```
pub struct VariableStore {
    values: IndexMap<String, String>,
    resolution: Resolution,
    default_tag: String,
    env: EnvLookup,
}

impl VariableStore {
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            values: IndexMap::new(),
            resolution,
            default_tag: DEFAULT_LOCKED_TAG.to_string(),
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Tag used for locked tags the environment does not set.
    #[must_use]
    pub fn default_tag(mut self, tag: &str) -> Self {
        self.default_tag = tag.to_string();
        self
    }

    /// Replace the environment lookup used by the locked tag
    /// fallback.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Box::new(lookup);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up `key`, applying the fallback policy for unset keys.
    pub fn resolve(&mut self, key: &str) -> DeployResult<String> {
        if key.is_empty() {
            return Err(DeployError::Other("variable name must not be empty".into()));
        }

        let value = if let Some(value) = self.values.get(key) {
            value.clone()
        } else if self.resolution == Resolution::LockedTagFallback && is_locked_tag(key) {
            let value = (self.env)(key).unwrap_or_else(|| self.default_tag.clone());
            self.values.insert(key.to_string(), value.clone());
            value
        } else {
            return Err(DeployError::UnknownVariable(key.to_string()));
        };

        tracing::info!(key, value = %value, "substituted variable");
        Ok(value)
    }

    /// Every `LOCKED_<NAME>_TAG` entry as `(NAME, tag)`, in
    /// insertion order.
    pub fn locked_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(key, value)| {
            locked_tag_name(key).map(|name| (name, value.as_str()))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

impl fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStore")
            .field("values", &self.values)
            .field("resolution", &self.resolution)
            .field("default_tag", &self.default_tag)
            .finish_non_exhaustive()
    }
}

/// Whether `key` has the `LOCKED_<NAME>_TAG` shape.
#[must_use]
pub fn is_locked_tag(key: &str) -> bool {
    LOCKED_TAG.is_match(key)
}

/// The `<NAME>` part of a `LOCKED_<NAME>_TAG` key.
#[must_use]
pub fn locked_tag_name(key: &str) -> Option<&str> {
    LOCKED_TAG
        .captures(key)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_tag_shape() {
        assert!(is_locked_tag("LOCKED_API_TAG"));
        assert!(is_locked_tag("LOCKED_AUTH_WORKER_TAG"));
        assert!(!is_locked_tag("LOCKED__TAG"));
        assert!(!is_locked_tag("LOCKED_API"));
        assert!(!is_locked_tag("XLOCKED_API_TAG"));
    }

    #[test]
    fn locked_tag_name_extracts_middle() {
        assert_eq!(locked_tag_name("LOCKED_AUTH_WORKER_TAG"), Some("AUTH_WORKER"));
        assert_eq!(locked_tag_name("BRANCH"), None);
    }
}
