//! Stack template rendering.
//!
//! A template is a YAML stack file whose values may contain
//! `<%= NAME %>` placeholders. Rendering parses the file, applies
//! `<<` merge keys, drops the top-level `defaults` entry, serializes
//! the document back and substitutes every placeholder from a
//! [`VariableStore`].
//!
//! `serde_yaml` mappings keep insertion order, so services and keys
//! come out in the order the template lists them.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::error::{DeployError, DeployResult};
use crate::variables::VariableStore;

/// Top-level key that only exists for anchors and inheritance.
pub const DEFAULTS_KEY: &str = "defaults";

// A placeholder may be wrapped in matching quotes by the serializer;
// those quotes are consumed along with it.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'<%=\s*(\w+)\s*%>'|"<%=\s*(\w+)\s*%>"|<%=\s*(\w+)\s*%>"#)
        .expect("valid placeholder pattern")
});

/// Render the template at `path`.
pub fn render(path: &Path, vars: &mut VariableStore) -> DeployResult<String> {
    let name = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DeployError::FileNotFound(name.clone())
        } else {
            DeployError::Io(e)
        }
    })?;

    render_str(&source, &name, vars)
}

/// Render template text. `name` is used in error messages.
pub fn render_str(source: &str, name: &str, vars: &mut VariableStore) -> DeployResult<String> {
    let mut definition: Value =
        serde_yaml::from_str(source).map_err(|source| DeployError::TemplateParse {
            template: name.to_string(),
            source,
        })?;

    definition
        .apply_merge()
        .map_err(|source| DeployError::TemplateParse {
            template: name.to_string(),
            source,
        })?;

    if let Value::Mapping(map) = &mut definition {
        map.shift_remove(DEFAULTS_KEY);
    }

    let serialized = serde_yaml::to_string(&definition)?;
    substitute(&serialized, name, vars)
}

/// Replace every placeholder in `text` with its resolved value.
pub fn substitute(text: &str, name: &str, vars: &mut VariableStore) -> DeployResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let key = placeholder_key(&caps);

        let value = vars.resolve(key).map_err(|e| match e {
            DeployError::UnknownVariable(key) => DeployError::UnsupportedVariable {
                template: name.to_string(),
                key,
            },
            other => other,
        })?;

        out.push_str(&text[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Write a rendered definition to `path`.
pub fn write(path: &Path, definition: &str) -> DeployResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, definition)?;
    tracing::debug!(path = %path.display(), "wrote stack file");
    Ok(())
}

fn placeholder_key<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str())
}
