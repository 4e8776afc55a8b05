use std::path::Path;

use crate::error::DeployResult;
use crate::platform::Platform;
use crate::template;
use crate::variables::VariableStore;

/// What [`StackDeployer::deploy`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployAction {
    Created,
    Updated { id: String },
}

/// Creates a stack, or updates it when a live one with the same
/// name already exists.
pub struct StackDeployer<'a> {
    platform: &'a dyn Platform,
}

impl<'a> StackDeployer<'a> {
    #[must_use]
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Deploy `stack_name` from the stack file at `output`. When a
    /// template is given it is rendered into `output` first.
    pub fn deploy(
        &self,
        stack_name: &str,
        template_path: Option<&Path>,
        output: &Path,
        vars: &mut VariableStore,
    ) -> DeployResult<DeployAction> {
        if let Some(template_path) = template_path {
            let definition = template::render(template_path, vars)?;
            template::write(output, &definition)?;
        }

        self.apply(stack_name, output)
    }

    /// Create or update `stack_name` from an already written stack
    /// file.
    pub fn apply(&self, stack_name: &str, stackfile: &Path) -> DeployResult<DeployAction> {
        let listing = self.platform.list_stacks()?;

        if let Some(id) = find_live_stack(&listing, stack_name) {
            tracing::warn!(stack = stack_name, %id, "stack already exists, updating its definition");
            eprintln!(
                "Stack {stack_name} already exists. To ship new code, rebuild and push \
                 the image; autoredeploy restarts the service. Updating the definition \
                 only matters when services were added, changed or removed, or a \
                 locked tag changed."
            );
            self.platform.update_stack(&id, stackfile)?;
            eprintln!(
                "Stack {stack_name} has been updated. \
                 Keep in mind that new services are not started automatically."
            );
            Ok(DeployAction::Updated { id })
        } else {
            tracing::info!(stack = stack_name, "creating stack");
            self.platform.create_stack(stack_name, stackfile)?;
            Ok(DeployAction::Created)
        }
    }
}

/// Find the identifier of a non-terminated stack named `name` in
/// a stack listing.
///
/// A line matches when it starts with `name` followed by
/// whitespace; the identifier is its second column.
///
/// # Example
///
/// ```
/// use tutum_deploy::stack::find_live_stack;
///
/// let listing = "\
/// NAME                   UUID     STATUS
/// yniche-linkedin-auth   abc123   Running";
///
/// assert_eq!(
///     find_live_stack(listing, "yniche-linkedin-auth").as_deref(),
///     Some("abc123")
/// );
/// assert_eq!(find_live_stack(listing, "yniche-linkedin"), None);
/// ```
#[must_use]
pub fn find_live_stack(listing: &str, name: &str) -> Option<String> {
    listing
        .lines()
        .filter(|line| {
            line.strip_prefix(name)
                .and_then(|rest| rest.chars().next())
                .is_some_and(char::is_whitespace)
        })
        .find(|line| !line.contains("Terminated"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(String::from)
}
