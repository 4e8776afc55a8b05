use std::path::Path;

use crate::cmd;
use crate::error::DeployResult;
use crate::platform::Platform;

/// [`Platform`] backed by the `tutum` command line client.
///
/// Requires `tutum` on PATH and logged in (`tutum login`).
pub struct TutumCli {
    pub program: String,
}

impl TutumCli {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "tutum".to_string(),
        }
    }

    /// Use a different client binary.
    #[must_use]
    pub fn program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    fn inspect(&self, kind: &str, id: &str) -> DeployResult<serde_json::Value> {
        let output = cmd::run(&self.program, &[kind, "inspect", id])?;
        Ok(serde_json::from_str(&output)?)
    }
}

impl Default for TutumCli {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TutumCli {
    fn list_stacks(&self) -> DeployResult<String> {
        cmd::run(&self.program, &["stack", "list"])
    }

    fn create_stack(&self, name: &str, stackfile: &Path) -> DeployResult<()> {
        let name_arg = format!("--name={name}");
        let file = stackfile.display().to_string();
        cmd::run_interactive(&self.program, &["stack", "up", &name_arg, "-f", &file])
    }

    fn update_stack(&self, id: &str, stackfile: &Path) -> DeployResult<()> {
        let file = stackfile.display().to_string();
        cmd::run_interactive(&self.program, &["stack", "update", "-f", &file, id])
    }

    fn inspect_image(&self, image: &str) -> DeployResult<serde_json::Value> {
        self.inspect("image", image)
    }

    fn inspect_service(&self, id: &str) -> DeployResult<serde_json::Value> {
        self.inspect("service", id)
    }

    fn redeploy_service(&self, id: &str) -> DeployResult<()> {
        cmd::run_interactive(&self.program, &["service", "redeploy", id])
    }
}
