//! Template-driven stack deployment for Tutum.
//!
//! `tutum-deploy` renders a stack file from a YAML template, creates
//! or updates the matching stack through the `tutum` CLI, and then
//! rewires the shared load balancer so it links to the freshly
//! deployed service.
//!
//! # Overview
//!
//! A deployment is a [`Pipeline`] over:
//!
//! - A [`DeployConfig`] naming the stacks, prefixes, and template
//!   files
//! - A [`VariableStore`] with the values substituted into
//!   `<%= NAME %>` placeholders
//! - A [`Platform`] client (e.g. [`TutumCli`])
//!
//! # Flow
//!
//! 1. **Render** - load `staging.stack.template.yml`, drop the
//!    `defaults` entry, substitute placeholders, and write
//!    `<stack>.yml`
//! 2. **Validate** - check every locked tag exists on its image
//! 3. **Deploy** - create or update the shared stack and the target
//!    stack
//! 4. **Link** - collect the load balancer's current links, add the
//!    new service, redeploy the shared stack, and redeploy the load
//!    balancer
//!
//! # Example
//!
//! ```rust,no_run
//! use tutum_deploy::{DeployConfig, Pipeline, TutumCli};
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(DeployConfig::new().template_dir("deploy"))
//!         .platform(TutumCli::new());
//!
//!     let report = pipeline.execute(&"linkedin-auth/staging-web".parse()?)?;
//!     println!("deployed {}", report.stack_name);
//!     Ok(())
//! }
//! ```
//!
//! The `deploy` binary wraps the same pipeline:
//!
//! ```sh
//! deploy linkedin-auth/staging-web
//! deploy linkedin-auth/staging-web --dry-run
//! LOCKED_API_TAG=v42 deploy linkedin-auth/staging-web
//! deploy production/web   # production.template.yml, tags default to `production`
//! ```

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cmd;
pub mod config;
pub mod error;
pub mod links;
pub mod pipeline;
pub mod platform;
pub mod stack;
pub mod template;
pub mod variables;

pub use config::DeployConfig;
pub use error::{DeployError, DeployResult};
pub use links::{Linker, ServiceLink};
pub use pipeline::{DeployReport, Pipeline, Target};
pub use platform::Platform;
pub use platform::tutum::TutumCli;
pub use stack::{DeployAction, StackDeployer};
pub use variables::{Resolution, VariableStore};
