use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use clap::Parser;

use crate::cmd;
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::links::{self, Linker, ServiceLink};
use crate::platform::{self, Platform};
use crate::stack::{DeployAction, StackDeployer};
use crate::template;
use crate::variables::{Resolution, VariableStore};

type EnvLookup = Rc<dyn Fn(&str) -> Option<String>>;

/// The service being deployed, given as `stack/service`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub stack: String,
    pub service: String,
}

impl FromStr for Target {
    type Err = DeployError;

    fn from_str(s: &str) -> DeployResult<Self> {
        match s.split_once('/') {
            Some((stack, service))
                if !stack.is_empty() && !service.is_empty() && !service.contains('/') =>
            {
                Ok(Self {
                    stack: stack.to_string(),
                    service: service.to_string(),
                })
            }
            _ => Err(DeployError::Usage(format!(
                "deploy <stack>/<service> (got '{s}')"
            ))),
        }
    }
}

/// Outcome of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub stack_name: String,
    pub stackfile: PathBuf,
    /// `None` for a dry run.
    pub action: Option<DeployAction>,
    pub links: Vec<String>,
}

/// Deployment pipeline: render the stack files, deploy the shared
/// and target stacks, then relink and redeploy the load balancer.
pub struct Pipeline {
    config: DeployConfig,
    platform: Option<Box<dyn Platform>>,
    env: Option<EnvLookup>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: DeployConfig) -> Self {
        Self {
            config,
            platform: None,
            env: None,
        }
    }

    #[must_use]
    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    /// Replace the environment lookup used for locked tags.
    #[must_use]
    pub fn env(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Some(Rc::new(lookup));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Parse CLI arguments and deploy.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the deployment fails.
    pub fn run(self) -> DeployResult<DeployReport> {
        let cli = Cli::parse();
        let target: Target = cli.target.parse()?;

        let mut pipeline = self;
        if let Some(dir) = &cli.template_dir {
            pipeline.config = pipeline.config.template_dir(dir);
        }
        if let Some(dir) = &cli.output_dir {
            pipeline.config = pipeline.config.output_dir(dir);
        }

        if cli.dry_run {
            pipeline.dry_run(&target)
        } else {
            pipeline.execute(&target)
        }
    }

    /// Deploy `target` for real.
    pub fn execute(&self, target: &Target) -> DeployResult<DeployReport> {
        let platform = self
            .platform
            .as_deref()
            .ok_or_else(|| DeployError::Other("no platform configured".into()))?;

        let config = &self.config;
        let stack_name = config.stack_name(&target.stack);
        let production = config.is_production(&target.stack);
        if production {
            self.print_production_checklist(&stack_name);
        } else {
            eprintln!("~ Deploying {} to {stack_name}.", target.service);
        }

        let mut vars = self.variables(target, &stack_name);
        let deployer = StackDeployer::new(platform);

        let stackfile = config.output_path_for(&target.stack);
        let definition = template::render(&config.template_path_for(&target.stack), &mut vars)?;
        self.validate_locked_tags(platform, &vars)?;
        template::write(&stackfile, &definition)?;

        // Production has no shared stack to relink.
        if production {
            let action = deployer.apply(&stack_name, &stackfile)?;
            eprintln!();
            eprintln!("Deployment complete!");
            return Ok(DeployReport {
                stack_name,
                stackfile,
                action: Some(action),
                links: Vec::new(),
            });
        }

        let deployed = ServiceLink::new(&target.service, &stack_name, &config.service_prefix);
        let linker = Linker::new(platform, &config.service_prefix);
        let load_balancer = config.load_balancer_id();

        let solo_template = self.solo_template();
        let solo_output = config.solo_output_path();

        if let Some(solo_template) = &solo_template {
            let current = linker.existing_links(&load_balancer);
            vars.set(&config.links_variable, &links::links_value(&current)?);
            deployer.deploy(
                &config.shared_stack,
                Some(solo_template.as_path()),
                &solo_output,
                &mut vars,
            )?;
        }

        let action = deployer.apply(&stack_name, &stackfile)?;

        let links = linker.compute_links(&load_balancer, &vars, &deployed);
        tracing::info!(count = links.len(), "computed load balancer links");

        if let Some(solo_template) = &solo_template {
            vars.set(&config.links_variable, &links::links_value(&links)?);
            deployer.deploy(
                &config.shared_stack,
                Some(solo_template.as_path()),
                &solo_output,
                &mut vars,
            )?;
            platform.redeploy_service(&load_balancer)?;
        } else {
            eprintln!("~ No shared stack template, load balancer left untouched.");
        }

        self.flush_dns();

        eprintln!();
        eprintln!("Deployment complete!");

        Ok(DeployReport {
            stack_name,
            stackfile,
            action: Some(action),
            links,
        })
    }

    /// Render and write the stack files and list the platform
    /// actions, without calling the platform.
    pub fn dry_run(&self, target: &Target) -> DeployResult<DeployReport> {
        let config = &self.config;
        let stack_name = config.stack_name(&target.stack);
        let production = config.is_production(&target.stack);
        let mut vars = self.variables(target, &stack_name);
        let deployed = ServiceLink::new(&target.service, &stack_name, &config.service_prefix);

        let stackfile = config.output_path_for(&target.stack);
        let definition = template::render(&config.template_path_for(&target.stack), &mut vars)?;
        template::write(&stackfile, &definition)?;

        let links = links::merge_links(
            links::derived_links(&vars, &stack_name, &config.service_prefix)
                .into_iter()
                .chain(std::iter::once(deployed.to_string())),
        );

        eprintln!("=== Dry run: stack files are written, no platform calls are made ===");
        eprintln!();
        eprintln!("--- {} ---", stackfile.display());
        println!("{definition}");

        let solo_template = if production {
            None
        } else {
            self.solo_template()
        };
        if let Some(solo_template) = &solo_template {
            vars.set(&config.links_variable, &links::links_value(&links)?);
            let solo = template::render(solo_template, &mut vars)?;
            let solo_output = config.solo_output_path();
            template::write(&solo_output, &solo)?;
            eprintln!("--- {} ---", solo_output.display());
            println!("{solo}");
        }

        eprintln!("--- Actions that would be performed ---");
        let mut step = 1;
        for (key, image) in &config.locked_images {
            if let Some(tag) = vars.get(key) {
                eprintln!("{step}. Check tag {tag} exists on {image}");
                step += 1;
            }
        }
        if solo_template.is_some() {
            eprintln!("{step}. Create or update stack {}", config.shared_stack);
            step += 1;
        }
        eprintln!("{step}. Create or update stack {stack_name}");
        step += 1;
        if solo_template.is_some() {
            eprintln!(
                "{step}. Link {} to: {}",
                config.load_balancer_id(),
                links.join(", ")
            );
            eprintln!("{}. Redeploy {}", step + 1, config.load_balancer_id());
        }

        Ok(DeployReport {
            stack_name,
            stackfile,
            action: None,
            links,
        })
    }

    fn variables(&self, target: &Target, stack_name: &str) -> VariableStore {
        let mut vars = VariableStore::new(Resolution::LockedTagFallback);
        if self.config.is_production(&target.stack) {
            vars = vars.default_tag(&self.config.production_tag);
        }
        if let Some(env) = &self.env {
            let env = Rc::clone(env);
            vars = vars.with_env(move |key| env(key));
        }

        vars.set("BRANCH", &target.stack);
        vars.set("STACK_NAME", stack_name);
        vars.set("SERVICE_NAME", &target.service);
        vars.set("LOCKED_WEB_TAG", &target.stack);
        vars
    }

    fn print_production_checklist(&self, stack_name: &str) {
        let tag = &self.config.production_tag;
        eprintln!("~ Doing PRODUCTION deploy to {stack_name}.");
        eprintln!();
        eprintln!("Checklist:");
        eprintln!("- Have you updated the '{tag}' tag on the web image and pushed it?");
        for image in self.config.locked_images.values() {
            eprintln!("- Have you updated the '{tag}' tag on {image} and pushed it?");
        }
        eprintln!();
    }

    fn validate_locked_tags(&self, platform: &dyn Platform, vars: &VariableStore) -> DeployResult<()> {
        for (key, image) in &self.config.locked_images {
            if let Some(tag) = vars.get(key) {
                platform::validate_tag(platform, image, tag)?;
            }
        }
        Ok(())
    }

    fn solo_template(&self) -> Option<PathBuf> {
        let path = self.config.solo_template_path();
        if path.exists() {
            Some(path)
        } else {
            tracing::warn!(path = %path.display(), "shared stack template not found, skipping");
            None
        }
    }

    fn flush_dns(&self) {
        if let Some((program, args)) = self
            .config
            .dns_flush
            .as_ref()
            .and_then(|command| command.split_first())
        {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            cmd::run_tolerant(program, &args);
        }
    }
}

#[derive(Parser)]
#[command(name = "deploy")]
#[command(about = "Deploy a service to its staging stack and relink the load balancer")]
struct Cli {
    /// Service to deploy, as <stack>/<service>
    target: String,

    /// Render stack files and list actions without deploying
    #[arg(long)]
    dry_run: bool,

    /// Directory holding the stack templates
    #[arg(long, env = "DEPLOY_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Directory the rendered stack files are written to
    #[arg(long, env = "DEPLOY_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_one_target() {
        let cli = Cli::try_parse_from(["deploy", "linkedin-auth/staging-web"]).unwrap();
        assert_eq!(cli.target, "linkedin-auth/staging-web");
        assert!(!cli.dry_run);
    }

    #[test]
    fn cli_rejects_missing_and_extra_arguments() {
        assert!(Cli::try_parse_from(["deploy"]).is_err());
        assert!(Cli::try_parse_from(["deploy", "a/b", "c"]).is_err());
    }

    #[test]
    fn cli_dry_run_flag() {
        let cli = Cli::try_parse_from(["deploy", "a/b", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
    }
}
