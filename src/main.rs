use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tutum_deploy::{DeployConfig, Pipeline, TutumCli};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("! {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let report = Pipeline::new(DeployConfig::default())
        .platform(TutumCli::new())
        .run()?;

    tracing::debug!(stack = %report.stack_name, links = ?report.links, "finished");
    Ok(())
}
