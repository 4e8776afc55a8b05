use std::process::{Command, Output, Stdio};

use crate::error::{DeployError, DeployResult};

/// Run a command and capture its output. Fails if the command
/// returns a non-zero exit code.
pub fn run(program: &str, args: &[&str]) -> DeployResult<String> {
    let command = format_command(program, args);
    tracing::debug!(%command, "running");

    let output = spawn(program, args)?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        eprintln!("stderr: {stderr}");
        Err(DeployError::CommandFailed {
            command,
            status: output.status,
        })
    }
}

/// Run a command with stdin/stdout/stderr inherited, echoing it
/// first as `~ $ <command>`.
pub fn run_interactive(program: &str, args: &[&str]) -> DeployResult<()> {
    let command = format_command(program, args);
    eprintln!("~ $ {command}");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| not_found_or_io(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(DeployError::CommandFailed { command, status })
    }
}

/// Run a command whose failure does not matter. Output is
/// discarded; returns whether it succeeded.
pub fn run_tolerant(program: &str, args: &[&str]) -> bool {
    let command = format_command(program, args);
    eprintln!("~ $ {command}");

    match spawn(program, args) {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            tracing::debug!(%command, status = %output.status, "ignored failure");
            false
        }
        Err(e) => {
            tracing::debug!(%command, error = %e, "ignored failure");
            false
        }
    }
}

fn spawn(program: &str, args: &[&str]) -> DeployResult<Output> {
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| not_found_or_io(program, e))
}

fn not_found_or_io(program: &str, e: std::io::Error) -> DeployError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DeployError::CommandNotFound(program.to_string())
    } else {
        DeployError::Io(e)
    }
}

fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}
