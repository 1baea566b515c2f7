//! Thin wrapper over the Docker CLI.
//!
//! [`DockerCommand`] builds argument vectors; [`Docker`] executes them. The
//! docker binary is `docker` unless overridden via the `MOOR_DOCKER`
//! environment variable, which lets tests substitute a recording stub.
//!
//! A failure to spawn the binary at all is reported as
//! [`Error::DockerUnavailable`] and aborts only the current command. No name
//! or port is reserved ahead of use; acquisition is optimistic and verified
//! by `docker run` itself.

pub mod command;

pub use command::DockerCommand;

use crate::identity::RUNTIME_CONTAINER_PREFIX;
use crate::{Error, Result};
use std::process::{Command, Stdio};

/// Environment variable overriding the docker binary (test seam).
pub const DOCKER_BIN_ENV: &str = "MOOR_DOCKER";

/// Lines of log history scanned when pairing a runtime container.
const RUNTIME_SCAN_TAIL: u32 = 200;

/// One running container as reported by `docker ps`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainerInfo {
    /// Container name
    pub name: String,
    /// Status column (e.g. "Up 2 hours")
    pub status: String,
    /// Ports column (e.g. "0.0.0.0:3123->3000/tcp")
    pub ports: String,
}

/// Executes docker commands.
#[derive(Debug, Clone)]
pub struct Docker {
    program: String,
}

impl Default for Docker {
    fn default() -> Self {
        Self::new()
    }
}

impl Docker {
    /// Create a runner using `docker` or the `MOOR_DOCKER` override.
    pub fn new() -> Self {
        let program =
            std::env::var(DOCKER_BIN_ENV).unwrap_or_else(|_| "docker".to_string());
        Self { program }
    }

    fn output(&self, cmd: &DockerCommand) -> Result<std::process::Output> {
        Command::new(&self.program)
            .args(cmd.args())
            .output()
            .map_err(|e| Error::DockerUnavailable(e.to_string()))
    }

    /// Run a command and capture stdout, failing on non-zero exit.
    fn capture(&self, cmd: &DockerCommand) -> Result<String> {
        let output = self.output(cmd)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DockerFailed(format!(
                "`{}`: {}",
                cmd.build(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether a container with exactly `name` is currently running.
    pub fn is_running(&self, name: &str) -> Result<bool> {
        let stdout = self.capture(&DockerCommand::ps_by_name(name))?;
        Ok(stdout.lines().any(|line| line.trim() == name))
    }

    /// Running containers whose names start with `prefix`.
    pub fn list(&self, prefix: &str) -> Result<Vec<ContainerInfo>> {
        let stdout = self.capture(&DockerCommand::ps_by_prefix(
            prefix,
            "{{.Names}}\t{{.Status}}\t{{.Ports}}",
        ))?;
        Ok(stdout.lines().filter_map(parse_ps_line).collect())
    }

    /// Start a detached container; returns the container id docker printed.
    pub fn run_detached(&self, cmd: &DockerCommand) -> Result<String> {
        let stdout = self.capture(cmd)?;
        Ok(stdout.trim().to_string())
    }

    /// Stop a running container.
    pub fn stop(&self, name: &str) -> Result<()> {
        self.capture(&DockerCommand::stop(name)).map(|_| ())
    }

    /// Best-effort removal of a container, running or stopped.
    ///
    /// Failures are swallowed: the container may simply not exist.
    pub fn remove_quiet(&self, name: &str) {
        let _ = self.output(&DockerCommand::rm_forced(name));
    }

    /// Capture recent log output from a container.
    pub fn logs_tail(&self, name: &str, tail: u32) -> Result<String> {
        self.capture(&DockerCommand::logs(name, false, Some(tail)))
    }

    /// Stream a container's logs to the terminal until interrupted.
    ///
    /// Blocks with inherited stdio; interruption comes from the invoking
    /// shell, not from a cancellation token of our own.
    pub fn follow_logs(&self, name: &str, tail: Option<u32>) -> Result<()> {
        let cmd = DockerCommand::logs(name, true, tail);
        let status = Command::new(&self.program)
            .args(cmd.args())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::DockerUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(Error::DockerFailed(format!("`{}` exited non-zero", cmd.build())));
        }
        Ok(())
    }

    /// Find the runtime side-container paired with an app container.
    ///
    /// The app logs its conversation id; the runtime container is named
    /// after it. Returns `None` when no id has appeared in recent history.
    pub fn find_runtime_container(&self, app_name: &str) -> Result<Option<String>> {
        let logs = self.logs_tail(app_name, RUNTIME_SCAN_TAIL)?;
        Ok(scan_conversation_id(&logs)
            .map(|id| format!("{}{}", RUNTIME_CONTAINER_PREFIX, id)))
    }
}

/// Parse one `docker ps` format line: `name\tstatus\tports`.
fn parse_ps_line(line: &str) -> Option<ContainerInfo> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut parts = line.splitn(3, '\t');
    let name = parts.next()?.to_string();
    let status = parts.next().unwrap_or("").to_string();
    let ports = parts.next().unwrap_or("").to_string();
    Some(ContainerInfo { name, status, ports })
}

/// Extract the most recent `conversation_id=` token from log text.
fn scan_conversation_id(text: &str) -> Option<String> {
    const MARKER: &str = "conversation_id=";
    let start = text.rfind(MARKER)? + MARKER.len();
    let id: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if id.is_empty() { None } else { Some(id) }
}
