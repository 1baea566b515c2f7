//! Command implementations for the moor CLI.
//!
//! Each command is a function over external state (the Docker daemon and the
//! filesystem) returning a serializable result struct. Presentation lives in
//! the [`Output`] trait; `main` decides between JSON and human form.

use crate::config::{self, ConfigPaths, ResolvedConfig, Warning};
use crate::docker::{Docker, DockerCommand};
use crate::identity::{APP_CONTAINER_PREFIX, CONTAINER_PORT, ProjectPath, display_name};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default app container image.
pub const DEFAULT_APP_IMAGE: &str = "docker.all-hands.dev/all-hands-ai/openhands:latest";

/// Default runtime container image, injected when not configured.
pub const DEFAULT_RUNTIME_IMAGE: &str = "docker.all-hands.dev/all-hands-ai/runtime:latest";

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Result of `moor launch`.
#[derive(Debug, Serialize)]
pub struct LaunchResult {
    pub project: String,
    pub container: String,
    pub container_id: String,
    pub port: u16,
    pub url: String,
    /// Masked settings lines, safe for display
    pub settings: Vec<String>,
    pub warnings: Vec<String>,
}

impl Output for LaunchResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.push(format!("Launched {} as {}", self.project, self.container));
        lines.push(format!("Open {}", self.url));
        if !self.settings.is_empty() {
            lines.push("Settings:".to_string());
            for setting in &self.settings {
                lines.push(format!("  {}", setting));
            }
        }
        lines.join("\n")
    }
}

/// Launch the app container for a project.
///
/// Fails if the project directory does not exist or a container for the
/// project is already running. A stopped leftover container of the same name
/// is removed best-effort before the new `docker run`; no other rollback of
/// partial effects happens.
pub fn launch(projects_root: &Path, project: &str, image: Option<String>) -> Result<LaunchResult> {
    let project = ProjectPath::parse(project)?;
    let directory = project.directory(projects_root);
    if !directory.is_dir() {
        return Err(Error::NotFound(format!(
            "project directory {} does not exist",
            directory.display()
        )));
    }

    let name = project.container_name();
    let port = project.port();
    let docker = Docker::new();

    if docker.is_running(&name)? {
        return Err(Error::AlreadyRunning { name, project: project.display() });
    }

    let (config, warnings) = resolve_for(&project, &directory);
    let env = launch_environment(&config, &directory);
    let gpus = env
        .iter()
        .any(|(k, v)| k == "SANDBOX_ENABLE_GPU" && v == "true");
    let volumes = vec!["/var/run/docker.sock:/var/run/docker.sock".to_string()];
    let image = image.unwrap_or_else(|| DEFAULT_APP_IMAGE.to_string());

    // Clear out a stopped leftover from an earlier run, best effort
    docker.remove_quiet(&name);

    let cmd = DockerCommand::run_detached(
        &name,
        port,
        CONTAINER_PORT,
        &env,
        &volumes,
        Some("host.docker.internal:host-gateway"),
        gpus,
        &image,
    );
    let container_id = docker.run_detached(&cmd)?;

    Ok(LaunchResult {
        project: project.display(),
        container: name,
        container_id,
        port,
        url: format!("http://localhost:{}", port),
        settings: config.display_lines(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    })
}

/// Result of `moor stop`.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub project: String,
    pub container: String,
    /// Paired runtime container, when one was discovered and stopped
    pub runtime_container: Option<String>,
}

impl Output for StopResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        match &self.runtime_container {
            Some(runtime) => format!(
                "Stopped {} ({} and runtime {})",
                self.project, self.container, runtime
            ),
            None => format!("Stopped {} ({})", self.project, self.container),
        }
    }
}

/// Stop the app container for a project, plus its runtime side-container.
///
/// The runtime container is discovered by scanning the app's recent log
/// output for a conversation id; discovery and runtime teardown are best
/// effort and never fail the stop.
pub fn stop(project: &str) -> Result<StopResult> {
    let project = ProjectPath::parse(project)?;
    let name = project.container_name();
    let docker = Docker::new();

    if !docker.is_running(&name)? {
        return Err(Error::NotFound(format!(
            "no running container for project '{}'",
            project.display()
        )));
    }

    // Discover the runtime pair before the app's logs go away
    let runtime = docker.find_runtime_container(&name).ok().flatten();

    docker.stop(&name)?;
    docker.remove_quiet(&name);

    if let Some(ref runtime_name) = runtime {
        let _ = docker.stop(runtime_name);
        docker.remove_quiet(runtime_name);
    }

    Ok(StopResult {
        project: project.display(),
        container: name,
        runtime_container: runtime,
    })
}

/// One row of `moor list`.
#[derive(Debug, Serialize)]
pub struct ListedContainer {
    pub project: String,
    pub container: String,
    pub status: String,
    pub ports: String,
}

/// Result of `moor list`.
#[derive(Debug, Serialize)]
pub struct ListResult {
    pub containers: Vec<ListedContainer>,
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.containers.is_empty() {
            return "No sandboxes running.".to_string();
        }
        let mut lines = vec![format!("{:<24} {:<36} {:<20} PORTS", "PROJECT", "CONTAINER", "STATUS")];
        for c in &self.containers {
            lines.push(format!(
                "{:<24} {:<36} {:<20} {}",
                c.project, c.container, c.status, c.ports
            ));
        }
        lines.join("\n")
    }
}

/// List running sandbox containers with their display paths.
pub fn list() -> Result<ListResult> {
    let docker = Docker::new();
    let containers = docker
        .list(APP_CONTAINER_PREFIX)?
        .into_iter()
        .map(|info| {
            let fragment = info
                .name
                .strip_prefix(APP_CONTAINER_PREFIX)
                .unwrap_or(&info.name);
            ListedContainer {
                project: display_name(fragment),
                container: info.name.clone(),
                status: info.status,
                ports: info.ports,
            }
        })
        .collect();
    Ok(ListResult { containers })
}

/// Result of `moor logs` without `--follow`.
#[derive(Debug, Serialize)]
pub struct LogsResult {
    pub container: String,
    pub text: String,
}

impl Output for LogsResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        self.text.trim_end().to_string()
    }
}

/// Print or stream a project's container logs.
///
/// With `follow`, streams directly to the terminal until the user interrupts
/// and returns `None`; otherwise returns the captured tail.
pub fn logs(project: &str, follow: bool, tail: u32) -> Result<Option<LogsResult>> {
    let project = ProjectPath::parse(project)?;
    let name = project.container_name();
    let docker = Docker::new();

    if !docker.is_running(&name)? {
        return Err(Error::NotFound(format!(
            "no running container for project '{}'",
            project.display()
        )));
    }

    if follow {
        docker.follow_logs(&name, Some(tail))?;
        return Ok(None);
    }

    let text = docker.logs_tail(&name, tail)?;
    Ok(Some(LogsResult { container: name, text }))
}

/// Result of `moor info`.
#[derive(Debug, Serialize)]
pub struct InfoResult {
    pub project: String,
    pub container: String,
    pub port: u16,
    pub url: String,
    pub directory: PathBuf,
    pub directory_exists: bool,
    pub settings: Vec<String>,
    pub warnings: Vec<String>,
}

impl Output for InfoResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.push(format!("Project:   {}", self.project));
        lines.push(format!("Container: {}", self.container));
        lines.push(format!("Port:      {}", self.port));
        lines.push(format!("URL:       {}", self.url));
        let marker = if self.directory_exists { "" } else { " (missing)" };
        lines.push(format!("Directory: {}{}", self.directory.display(), marker));
        if self.settings.is_empty() {
            lines.push("Settings:  (none)".to_string());
        } else {
            lines.push("Settings:".to_string());
            for setting in &self.settings {
                lines.push(format!("  {}", setting));
            }
        }
        lines.join("\n")
    }
}

/// Show the resolved identity and configuration for a project.
///
/// Touches neither Docker nor the network; safe to run anywhere.
pub fn info(projects_root: &Path, project: &str) -> Result<InfoResult> {
    let project = ProjectPath::parse(project)?;
    let directory = project.directory(projects_root);
    let port = project.port();
    let (config, warnings) = resolve_for(&project, &directory);

    Ok(InfoResult {
        project: project.display(),
        container: project.container_name(),
        port,
        url: format!("http://localhost:{}", port),
        directory_exists: directory.is_dir(),
        directory,
        settings: config.display_lines(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    })
}

/// One discovered config file location for `moor config show`.
#[derive(Debug, Serialize)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub layer: String,
    pub exists: bool,
}

/// Result of `moor config show`.
#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub files: Vec<ConfigFile>,
    pub settings: Vec<String>,
    pub warnings: Vec<String>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.push("Files:".to_string());
        for file in &self.files {
            let marker = if file.exists { "" } else { " (absent)" };
            lines.push(format!("  {:<8} {}{}", file.layer, file.path.display(), marker));
        }
        if self.settings.is_empty() {
            lines.push("Settings: (none)".to_string());
        } else {
            lines.push("Settings:".to_string());
            for setting in &self.settings {
                lines.push(format!("  {}", setting));
            }
        }
        lines.join("\n")
    }
}

/// Show resolved configuration, optionally for a specific project.
pub fn config_show(projects_root: &Path, project: Option<&str>) -> Result<ConfigShowResult> {
    let (paths, config, warnings) = match project {
        Some(raw) => {
            let project = ProjectPath::parse(raw)?;
            let directory = project.directory(projects_root);
            let paths = config_paths_for(&project, &directory);
            let env = config::env_snapshot();
            let (config, warnings) = config::resolve_config(&paths, &env);
            (paths, config, warnings)
        }
        None => {
            let paths = ConfigPaths::discover(None);
            let env = config::env_snapshot();
            let (config, warnings) = config::resolve_config(&paths, &env);
            (paths, config, warnings)
        }
    };

    let mut files = vec![ConfigFile {
        path: paths.system.clone(),
        layer: "system".to_string(),
        exists: paths.system.exists(),
    }];
    if let Some(ref user) = paths.user {
        files.push(ConfigFile {
            path: user.clone(),
            layer: "user".to_string(),
            exists: user.exists(),
        });
    }
    if let Some(ref project) = paths.project {
        files.push(ConfigFile {
            path: project.clone(),
            layer: "project".to_string(),
            exists: project.exists(),
        });
    }

    Ok(ConfigShowResult {
        files,
        settings: config.display_lines(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    })
}

/// Result of `moor config edit`.
#[derive(Debug, Serialize)]
pub struct ConfigEditResult {
    pub path: PathBuf,
}

impl Output for ConfigEditResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!("Edited {}", self.path.display())
    }
}

/// Open the user-global config file in the user's editor.
pub fn config_edit() -> Result<ConfigEditResult> {
    let paths = ConfigPaths::discover(None);
    let path = paths
        .user_path()
        .ok_or_else(|| Error::Other("could not determine home directory".to_string()))?
        .to_path_buf();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let status = std::process::Command::new(&editor).arg(&path).status()?;
    if !status.success() {
        return Err(Error::Other(format!("editor '{}' exited non-zero", editor)));
    }

    Ok(ConfigEditResult { path })
}

/// Config file locations for a project, skipping the project layer for the
/// projects-root sentinel.
fn config_paths_for(project: &ProjectPath, directory: &Path) -> ConfigPaths {
    match project {
        ProjectPath::Root => ConfigPaths::discover(None),
        _ => ConfigPaths::discover(Some(directory)),
    }
}

fn resolve_for(project: &ProjectPath, directory: &Path) -> (ResolvedConfig, Vec<Warning>) {
    let paths = config_paths_for(project, directory);
    let env = config::env_snapshot();
    config::resolve_config(&paths, &env)
}

/// The environment handed to `docker run`, with launch-time defaults filled
/// in for anything neither configured nor present in the environment.
fn launch_environment(config: &ResolvedConfig, directory: &Path) -> Vec<(String, String)> {
    let mut env = config.env_pairs();

    if config.get("SANDBOX_RUNTIME_CONTAINER_IMAGE").is_none() {
        env.push((
            "SANDBOX_RUNTIME_CONTAINER_IMAGE".to_string(),
            DEFAULT_RUNTIME_IMAGE.to_string(),
        ));
    }
    if config.get("SANDBOX_VOLUMES").is_none() {
        env.push((
            "SANDBOX_VOLUMES".to_string(),
            format!("{}:/workspace:rw", directory.display()),
        ));
    }
    #[cfg(unix)]
    if config.get("SANDBOX_USER_ID").is_none() {
        env.push((
            "SANDBOX_USER_ID".to_string(),
            nix::unistd::getuid().as_raw().to_string(),
        ));
    }

    env
}
