//! Docker command generation.
//!
//! This module provides a builder for generating docker CLI argument
//! vectors. It does not execute commands, only generates them; execution
//! lives in [`crate::docker::Docker`].

/// Builder for generating docker command invocations.
#[derive(Debug, Clone)]
pub struct DockerCommand {
    args: Vec<String>,
}

impl DockerCommand {
    /// Create a new docker command builder.
    fn new(command: &str) -> Self {
        Self { args: vec![command.to_string()] }
    }

    /// Add a flag to the command.
    fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    /// Add a flag with a value to the command.
    fn flag_with_value(mut self, flag: &str, value: &str) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.to_string());
        self
    }

    /// Add an argument to the command.
    fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Build the display form of the command.
    pub fn build(&self) -> String {
        format!("docker {}", self.args.join(" "))
    }

    /// Get the arguments for execution (without the program name).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// List running containers whose name starts with `prefix`.
    ///
    /// # Example
    /// ```
    /// use moorage::docker::command::DockerCommand;
    /// let cmd = DockerCommand::ps_by_prefix("openhands-app-", "{{.Names}}");
    /// assert_eq!(
    ///     cmd.build(),
    ///     "docker ps --filter name=^openhands-app- --format {{.Names}}"
    /// );
    /// ```
    pub fn ps_by_prefix(prefix: &str, format: &str) -> Self {
        Self::new("ps")
            .flag_with_value("--filter", &format!("name=^{}", prefix))
            .flag_with_value("--format", format)
    }

    /// Check whether a container with exactly `name` is running.
    pub fn ps_by_name(name: &str) -> Self {
        Self::new("ps")
            .flag_with_value("--filter", &format!("name=^{}$", name))
            .flag_with_value("--format", "{{.Names}}")
    }

    /// Start a detached container.
    ///
    /// `env` pairs become `-e KEY=VALUE` flags in the given order.
    pub fn run_detached(
        name: &str,
        host_port: u16,
        container_port: u16,
        env: &[(String, String)],
        volumes: &[String],
        add_host: Option<&str>,
        gpus: bool,
        image: &str,
    ) -> Self {
        let mut cmd = Self::new("run")
            .flag("-d")
            .flag_with_value("--name", name)
            .flag_with_value("-p", &format!("{}:{}", host_port, container_port));
        for (key, value) in env {
            cmd = cmd.flag_with_value("-e", &format!("{}={}", key, value));
        }
        for volume in volumes {
            cmd = cmd.flag_with_value("-v", volume);
        }
        if let Some(mapping) = add_host {
            cmd = cmd.flag_with_value("--add-host", mapping);
        }
        if gpus {
            cmd = cmd.flag_with_value("--gpus", "all");
        }
        cmd.arg(image)
    }

    /// Stop a running container.
    pub fn stop(name: &str) -> Self {
        Self::new("stop").arg(name)
    }

    /// Force-remove a container (running or stopped).
    pub fn rm_forced(name: &str) -> Self {
        Self::new("rm").flag("-f").arg(name)
    }

    /// Fetch container logs.
    ///
    /// # Example
    /// ```
    /// use moorage::docker::command::DockerCommand;
    /// let cmd = DockerCommand::logs("openhands-app-demo", true, Some(50));
    /// assert_eq!(cmd.build(), "docker logs -f --tail 50 openhands-app-demo");
    /// ```
    pub fn logs(name: &str, follow: bool, tail: Option<u32>) -> Self {
        let mut cmd = Self::new("logs");
        if follow {
            cmd = cmd.flag("-f");
        }
        if let Some(n) = tail {
            cmd = cmd.flag_with_value("--tail", &n.to_string());
        }
        cmd.arg(name)
    }
}
