//! Common test utilities for moorage integration tests.
//!
//! Provides `TestEnv` for isolated test environments: a temporary projects
//! root, temporary config file locations, and a recording `docker` stub
//! wired up via `MOOR_DOCKER`, so tests never touch a real Docker daemon or
//! the user's `~/.openhands/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
pub use tempfile::TempDir;

/// Shell stub standing in for the docker binary.
///
/// Appends every invocation to `MOOR_DOCKER_LOG` and answers `ps`/`run`/
/// `logs` from the `MOOR_STUB_PS`/`MOOR_STUB_LOGS` environment variables.
const DOCKER_STUB: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "$MOOR_DOCKER_LOG"
case "$1" in
  ps)
    [ -n "$MOOR_STUB_PS" ] && printf '%s\n' "$MOOR_STUB_PS"
    ;;
  run)
    echo "stubcontainerid"
    ;;
  logs)
    [ -n "$MOOR_STUB_LOGS" ] && printf '%s\n' "$MOOR_STUB_LOGS"
    ;;
esac
exit 0
"#;

/// A test environment with isolated projects root, config, and docker stub.
pub struct TestEnv {
    pub projects_dir: TempDir,
    pub config_dir: TempDir,
    pub stub_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with the docker stub installed.
    pub fn new() -> Self {
        let env = Self {
            projects_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            stub_dir: TempDir::new().unwrap(),
        };
        let stub = env.docker_stub_path();
        fs::write(&stub, DOCKER_STUB).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();
        }
        env
    }

    /// Get a Command for the moor binary with the isolated environment.
    ///
    /// All overrides are set per-command, making tests parallel-safe. The
    /// recognized target environment variables are scrubbed so values from
    /// the outer test environment cannot leak into resolution.
    pub fn moor(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_moor"));
        cmd.env("MOOR_PROJECTS_ROOT", self.projects_dir.path());
        cmd.env("MOOR_SYSTEM_CONFIG", self.system_config_path());
        cmd.env("MOOR_USER_CONFIG", self.user_config_path());
        cmd.env("MOOR_DOCKER", self.docker_stub_path());
        cmd.env("MOOR_DOCKER_LOG", self.docker_log_path());
        for key in moorage::config::RECOGNIZED_KEYS {
            cmd.env_remove(key.target);
        }
        cmd
    }

    /// Create a project directory under the projects root.
    pub fn create_project(&self, relative: &str) -> PathBuf {
        let dir = self.projects_dir.path().join(relative);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn system_config_path(&self) -> PathBuf {
        self.config_dir.path().join("system.toml")
    }

    pub fn user_config_path(&self) -> PathBuf {
        self.config_dir.path().join("user.toml")
    }

    pub fn docker_stub_path(&self) -> PathBuf {
        self.stub_dir.path().join("docker")
    }

    pub fn docker_log_path(&self) -> PathBuf {
        self.stub_dir.path().join("docker.log")
    }

    /// Write the system-layer config file with owner-only permissions.
    pub fn write_system_config(&self, contents: &str) {
        write_owner_only(&self.system_config_path(), contents);
    }

    /// Write the user-layer config file with owner-only permissions.
    pub fn write_user_config(&self, contents: &str) {
        write_owner_only(&self.user_config_path(), contents);
    }

    /// Write a project-local config file with owner-only permissions.
    pub fn write_project_config(&self, relative: &str, contents: &str) {
        let dir = self.create_project(relative).join(".openhands");
        fs::create_dir_all(&dir).unwrap();
        write_owner_only(&dir.join("config.toml"), contents);
    }

    /// Everything the docker stub has been invoked with, one line per call.
    pub fn docker_log(&self) -> String {
        fs::read_to_string(self.docker_log_path()).unwrap_or_default()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_owner_only(path: &std::path::Path, contents: &str) {
    fs::write(path, contents).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).unwrap();
    }
}
