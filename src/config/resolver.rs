//! Precedence resolution for layered configuration files.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Process environment (a target variable already set is never replaced)
//! 2. Project file (`<project-dir>/.openhands/config.toml`)
//! 3. User file (`~/.openhands/config.toml`)
//! 4. System file (`/etc/openhands/config.toml`)
//!
//! All files are optional; a missing file is not an error and produces no
//! warning. A file that cannot be read or parsed is skipped with a warning
//! while the remaining files still apply. A group- or world-readable file
//! produces an advisory permissions warning without blocking its values.

use crate::config::schema::{self, RECOGNIZED_KEYS, mask_secret};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default path of the system-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/openhands/config.toml";

/// Relative path of the per-directory configuration file.
pub const CONFIG_RELATIVE_PATH: &str = ".openhands/config.toml";

/// Environment variable overriding the system config path (test seam).
pub const SYSTEM_CONFIG_ENV: &str = "MOOR_SYSTEM_CONFIG";

/// Environment variable overriding the user config path (test seam).
pub const USER_CONFIG_ENV: &str = "MOOR_USER_CONFIG";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Value from the process environment
    Environment,
    /// Value from the project-local config file
    Project,
    /// Value from the user-global config file
    User,
    /// Value from the system-wide config file
    System,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Environment => write!(f, "env"),
            ValueSource::Project => write!(f, "project"),
            ValueSource::User => write!(f, "user"),
            ValueSource::System => write!(f, "system"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Resolved {
    /// The resolved value
    pub value: String,
    /// Where the value came from
    pub source: ValueSource,
}

/// Non-fatal problems encountered during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A config file exists but could not be read
    Unreadable { path: PathBuf, detail: String },
    /// A config file could not be parsed as TOML
    Parse { path: PathBuf, detail: String },
    /// A config file is group- or world-readable
    Permissions { path: PathBuf },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Unreadable { path, detail } => {
                write!(f, "could not read {}: {}", path.display(), detail)
            }
            Warning::Parse { path, detail } => {
                write!(f, "could not parse {}: {}", path.display(), detail)
            }
            Warning::Permissions { path } => write!(
                f,
                "{} is readable by other users; recommend `chmod 600` (owner-only access)",
                path.display()
            ),
        }
    }
}

/// The discovered configuration file locations for one resolution.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// System-wide file (lowest priority)
    pub system: PathBuf,
    /// User-global file
    pub user: Option<PathBuf>,
    /// Project-local file; `None` for the projects-root sentinel
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config file locations for a project directory.
    ///
    /// Pass `None` for `project_dir` when the project is the `.` sentinel;
    /// the project layer is skipped entirely in that case.
    pub fn discover(project_dir: Option<&Path>) -> Self {
        let system = std::env::var(SYSTEM_CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(SYSTEM_CONFIG_PATH));

        let user = std::env::var(USER_CONFIG_ENV)
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(CONFIG_RELATIVE_PATH)));

        let project = project_dir.map(|dir| dir.join(CONFIG_RELATIVE_PATH));

        Self { system, user, project }
    }

    /// File locations in ascending priority order.
    fn sources(&self) -> Vec<(&Path, ValueSource)> {
        let mut sources = vec![(self.system.as_path(), ValueSource::System)];
        if let Some(ref user) = self.user {
            sources.push((user.as_path(), ValueSource::User));
        }
        if let Some(ref project) = self.project {
            sources.push((project.as_path(), ValueSource::Project));
        }
        sources
    }

    /// The user-global config file location, for `moor config edit`.
    pub fn user_path(&self) -> Option<&Path> {
        self.user.as_deref()
    }
}

/// The merged environment mapping handed to the launcher.
///
/// An explicit immutable value: resolution reads the process environment once
/// into a snapshot and nothing downstream consults ambient state.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ResolvedConfig {
    values: BTreeMap<String, Resolved>,
}

impl ResolvedConfig {
    /// Get the raw (unmasked) value bound to a target variable.
    pub fn get(&self, target: &str) -> Option<&str> {
        self.values.get(target).map(|r| r.value.as_str())
    }

    /// Whether any value resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of resolved values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over `(target, resolved)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `KEY=VALUE` pairs with raw values, for injection into a container.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    /// Display lines with secret-shaped values masked.
    ///
    /// This is the only form that may reach a human-facing output path.
    pub fn display_lines(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(target, resolved)| {
                let shown = if schema::is_secret_target(target) {
                    mask_secret(&resolved.value)
                } else {
                    resolved.value.clone()
                };
                format!("{}={} ({})", target, shown, resolved.source)
            })
            .collect()
    }

    fn insert(&mut self, target: &str, value: String, source: ValueSource) {
        self.values.insert(target.to_string(), Resolved { value, source });
    }
}

/// Snapshot the process environment once, at the start of resolution.
pub fn env_snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Resolve configuration from the discovered files plus an environment
/// snapshot.
///
/// Files merge in ascending priority; a key present in a higher-priority file
/// overwrites the same key from a lower one. The environment overlay is
/// applied last: a target variable already present in the snapshot is never
/// replaced by a file value, and environment values with no file counterpart
/// still appear. Warnings are non-fatal; one file's failure does not abort
/// the others.
pub fn resolve_config(
    paths: &ConfigPaths,
    env: &HashMap<String, String>,
) -> (ResolvedConfig, Vec<Warning>) {
    let mut config = ResolvedConfig::default();
    let mut warnings = Vec::new();

    for (path, source) in paths.sources() {
        if !path.exists() {
            continue;
        }

        if let Some(warning) = check_permissions(path) {
            warnings.push(warning);
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warnings.push(Warning::Unreadable {
                    path: path.to_path_buf(),
                    detail: err.to_string(),
                });
                continue;
            }
        };

        let value: toml::Value = match toml::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                warnings.push(Warning::Parse {
                    path: path.to_path_buf(),
                    detail: err.message().to_string(),
                });
                continue;
            }
        };

        for key in RECOGNIZED_KEYS {
            let scalar = value
                .get(key.section)
                .and_then(|section| section.get(key.name))
                .and_then(schema::scalar_to_string);
            if let Some(text) = scalar {
                config.insert(key.target, text, source);
            }
        }
    }

    // Environment always wins: overlay from the snapshot, never the reverse.
    for key in RECOGNIZED_KEYS {
        if let Some(value) = env.get(key.target) {
            config.insert(key.target, value.clone(), ValueSource::Environment);
        }
    }

    (config, warnings)
}

/// Advisory check that a config file is owner-only.
#[cfg(unix)]
fn check_permissions(path: &Path) -> Option<Warning> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).ok()?;
    let mode = metadata.permissions().mode();
    if mode & 0o044 != 0 {
        Some(Warning::Permissions { path: path.to_path_buf() })
    } else {
        None
    }
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Option<Warning> {
    None
}
