//! Container identity and port derivation.
//!
//! A project path maps to a Docker-legal container name fragment by replacing
//! every `/` with `__`, and to a stable host port by hashing that fragment.
//! Both directions are pure functions recomputed on every invocation; nothing
//! is persisted.
//!
//! A path segment that itself contains the literal `__` token would make the
//! inverse mapping ambiguous, so such paths are rejected at parse time.

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Escape sequence standing in for `/` inside container names.
pub const SEPARATOR_ESCAPE: &str = "__";

/// Sentinel project path meaning "the entire projects root".
pub const ROOT_SENTINEL: &str = ".";

/// Reserved name fragment for the projects-root sentinel.
pub const ROOT_FRAGMENT: &str = "projects-root";

/// Name prefix for app containers managed by moorage.
pub const APP_CONTAINER_PREFIX: &str = "openhands-app-";

/// Name prefix for the runtime side-containers spawned by the app.
pub const RUNTIME_CONTAINER_PREFIX: &str = "openhands-runtime-";

/// Default base of the host port range.
pub const DEFAULT_PORT_BASE: u16 = 3000;

/// Default width of the host port range.
pub const DEFAULT_PORT_RANGE: u16 = 1000;

/// Port the app container listens on internally.
pub const CONTAINER_PORT: u16 = 3000;

/// A validated, user-facing project identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectPath {
    /// The `.` sentinel: the entire projects root.
    Root,
    /// A slash-separated path relative to the projects root.
    Relative(String),
    /// A directory outside the projects root, identified by its basename.
    External(PathBuf),
}

impl ProjectPath {
    /// Parse a raw project argument.
    ///
    /// Rejects empty input and any path containing the literal `__` escape
    /// token, which would make the name mapping ambiguous.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidInput("project path must not be empty".to_string()));
        }
        if raw == ROOT_SENTINEL {
            return Ok(Self::Root);
        }
        if raw.contains(SEPARATOR_ESCAPE) {
            return Err(Error::InvalidInput(format!(
                "project path '{}' contains the reserved sequence '{}'",
                raw, SEPARATOR_ESCAPE
            )));
        }
        if Path::new(raw).is_absolute() {
            let path = PathBuf::from(raw);
            if path.file_name().is_none() {
                return Err(Error::InvalidInput(format!(
                    "cannot derive a project name from '{}'",
                    raw
                )));
            }
            return Ok(Self::External(path));
        }
        // Normalize away a trailing slash so `foo/` and `foo` agree
        Ok(Self::Relative(raw.trim_end_matches('/').to_string()))
    }

    /// The container-name fragment for this project.
    ///
    /// Deterministic, and invertible via [`display_name`] because paths
    /// containing the escape token are rejected at parse time.
    pub fn fragment(&self) -> String {
        match self {
            Self::Root => ROOT_FRAGMENT.to_string(),
            Self::Relative(path) => path.replace('/', SEPARATOR_ESCAPE),
            Self::External(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Full name of the app container for this project.
    pub fn container_name(&self) -> String {
        format!("{}{}", APP_CONTAINER_PREFIX, self.fragment())
    }

    /// The host port assigned to this project.
    pub fn port(&self) -> u16 {
        derive_port(&self.fragment(), DEFAULT_PORT_BASE, DEFAULT_PORT_RANGE)
    }

    /// The directory this project lives in, under the given projects root.
    pub fn directory(&self, projects_root: &Path) -> PathBuf {
        match self {
            Self::Root => projects_root.to_path_buf(),
            Self::Relative(path) => projects_root.join(path),
            Self::External(path) => path.clone(),
        }
    }

    /// Human-facing form of the path, as given by the user.
    pub fn display(&self) -> String {
        match self {
            Self::Root => ROOT_SENTINEL.to_string(),
            Self::Relative(path) => path.clone(),
            Self::External(path) => path.display().to_string(),
        }
    }
}

/// Recover the display path from a container-name fragment.
///
/// Inverse of [`ProjectPath::fragment`]: the reserved `projects-root`
/// fragment maps back to `.`, anything else has its escape sequences
/// replaced with `/`.
pub fn display_name(fragment: &str) -> String {
    if fragment == ROOT_FRAGMENT {
        ROOT_SENTINEL.to_string()
    } else {
        fragment.replace(SEPARATOR_ESCAPE, "/")
    }
}

/// Derive a deterministic port for a name within `[base, base + range)`.
///
/// Hashes the name with SHA-256 so the result is stable across processes and
/// platforms, unlike a language-runtime hash. Distinct names may collide on
/// the same port; the conflict surfaces only when `docker run` fails to bind.
pub fn derive_port(name: &str, base: u16, range: u16) -> u16 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let hash = u64::from_be_bytes(prefix);
    base + (hash % u64::from(range)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_sentinel() {
        assert_eq!(ProjectPath::parse(".").unwrap(), ProjectPath::Root);
    }

    #[test]
    fn test_parse_relative() {
        let path = ProjectPath::parse("client-work/app").unwrap();
        assert_eq!(path, ProjectPath::Relative("client-work/app".to_string()));
    }

    #[test]
    fn test_parse_trailing_slash_normalized() {
        let path = ProjectPath::parse("client-work/app/").unwrap();
        assert_eq!(path.fragment(), "client-work__app");
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!(matches!(
            ProjectPath::parse(""),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_escape_token_rejected() {
        let result = ProjectPath::parse("weird__name/app");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_external_absolute() {
        let path = ProjectPath::parse("/srv/work/demo").unwrap();
        assert_eq!(path, ProjectPath::External(PathBuf::from("/srv/work/demo")));
        assert_eq!(path.fragment(), "demo");
    }

    #[test]
    fn test_fragment_escapes_separators() {
        let path = ProjectPath::parse("client-work/app").unwrap();
        assert_eq!(path.fragment(), "client-work__app");
    }

    #[test]
    fn test_fragment_root() {
        assert_eq!(ProjectPath::Root.fragment(), "projects-root");
    }

    #[test]
    fn test_container_name() {
        let path = ProjectPath::parse("client-work/app").unwrap();
        assert_eq!(path.container_name(), "openhands-app-client-work__app");
    }

    #[test]
    fn test_display_name_round_trip() {
        for raw in ["client-work/app", "solo", "a/b/c"] {
            let path = ProjectPath::parse(raw).unwrap();
            assert_eq!(display_name(&path.fragment()), raw);
        }
    }

    #[test]
    fn test_display_name_root_fragment() {
        assert_eq!(display_name("projects-root"), ".");
    }

    #[test]
    fn test_directory_resolution() {
        let root = Path::new("/home/user/projects");
        assert_eq!(
            ProjectPath::Root.directory(root),
            PathBuf::from("/home/user/projects")
        );
        let rel = ProjectPath::parse("client-work/app").unwrap();
        assert_eq!(
            rel.directory(root),
            PathBuf::from("/home/user/projects/client-work/app")
        );
        let ext = ProjectPath::parse("/srv/demo").unwrap();
        assert_eq!(ext.directory(root), PathBuf::from("/srv/demo"));
    }

    #[test]
    fn test_derive_port_in_range() {
        for name in ["a", "client-work__app", "projects-root", "x/y/z"] {
            let port = derive_port(name, 3000, 1000);
            assert!((3000..4000).contains(&port), "port {} out of range", port);
        }
    }

    #[test]
    fn test_derive_port_deterministic() {
        let first = derive_port("client-work__app", 3000, 1000);
        for _ in 0..10 {
            assert_eq!(derive_port("client-work__app", 3000, 1000), first);
        }
    }

    #[test]
    fn test_derive_port_distinct_names_may_collide() {
        // No uniqueness guarantee exists; only range and determinism hold.
        let a = derive_port("alpha", 3000, 1000);
        let b = derive_port("beta", 3000, 1000);
        assert!((3000..4000).contains(&a));
        assert!((3000..4000).contains(&b));
    }
}
