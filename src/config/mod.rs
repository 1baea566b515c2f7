//! Layered TOML configuration for launched containers.
//!
//! Configuration merges from three optional files (system, user, project) in
//! ascending priority, then overlays the process environment, which always
//! wins. The resolved result is an explicit immutable mapping handed to the
//! launcher; nothing downstream reads ambient environment state.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigPaths, Resolved, ResolvedConfig, ValueSource, Warning, env_snapshot, resolve_config,
};
pub use schema::{ConfigKey, RECOGNIZED_KEYS, mask_secret};
