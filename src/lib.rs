//! Moorage - per-project sandboxed agent containers.
//!
//! This library provides the core functionality for the `moor` CLI tool:
//! deriving stable container identities and ports from project paths,
//! resolving layered TOML configuration into the environment injected into
//! a launched container, and wrapping the Docker CLI for the single-container
//! lifecycle (launch, stop, list, logs).

pub mod cli;
pub mod commands;
pub mod config;
pub mod docker;
pub mod identity;

/// Library-level error type for Moorage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Container '{name}' is already running. Stop it first with `moor stop {project}`")]
    AlreadyRunning { name: String, project: String },

    #[error("Docker is unavailable: {0}. Is the Docker daemon running?")]
    DockerUnavailable(String),

    #[error("Docker command failed: {0}")]
    DockerFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Moorage operations.
pub type Result<T> = std::result::Result<T, Error>;
