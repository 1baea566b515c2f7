//! CLI argument definitions for Moorage.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Moorage - per-project sandboxed agent containers.
///
/// Start with `moor launch <project>` to bring up a sandbox, then
/// `moor list` to see what is running.
#[derive(Parser, Debug)]
#[command(name = "moor")]
#[command(author, version, about = "Launch per-project sandboxed agent containers", long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (", env!("MOOR_GIT_COMMIT"), ", built ", env!("MOOR_BUILD_TIMESTAMP"), ")"
))]
pub struct Cli {
    /// Output in JSON format instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Projects root directory that relative project paths resolve under.
    /// Can also be set via MOOR_PROJECTS_ROOT. Default: <home>/projects.
    #[arg(short = 'R', long = "root", global = true, env = "MOOR_PROJECTS_ROOT")]
    pub projects_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the sandbox container for a project
    ///
    /// The project is a path relative to the projects root, `.` for the
    /// entire root, or an absolute path to an external directory.
    Launch {
        /// Project path (e.g. client-work/app)
        project: String,

        /// App container image override
        #[arg(long)]
        image: Option<String>,
    },

    /// Stop a project's sandbox container (and its runtime pair)
    Stop {
        /// Project path
        project: String,
    },

    /// List running sandbox containers
    List,

    /// Show a project's container logs
    Logs {
        /// Project path
        project: String,

        /// Stream logs until interrupted
        #[arg(short, long)]
        follow: bool,

        /// Number of history lines to show
        #[arg(long, default_value = "100")]
        tail: u32,
    },

    /// Show the resolved identity and settings for a project (no Docker)
    Info {
        /// Project path
        project: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration with sources and masked secrets
    Show {
        /// Project path whose project-local file should be included
        project: Option<String>,
    },

    /// Open the user config file in $VISUAL/$EDITOR
    Edit,
}
