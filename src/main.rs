//! Moorage CLI - per-project sandboxed agent containers.

use clap::Parser;
use moorage::cli::{Cli, Commands, ConfigCommands};
use moorage::commands::{self, Output};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    // Determine projects root: --root flag > MOOR_PROJECTS_ROOT env > <home>/projects
    let projects_root = resolve_projects_root(cli.projects_root);

    if let Err(e) = run_command(cli.command, &projects_root, json) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Resolve the projects root directory.
///
/// Clap already folds in the MOOR_PROJECTS_ROOT environment variable; the
/// fallback is `<home>/projects`, or the current directory when no home
/// directory can be determined.
fn resolve_projects_root(explicit: Option<PathBuf>) -> PathBuf {
    match explicit {
        Some(path) => path,
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("projects"),
    }
}

fn run_command(command: Commands, projects_root: &Path, json: bool) -> Result<(), moorage::Error> {
    match command {
        Commands::Launch { project, image } => {
            let result = commands::launch(projects_root, &project, image)?;
            output(&result, json);
        }

        Commands::Stop { project } => {
            let result = commands::stop(&project)?;
            output(&result, json);
        }

        Commands::List => {
            let result = commands::list()?;
            output(&result, json);
        }

        Commands::Logs { project, follow, tail } => {
            // With --follow the logs stream straight to the terminal
            if let Some(result) = commands::logs(&project, follow, tail)? {
                output(&result, json);
            }
        }

        Commands::Info { project } => {
            let result = commands::info(projects_root, &project)?;
            output(&result, json);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show { project } => {
                let result = commands::config_show(projects_root, project.as_deref())?;
                output(&result, json);
            }
            ConfigCommands::Edit => {
                let result = commands::config_edit()?;
                output(&result, json);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, json: bool) {
    if json {
        println!("{}", result.to_json());
    } else {
        println!("{}", result.to_human());
    }
}
