//! pkgsync CLI
//!
//! A terminal host for the resolution pass: packages are discovered on disk,
//! session flags live in `.pkgsync/session.json` and resource actions backed
//! by `[actions]` run as shell commands.

mod cli;
mod commands;
mod context;
mod error;
mod host;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} Scoped registry and resource package resolver", "pkgsync".green().bold());
        println!();
        println!("Run {} for available commands.", "pkgsync --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let root = context::project_root(cli.project.as_deref(), &cwd);
    tracing::debug!(project = %root.display(), "Using project root");

    match command {
        Commands::Resolve {
            include_optionals,
            yes,
            force,
        } => commands::run_resolve(&root, include_optionals, yes, force),
        Commands::AddRegistries => commands::run_add_registries(&root),
        Commands::Relocate => commands::run_relocate(&root),
        Commands::Status { json } => commands::run_status(&root, json),
        Commands::Reset => commands::run_reset(&root),
        Commands::MarkDirty { paths } => commands::run_mark_dirty(&root, &paths),
        Commands::New(args) => commands::run_new(&root, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgsync_test_utils::TestProject;

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_resolve_with_temp_project() {
        let project = TestProject::new();
        project.add_package(
            "com.acme.a",
            r#"{ "scopedRegistries": [ { "name": "Acme", "url": "https://acme", "scopes": ["com.acme"] } ] }"#,
        );

        commands::run_resolve(project.root(), false, true, false).unwrap();

        let manifest = project.read_json("Packages/manifest.json");
        assert_eq!(manifest["scopedRegistries"][0]["name"], "Acme");
    }

    #[test]
    fn test_reset_without_session() {
        let project = TestProject::new();
        assert!(commands::run_reset(project.root()).is_ok());
    }

    #[test]
    fn test_status_on_empty_project() {
        let project = TestProject::new();
        assert!(commands::run_status(project.root(), true).is_ok());
    }
}
