//! Add-registries command implementation

use std::path::Path;

use colored::Colorize;

use super::{drive, load_config, orchestrator};
use crate::error::{CliError, Result};

/// Run the add-registries command
///
/// Merges scoped registries only; resource packages and the resolution
/// state are left alone.
pub fn run_add_registries(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    let mut orchestrator = orchestrator(root, config, false);
    orchestrator.add_registries()?;

    let report = drive(&mut orchestrator)?
        .ok_or_else(|| CliError::user("add-registries did not run"))?;

    if report.registries.is_empty() {
        println!("{} No scoped registries declared by installed packages.", "OK".green().bold());
        return Ok(());
    }
    for registry in &report.registries {
        println!(
            "  {} {} {} [{}]",
            "+".green(),
            registry.name.cyan(),
            registry.url.dimmed(),
            registry.scopes().join(", ")
        );
    }
    let verb = if report.manifest_written { "updated" } else { "already up to date" };
    println!("{} Project manifest {}.", "OK".green().bold(), verb);
    Ok(())
}
