//! Status command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use pkgsync_core::{ResolutionState, ResolverConfig};
use pkgsync_fs::NormalizedPath;
use pkgsync_manifest::{DocumentStore, RegistryEntry, registries_from_document};

use super::load_config;
use crate::error::Result;
use crate::host::FileSessionStore;

#[derive(Debug, Serialize)]
struct StatusReport {
    project: String,
    state: ResolutionState,
    project_manifest: String,
    manifest_exists: bool,
    registries: Vec<RegistryEntry>,
}

/// Run the status command
pub fn run_status(root: &Path, json: bool) -> Result<()> {
    let config = load_config(root)?;
    let report = collect(root, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Project Status".bold());
    println!();
    println!("{}:      {}", "Path".dimmed(), report.project);
    println!("{}:     {}", "State".dimmed(), colored_state(report.state));
    println!("{}:  {}", "Manifest".dimmed(), report.project_manifest);
    println!();

    println!("{}:", "Scoped Registries".bold());
    if report.registries.is_empty() {
        let hint = if report.manifest_exists { "None" } else { "None (no project manifest)" };
        println!("  {} (use {} to add)", hint.dimmed(), "pkgsync add-registries".cyan());
    } else {
        for registry in &report.registries {
            println!(
                "  {} {} {} [{}]",
                "+".green(),
                registry.name.cyan(),
                registry.url.dimmed(),
                registry.scopes().join(", ")
            );
        }
    }
    Ok(())
}

fn collect(root: &Path, config: &ResolverConfig) -> Result<StatusReport> {
    let session = FileSessionStore::open(root);
    let manifest_path = NormalizedPath::new(root).join(&config.project_manifest);
    let manifest = DocumentStore::new().load_or_empty(&manifest_path)?;

    Ok(StatusReport {
        project: root.display().to_string(),
        state: ResolutionState::load(&session),
        project_manifest: config.project_manifest.clone(),
        manifest_exists: manifest_path.exists(),
        registries: registries_from_document(&manifest)?,
    })
}

fn colored_state(state: ResolutionState) -> colored::ColoredString {
    match state {
        ResolutionState::Done => state.to_string().green(),
        ResolutionState::InProgress => state.to_string().yellow(),
        ResolutionState::Pending => state.to_string().dimmed(),
    }
}
