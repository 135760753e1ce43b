//! Resolve command implementation

use std::path::Path;

use colored::Colorize;

use pkgsync_core::PassReport;

use super::{drive, load_config, orchestrator};
use crate::error::Result;

/// Run the resolve command
///
/// Without `force` a pass runs only if none has completed this session,
/// the same rule the host applies at startup.
pub fn run_resolve(root: &Path, include_optionals: bool, assume_yes: bool, force: bool) -> Result<()> {
    let mut config = load_config(root)?;
    config.include_optionals |= include_optionals;

    let mut orchestrator = orchestrator(root, config, assume_yes);
    if force {
        orchestrator.resolve_now();
    } else {
        orchestrator.on_startup();
    }

    match drive(&mut orchestrator)? {
        Some(report) => print_report(&report),
        None => println!(
            "{} Packages already resolved this session (use {} to re-run).",
            "OK".green().bold(),
            "pkgsync resolve --force".cyan()
        ),
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    for name in &report.relocated {
        println!("{} moved {} into the packages root", "+".green(), name.cyan());
    }
    for name in &report.actions_executed {
        println!("{} imported {}", "+".green(), name);
    }
    for name in &report.actions_failed {
        println!("{} failed {}", "!".red(), name);
    }
    if report.import_declined {
        println!("{} Resource import declined", "!".yellow());
    }

    println!(
        "{} Resolved {} package(s), {} scoped registr{}{}",
        "OK".green().bold(),
        report.packages_scanned,
        report.registries.len(),
        if report.registries.len() == 1 { "y" } else { "ies" },
        if report.manifest_written {
            " (project manifest updated)"
        } else {
            ""
        }
    );
}
