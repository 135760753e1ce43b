//! Relocate command implementation

use std::path::Path;

use colored::Colorize;

use super::{load_config, orchestrator};
use crate::error::Result;

/// Run the relocate command
pub fn run_relocate(root: &Path) -> Result<()> {
    let config = load_config(root)?;
    let packages_root = config.packages_root.clone();
    let mut orchestrator = orchestrator(root, config, false);

    let moved = orchestrator.relocate_stray_packages()?;
    if moved.is_empty() {
        println!("{} No stray packages found.", "OK".green().bold());
    }
    for name in &moved {
        println!("{} moved {} into {}", "+".green(), name.cyan(), packages_root);
    }
    Ok(())
}
