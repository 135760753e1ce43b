//! Mark-dirty command implementation

use std::path::Path;

use colored::Colorize;

use pkgsync_fs::NormalizedPath;

use super::{load_config, orchestrator};
use crate::error::Result;

/// Run the mark-dirty command
pub fn run_mark_dirty(root: &Path, paths: &[String]) -> Result<()> {
    let config = load_config(root)?;
    let mut orchestrator = orchestrator(root, config, false);

    let before = orchestrator.state();
    let imported: Vec<NormalizedPath> = paths.iter().map(NormalizedPath::new).collect();
    orchestrator.mark_project_dirty(&imported);
    let after = orchestrator.state();

    if before != after {
        println!(
            "{} New package content detected; resolution state is now {}.",
            "=>".blue().bold(),
            after.to_string().yellow()
        );
    } else {
        println!("{} Resolution state unchanged ({}).", "OK".green().bold(), after);
    }
    Ok(())
}
