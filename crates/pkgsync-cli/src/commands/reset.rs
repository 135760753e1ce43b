//! Reset command implementation

use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::host::FileSessionStore;

/// Run the reset command
///
/// Ends the session: the resolution state and every recorded consent go away.
pub fn run_reset(root: &Path) -> Result<()> {
    let mut session = FileSessionStore::open(root);
    session.clear()?;
    println!(
        "{} Session cleared ({}); the next resolve runs a full pass.",
        "OK".green().bold(),
        session.path()
    );
    Ok(())
}
