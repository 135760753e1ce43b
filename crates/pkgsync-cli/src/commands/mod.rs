//! Command implementations for pkgsync-cli

pub mod dirty;
pub mod new;
pub mod registries;
pub mod relocate;
pub mod reset;
pub mod resolve;
pub mod status;

pub use dirty::run_mark_dirty;
pub use new::run_new;
pub use registries::run_add_registries;
pub use relocate::run_relocate;
pub use reset::run_reset;
pub use resolve::run_resolve;
pub use status::run_status;

use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use pkgsync_core::{Host, PassReport, PassStatus, ResolutionOrchestrator, ResolverConfig};
use pkgsync_fs::NormalizedPath;

use crate::error::Result;
use crate::host::{DirectoryIndex, FileSessionStore, NoReload, ShellInvoker, TerminalPrompt};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Build an orchestrator over the project at `root` with the terminal host.
pub fn orchestrator(root: &Path, config: ResolverConfig, assume_yes: bool) -> ResolutionOrchestrator {
    let project = NormalizedPath::new(root);
    let host = Host {
        index: Box::new(DirectoryIndex::new(
            project.join(&config.packages_root),
            config.package_manifest.clone(),
        )),
        filesystem: Box::new(pkgsync_core::LocalFilesystem::new(project.clone())),
        prompt: Box::new(TerminalPrompt::new(assume_yes)),
        invoker: Box::new(ShellInvoker::new(config.actions.clone(), root)),
        session: Box::new(FileSessionStore::open(root)),
        reload: Rc::new(NoReload),
    };
    ResolutionOrchestrator::new(project, config, host)
}

/// Load the project's pkgsync config file, or defaults.
pub fn load_config(root: &Path) -> Result<ResolverConfig> {
    Ok(ResolverConfig::load(&NormalizedPath::new(root))?)
}

/// Tick until the running operation finishes. `None` if nothing was started.
pub fn drive(orchestrator: &mut ResolutionOrchestrator) -> Result<Option<PassReport>> {
    loop {
        match orchestrator.tick() {
            PassStatus::Idle => return Ok(None),
            PassStatus::Running => thread::sleep(POLL_INTERVAL),
            PassStatus::Finished(result) => return Ok(Some(result?)),
        }
    }
}
