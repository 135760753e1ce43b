//! Resolution orchestration for pkgsync
//!
//! This crate drives the resolution pass over a project:
//!
//! - **Relocation**: stray packages in the unmanaged tree move under the packages root
//! - **Resource packages**: declared payloads are copied or static methods invoked, after one confirmation
//! - **Registry aggregation**: scoped registries from every package fold into the project manifest
//! - **Session state**: a pass completes at most once per host session and restarts if interrupted
//! - **Package generation**: new packages are scaffolded under the packages root
//!
//! # Architecture
//!
//! ```text
//!                 host (CLI / editor)
//!                        |
//!                  pkgsync-core
//!                   |         |
//!          pkgsync-manifest   |
//!                   |         |
//!                  pkgsync-fs-+
//! ```
//!
//! The host supplies its collaborators through the traits in [`host`].
//!
//! # Example
//!
//! ```ignore
//! use pkgsync_core::{Host, PassStatus, ResolutionOrchestrator, ResolverConfig};
//!
//! let mut orchestrator = ResolutionOrchestrator::new(root, ResolverConfig::default(), host);
//! orchestrator.on_startup();
//! loop {
//!     match orchestrator.tick() {
//!         PassStatus::Running => continue,
//!         PassStatus::Finished(report) => break report,
//!         PassStatus::Idle => break Ok(Default::default()),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod host;
pub mod orchestrator;
pub mod relocate;
pub mod state;

pub use config::{CONFIG_FILENAME, CONFIG_FILENAMES, ResolverConfig};
pub use error::{Error, Result};
pub use generate::{
    AssemblyDefinition, Author, GeneratedPackage, GeneratorOptions, PackageDefinition, PackageFolder,
    PackageGenerator, validate_package_name,
};
pub use host::{
    ConfirmationPrompt, CountingReloadHost, FixedIndex, FnInvoker, IndexRequest, InstalledPackage,
    LocalFilesystem, MemorySessionStore, PackageIndex, ProjectFilesystem, ReloadHost, RequestStatus,
    ScriptedPrompt, SessionStore, StaticInvoker,
};
pub use orchestrator::{Host, PassReport, PassStatus, ResolutionOrchestrator};
pub use relocate::{is_stray_manifest, relocate_stray_packages};
pub use state::{BusyCounter, BusyGuard, RESOLUTION_STATE_KEY, ResolutionState};
