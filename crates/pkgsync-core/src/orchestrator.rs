//! The resolution pass.
//!
//! A pass relocates stray packages, lists installed packages through the
//! host's index, materializes the resource packages they declare and folds
//! their scoped registries into the project manifest.
//!
//! The host drives everything from one thread: a trigger starts a pass,
//! then [`ResolutionOrchestrator::tick`] is called periodically until the
//! index request completes and the pass finishes. Between ticks the
//! orchestrator holds the busy guard but performs no file I/O.
//!
//! Within a pass resource actions execute before the registry merge, so the
//! project manifest is written last.

use std::rc::Rc;

use serde::Serialize;

use pkgsync_fs::{NormalizedPath, io};
use pkgsync_manifest::{
    DocumentStore, ManifestDocument, RegistryEntry, ResourceAction, ResourcePackageEntry,
    ResourcePackageResolver, ResourceResolution, apply_registries, owning_package_name,
    registries_from_document,
};

use crate::config::ResolverConfig;
use crate::host::{
    ConfirmationPrompt, IndexRequest, InstalledPackage, PackageIndex, ProjectFilesystem,
    ReloadHost, RequestStatus, SessionStore, StaticInvoker,
};
use crate::relocate::{is_stray_manifest, relocate_stray_packages};
use crate::state::{BusyCounter, BusyGuard, ResolutionState, has_consent, record_consent};
use crate::{Error, Result};

const CONFIRM_TITLE: &str = "Import Resources";

/// The host collaborators an orchestrator is built from.
pub struct Host {
    pub index: Box<dyn PackageIndex>,
    pub filesystem: Box<dyn ProjectFilesystem>,
    pub prompt: Box<dyn ConfirmationPrompt>,
    pub invoker: Box<dyn StaticInvoker>,
    pub session: Box<dyn SessionStore>,
    pub reload: Rc<dyn ReloadHost>,
}

/// Summary of a finished pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    /// Stray packages moved into the packages root.
    pub relocated: Vec<String>,
    /// Installed packages whose manifests were read.
    pub packages_scanned: usize,
    /// Packages that declared resource packages.
    pub resource_packages: Vec<String>,
    /// Display names of resource actions that ran.
    pub actions_executed: Vec<String>,
    /// Display names of resource actions that failed.
    pub actions_failed: Vec<String>,
    /// The user declined the resource import.
    pub import_declined: bool,
    /// Registry list of the project manifest after the merge.
    pub registries: Vec<RegistryEntry>,
    /// Whether the project manifest was rewritten.
    pub manifest_written: bool,
}

/// Progress of the current operation, as returned by [`ResolutionOrchestrator::tick`].
#[derive(Debug)]
pub enum PassStatus {
    /// Nothing is running.
    Idle,
    /// Waiting on the package index.
    Running,
    /// The operation finished on this tick.
    Finished(Result<PassReport>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKind {
    /// Relocation, resources and registries; drives [`ResolutionState`].
    Full,
    /// Registry merge only.
    RegistriesOnly,
}

enum Phase {
    Idle,
    Listing {
        kind: PassKind,
        request: Box<dyn IndexRequest>,
        relocated: Vec<String>,
        _busy: BusyGuard,
    },
}

struct LoadedPackage {
    name: String,
    manifest: ManifestDocument,
}

/// Drives resolution passes against a host.
pub struct ResolutionOrchestrator {
    project_root: NormalizedPath,
    config: ResolverConfig,
    host: Host,
    busy: BusyCounter,
    store: DocumentStore,
    phase: Phase,
}

impl ResolutionOrchestrator {
    pub fn new(project_root: impl Into<NormalizedPath>, config: ResolverConfig, host: Host) -> Self {
        let busy = BusyCounter::new(Rc::clone(&host.reload));
        Self {
            project_root: project_root.into(),
            config,
            host,
            busy,
            store: DocumentStore::new(),
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Persisted state of the full pass for this session.
    pub fn state(&self) -> ResolutionState {
        ResolutionState::load(self.host.session.as_ref())
    }

    /// Whether any operation holds the busy guard.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Host startup hook: start a pass unless one already completed this session.
    ///
    /// A state left `InProgress` by an interrupted session restarts the pass.
    pub fn on_startup(&mut self) {
        let state = self.state();
        if state == ResolutionState::Done {
            tracing::debug!("Packages already resolved this session");
            return;
        }
        if state == ResolutionState::InProgress {
            tracing::info!("Previous resolve-packages pass did not complete, restarting");
        }
        self.resolve_now();
    }

    /// Start a full pass. Ignored while another operation is running.
    pub fn resolve_now(&mut self) {
        if self.is_busy() {
            tracing::debug!("Resolve requested while busy, ignoring");
            return;
        }
        self.begin(PassKind::Full);
    }

    /// Start a registry-only merge. Does not touch [`ResolutionState`].
    pub fn add_registries(&mut self) -> Result<()> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        self.begin(PassKind::RegistriesOnly);
        Ok(())
    }

    /// Move stray packages into the packages root right away.
    pub fn relocate_stray_packages(&mut self) -> Result<Vec<String>> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        let _busy = self.busy.acquire();
        Ok(relocate_stray_packages(self.host.filesystem.as_ref(), &self.config))
    }

    /// Host hook for newly imported content.
    ///
    /// A package manifest appearing under the unmanaged root clears the
    /// session state so the next startup resolves again. Ignored while busy,
    /// since the running operation is the likely source of the import.
    pub fn mark_project_dirty(&mut self, imported: &[NormalizedPath]) {
        if self.is_busy() {
            return;
        }
        if let Some(path) = imported.iter().find(|p| is_stray_manifest(p, &self.config)) {
            tracing::info!(manifest = %path, "New package content detected, resolution state reset");
            self.host.session.erase(crate::state::RESOLUTION_STATE_KEY);
        }
    }

    /// Advance the running operation. Call from the host's periodic callback.
    pub fn tick(&mut self) -> PassStatus {
        let Phase::Listing { request, .. } = &mut self.phase else {
            return PassStatus::Idle;
        };
        let packages = match request.poll() {
            RequestStatus::Pending => return PassStatus::Running,
            RequestStatus::Completed(Ok(packages)) => packages,
            RequestStatus::Completed(Err(message)) => {
                tracing::warn!("Package index request failed, treating as no packages: {}", message);
                Vec::new()
            }
        };

        let Phase::Listing {
            kind,
            relocated,
            _busy,
            ..
        } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return PassStatus::Idle;
        };

        let result = match kind {
            PassKind::Full => self.finish_full_pass(&packages, relocated),
            PassKind::RegistriesOnly => self.finish_registries_only(&packages),
        };
        // _busy drops here, releasing the reload lock on every outcome
        PassStatus::Finished(result)
    }

    fn begin(&mut self, kind: PassKind) {
        let busy = self.busy.acquire();

        let mut relocated = Vec::new();
        if kind == PassKind::Full {
            self.set_state(ResolutionState::InProgress);
            if self.config.relocate_stray_packages {
                relocated = relocate_stray_packages(self.host.filesystem.as_ref(), &self.config);
            }
        } else {
            tracing::info!("Started add-registries operation");
        }

        let request = self.host.index.list_installed();
        self.phase = Phase::Listing {
            kind,
            request,
            relocated,
            _busy: busy,
        };
    }

    fn set_state(&mut self, state: ResolutionState) {
        state.store(self.host.session.as_mut());
        match state {
            ResolutionState::InProgress => tracing::info!("Started resolve-packages pass"),
            ResolutionState::Done => tracing::info!("Completed resolve-packages pass"),
            ResolutionState::Pending => {}
        }
    }

    fn finish_full_pass(&mut self, packages: &[InstalledPackage], relocated: Vec<String>) -> Result<PassReport> {
        let mut report = PassReport {
            relocated,
            ..PassReport::default()
        };

        if packages.is_empty() {
            self.set_state(ResolutionState::Done);
            return Ok(report);
        }

        let loaded = self.load_packages(packages);
        report.packages_scanned = loaded.len();

        let resolution = self.resolve_resources(&loaded);
        report.resource_packages = resolution.packages.clone();
        if !resolution.is_empty() {
            match self.confirm_import(&resolution) {
                Ok(()) => self.execute_actions(&resolution.entries, &mut report),
                Err(e) => {
                    tracing::warn!("Resource import skipped: {}", e);
                    report.import_declined = true;
                }
            }
        }

        if let Err(e) = self.merge_registries(&loaded, &mut report) {
            tracing::error!("Resolve-packages pass failed: {}", e);
            return Err(e);
        }

        self.set_state(ResolutionState::Done);
        Ok(report)
    }

    fn finish_registries_only(&mut self, packages: &[InstalledPackage]) -> Result<PassReport> {
        let mut report = PassReport::default();
        let loaded = self.load_packages(packages);
        report.packages_scanned = loaded.len();
        let result = self.merge_registries(&loaded, &mut report);
        match &result {
            Ok(()) => tracing::info!("Completed add-registries operation"),
            Err(e) => tracing::error!("Add-registries operation failed: {}", e),
        }
        result.map(|()| report)
    }

    /// Read each package manifest, skipping packages whose manifest fails.
    fn load_packages(&self, packages: &[InstalledPackage]) -> Vec<LoadedPackage> {
        packages
            .iter()
            .filter_map(|package| {
                let root = self.absolute(&package.resolved_root);
                let path = root.join(&self.config.package_manifest);
                match self.store.load(&path) {
                    Ok(manifest) => Some(LoadedPackage {
                        name: owning_package_name(&root),
                        manifest,
                    }),
                    Err(e) => {
                        tracing::warn!(package = %package.name, "Skipping package: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    fn resolve_resources(&self, loaded: &[LoadedPackage]) -> ResourceResolution {
        let resolver = ResourcePackageResolver::new(self.host.filesystem.as_ref(), &self.config.packages_root);

        let mut resolution = ResourceResolution::default();
        for package in loaded {
            match resolver.resolve_document(&package.name, &package.manifest, self.config.include_optionals) {
                Ok(found) => resolution.extend(found),
                Err(e) => tracing::warn!(package = %package.name, "Skipping resource packages: {}", e),
            }
        }
        resolution
    }

    /// Ask once for every action unless all declaring packages are consented.
    ///
    /// Consent is recorded only for packages with an entry in the prompt.
    fn confirm_import(&mut self, resolution: &ResourceResolution) -> Result<()> {
        let needs_consent = resolution.entries.iter().any(|entry| {
            !self.config.trusted_packages.contains(&entry.declared_by)
                && !has_consent(self.host.session.as_ref(), &entry.declared_by)
        });
        if !needs_consent {
            return Ok(());
        }

        let mut lines = vec!["The following resource packages are required by installed packages:".to_string()];
        lines.extend(resolution.entries.iter().map(ResourcePackageEntry::display_name));

        if !self.host.prompt.confirm(CONFIRM_TITLE, &lines) {
            return Err(Error::UserDeclined);
        }
        let mut consented: Vec<&str> = Vec::new();
        for entry in &resolution.entries {
            if !consented.contains(&entry.declared_by.as_str()) {
                consented.push(&entry.declared_by);
                record_consent(self.host.session.as_mut(), &entry.declared_by);
            }
        }
        Ok(())
    }

    /// Run every action in order; a failure is logged and the rest still run.
    fn execute_actions(&mut self, entries: &[ResourcePackageEntry], report: &mut PassReport) {
        for entry in entries {
            match self.execute_action(entry) {
                Ok(()) => {
                    tracing::info!(entry = %entry.name, package = %entry.owning_package, "Imported resource package");
                    report.actions_executed.push(entry.display_name());
                }
                Err(e) => {
                    tracing::error!(entry = %entry.name, package = %entry.owning_package, "Resource package failed: {}", e);
                    report.actions_failed.push(entry.display_name());
                }
            }
        }
    }

    fn execute_action(&mut self, entry: &ResourcePackageEntry) -> Result<()> {
        match &entry.action {
            ResourceAction::Copy { path } => {
                let destination = self.copy_destination(entry, path);
                self.host.filesystem.copy_payload(path, &destination)?;
                Ok(())
            }
            ResourceAction::Invoke { method } => self.host.invoker.invoke_static(method),
        }
    }

    /// `installPath` when declared, else the payload's final component under
    /// the unmanaged root.
    fn copy_destination(&self, entry: &ResourcePackageEntry, path: &str) -> String {
        if let Some(install_path) = &entry.install_path {
            return install_path.clone();
        }
        let leaf = NormalizedPath::new(path)
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| entry.name.clone());
        NormalizedPath::new(&self.config.unmanaged_root)
            .join(&leaf)
            .as_str()
            .to_string()
    }

    /// Fold every package's registries into the project manifest and write
    /// it once if anything changed.
    ///
    /// The manifest's sidecar lock is held from load to save, so concurrent
    /// passes over the same project never lose each other's registries.
    fn merge_registries(&self, loaded: &[LoadedPackage], report: &mut PassReport) -> Result<()> {
        let mut candidates = Vec::new();
        for package in loaded {
            match registries_from_document(&package.manifest) {
                Ok(registries) => candidates.extend(registries),
                Err(e) => tracing::warn!(package = %package.name, "Skipping scoped registries: {}", e),
            }
        }

        let manifest_path = self.project_root.join(&self.config.project_manifest);
        let _lock = io::FileLock::acquire(&manifest_path)?;
        let mut project = self.store.load_or_empty(&manifest_path)?;
        let outcome = apply_registries(&mut project, &candidates)?;

        if outcome.changed() {
            self.store.save(&manifest_path, &project)?;
            tracing::info!(
                added = outcome.added,
                scopes_added = outcome.scopes_added,
                "Updated scoped registries in {}",
                manifest_path
            );
            report.manifest_written = true;
        } else {
            tracing::debug!("Scoped registries already up to date");
        }
        report.registries = outcome.registries;
        Ok(())
    }

    fn absolute(&self, path: &NormalizedPath) -> NormalizedPath {
        if path.to_native().is_absolute() {
            path.clone()
        } else {
            self.project_root.join(path.as_str())
        }
    }
}
