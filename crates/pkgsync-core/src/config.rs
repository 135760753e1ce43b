//! Resolver configuration loaded from `pkgsync.toml` (or `.json` / `.yaml`)

use std::collections::BTreeMap;

use pkgsync_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Configuration filename at the project root.
pub const CONFIG_FILENAME: &str = "pkgsync.toml";

/// Configuration filenames in lookup order; the first one present wins.
pub const CONFIG_FILENAMES: [&str; 4] = [CONFIG_FILENAME, "pkgsync.json", "pkgsync.yaml", "pkgsync.yml"];

/// Project-level settings. Every key is optional.
///
/// ```toml
/// packages_root = "Packages"
/// unmanaged_root = "Assets"
/// include_optionals = false
/// trusted_packages = ["com.acme.core"]
///
/// [actions]
/// "Acme.Editor.Setup.Run" = "python tools/setup.py"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Managed packages directory; also the prefix that marks a resource
    /// path as already package-qualified.
    pub packages_root: String,
    /// Directory stray packages are relocated out of, and where copied
    /// payloads land when an entry names no `installPath`.
    pub unmanaged_root: String,
    /// Project manifest, relative to the project root.
    pub project_manifest: String,
    /// Manifest filename inside each package.
    pub package_manifest: String,
    /// Include resource entries marked optional.
    pub include_optionals: bool,
    /// Move stray packages into `packages_root` before each pass.
    pub relocate_stray_packages: bool,
    /// Packages whose resource actions need no confirmation.
    pub trusted_packages: Vec<String>,
    /// Shell commands backing Invoke actions, keyed by qualified method name.
    pub actions: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            packages_root: "Packages".to_string(),
            unmanaged_root: "Assets".to_string(),
            project_manifest: "Packages/manifest.json".to_string(),
            package_manifest: pkgsync_manifest::PACKAGE_MANIFEST_FILENAME.to_string(),
            include_optionals: false,
            relocate_stray_packages: true,
            trusted_packages: Vec::new(),
            actions: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    /// The config file of `project_root`, if any of [`CONFIG_FILENAMES`] exists.
    pub fn find(project_root: &NormalizedPath) -> Option<NormalizedPath> {
        CONFIG_FILENAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(NormalizedPath::is_file)
    }

    /// Load the config file of `project_root`, or defaults if there is none.
    pub fn load(project_root: &NormalizedPath) -> Result<Self> {
        let path = Self::find(project_root).unwrap_or_else(|| project_root.join(CONFIG_FILENAME));
        tracing::debug!(path = %path, "Loading resolver config");
        Ok(ConfigStore::new().load_or_default(&path)?)
    }
}
