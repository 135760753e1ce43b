//! Resource package resolution.
//!
//! A package manifest may declare a `resourcePackages` list. Each entry
//! either names a payload to copy into the project (`path`) or a static
//! method to invoke (`executeMethod`):
//!
//! ```json
//! {
//!   "resourcePackages": [
//!     { "name": "Demo Scenes", "path": "samples/demo", "installPath": "Assets/Demo" },
//!     { "name": "Setup", "executeMethod": "Acme.Editor.Setup.Run", "optional": true }
//!   ]
//! }
//! ```
//!
//! Resolution never re-materializes an entry whose `installPath` already
//! exists as a directory.

use serde_json::{Map, Value};

use pkgsync_fs::NormalizedPath;

use crate::RESOURCE_PACKAGES_KEY;
use crate::document::{FieldAccess, ManifestDocument, value_kind};
use crate::error::{Error, Result};

/// Answers whether a project-relative path is an existing directory.
pub trait DirectoryProbe {
    fn exists_as_directory(&self, path: &str) -> bool;
}

/// What to do to materialize a resource package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAction {
    /// Copy the payload at this project-relative path.
    Copy { path: String },
    /// Invoke the static method with this qualified name.
    Invoke { method: String },
}

/// One resolved resource package declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePackageEntry {
    pub name: String,
    pub action: ResourceAction,
    pub install_path: Option<String>,
    /// Package shown as the origin of this entry. Display only.
    pub owning_package: String,
    /// The package whose manifest declared the entry.
    pub declared_by: String,
    pub is_optional: bool,
}

impl ResourcePackageEntry {
    /// The copy path or method name.
    pub fn payload(&self) -> &str {
        match &self.action {
            ResourceAction::Copy { path } => path,
            ResourceAction::Invoke { method } => method,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{}: {}", self.name, self.owning_package)
    }
}

/// Resource entries resolved across one or more packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceResolution {
    /// Actions in declaration order.
    pub entries: Vec<ResourcePackageEntry>,
    /// Packages that contributed at least one entry, in scan order.
    pub packages: Vec<String>,
}

impl ResourceResolution {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: ResourceResolution) {
        self.entries.extend(other.entries);
        for package in other.packages {
            if !self.packages.contains(&package) {
                self.packages.push(package);
            }
        }
    }
}

/// Package name derived from its root directory, without a `@version` suffix.
///
/// `Packages/com.acme.tools@1.2.0` → `com.acme.tools`.
pub fn owning_package_name(package_root: &NormalizedPath) -> String {
    let folder = package_root.file_name().unwrap_or_default();
    match folder.rfind('@') {
        Some(idx) if idx > 0 => folder[..idx].to_string(),
        _ => folder.to_string(),
    }
}

/// Scans package manifests for resource package declarations.
pub struct ResourcePackageResolver<'a, P: ?Sized> {
    probe: &'a P,
    packages_root: String,
}

impl<'a, P: DirectoryProbe + ?Sized> ResourcePackageResolver<'a, P> {
    /// `packages_root` is the managed packages directory; Copy paths that do
    /// not start with it are treated as package-relative.
    pub fn new(probe: &'a P, packages_root: impl Into<String>) -> Self {
        Self {
            probe,
            packages_root: packages_root.into(),
        }
    }

    /// Resolve the entries `package` declares in its manifest.
    ///
    /// Entries that are malformed, already installed or optional (unless
    /// `include_optionals`) are dropped. Fails only when the resource
    /// section exists but is not a list.
    pub fn resolve_document(
        &self,
        package: &str,
        manifest: &ManifestDocument,
        include_optionals: bool,
    ) -> Result<ResourceResolution> {
        let Some(items) = manifest.get_list(RESOURCE_PACKAGES_KEY)? else {
            return Ok(ResourceResolution::default());
        };

        let mut resolution = ResourceResolution::default();

        for (idx, item) in items.iter().enumerate() {
            let Value::Object(map) = item else {
                tracing::warn!(
                    package,
                    index = idx,
                    "Dropping resource package entry: expected a map, found {}",
                    value_kind(item)
                );
                continue;
            };
            match self.resolve_entry(package, map, include_optionals) {
                Ok(Some(entry)) => {
                    tracing::debug!(package, entry = %entry.name, payload = entry.payload(), "Resolved resource package");
                    resolution.entries.push(entry);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(package, index = idx, "Dropping resource package entry: {}", e),
            }
        }

        if !resolution.entries.is_empty() {
            resolution.packages.push(package.to_string());
        }
        Ok(resolution)
    }

    fn resolve_entry(
        &self,
        package: &str,
        map: &Map<String, Value>,
        include_optionals: bool,
    ) -> Result<Option<ResourcePackageEntry>> {
        let install_path = map.get_str("installPath")?.filter(|p| !p.is_empty());
        let is_optional = match map.get_bool("optional")? {
            Some(flag) => flag,
            None => map.get_bool("isOptional")?.unwrap_or(false),
        };
        let path = map.get_str("path")?;
        let method = map.get_str("executeMethod")?;
        let name = map.get_str("name")?.or(path).or(method).unwrap_or_default();

        if let Some(install_path) = install_path
            && self.probe.exists_as_directory(install_path)
        {
            tracing::debug!(package, entry = name, install_path, "Already installed, skipping");
            return Ok(None);
        }

        if is_optional && !include_optionals {
            tracing::debug!(package, entry = name, "Optional, skipping");
            return Ok(None);
        }

        let (action, owning_package) = match (path, method) {
            (Some(path), _) => {
                let (resolved, owner) = self.resolve_copy_path(package, path)?;
                (ResourceAction::Copy { path: resolved }, owner)
            }
            (None, Some(method)) => (
                ResourceAction::Invoke {
                    method: method.to_string(),
                },
                package.to_string(),
            ),
            (None, None) => {
                return Err(Error::MalformedEntry {
                    reason: "declares neither 'path' nor 'executeMethod'".to_string(),
                });
            }
        };

        Ok(Some(ResourcePackageEntry {
            name: name.to_string(),
            action,
            install_path: install_path.map(str::to_string),
            owning_package,
            declared_by: package.to_string(),
            is_optional,
        }))
    }

    /// Rewrite a package-relative path to `<packages-root>/<package>/<path>`.
    ///
    /// A path already under the packages root designates another package's
    /// payload and is used as is; its second segment names the owner. `..`
    /// components are resolved first, and a path that climbs out of the
    /// package (or out of the packages root) is rejected.
    fn resolve_copy_path(&self, package: &str, path: &str) -> Result<(String, String)> {
        let escapes = || Error::MalformedEntry {
            reason: format!("path '{path}' escapes the package directory"),
        };
        let declared = NormalizedPath::new(path.trim_start_matches('/'))
            .clean()
            .ok_or_else(escapes)?;
        let root = NormalizedPath::new(&self.packages_root);

        if declared.starts_with_dir(&self.packages_root) {
            let owner = declared
                .segments()
                .nth(root.segments().count())
                .ok_or_else(escapes)?
                .to_string();
            return Ok((declared.as_str().to_string(), owner));
        }

        let resolved = root.join(package).join(declared.as_str());
        Ok((resolved.as_str().to_string(), package.to_string()))
    }
}
