//! Package manifest model and reconciliation for pkgsync.
//!
//! This crate provides the generic manifest document, the document store,
//! scoped-registry merging and resource package resolution. It performs no
//! side effects beyond reading and writing manifest files; executing the
//! resolved resource actions is the caller's job.

pub mod document;
pub mod error;
pub mod merge;
pub mod registry;
pub mod resource;
pub mod store;

/// Key of the scoped registry list in both package and project manifests.
pub const SCOPED_REGISTRIES_KEY: &str = "scopedRegistries";

/// Key of the resource package list in a package manifest.
pub const RESOURCE_PACKAGES_KEY: &str = "resourcePackages";

/// Default manifest filename inside each package directory.
pub const PACKAGE_MANIFEST_FILENAME: &str = "package.json";

pub use document::{FieldAccess, ManifestDocument};
pub use error::{Error, Result};
pub use merge::{MergeOutcome, apply_registries, merge_registries};
pub use registry::{RegistryEntry, registries_from_document};
pub use resource::{
    DirectoryProbe, ResourceAction, ResourcePackageEntry, ResourcePackageResolver, ResourceResolution,
    owning_package_name,
};
pub use store::DocumentStore;
