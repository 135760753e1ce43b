//! Resource resolution and registry merging over manifests on disk.

use std::fs;
use std::path::Path;

use pkgsync_fs::NormalizedPath;
use pkgsync_manifest::{
    DirectoryProbe, DocumentStore, RegistryEntry, ResourceAction, ResourcePackageResolver, apply_registries,
    owning_package_name, registries_from_document,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

struct DiskProbe<'a>(&'a Path);

impl DirectoryProbe for DiskProbe<'_> {
    fn exists_as_directory(&self, path: &str) -> bool {
        self.0.join(path).is_dir()
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn load(root: &Path, relative: &str) -> pkgsync_manifest::ManifestDocument {
    DocumentStore::new()
        .load(&NormalizedPath::new(root.join(relative)))
        .unwrap()
}

#[test]
fn versioned_package_folder_resolves_under_its_bare_name() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Packages/com.acme.c@1.2.0/package.json",
        r#"{ "resourcePackages": [ { "name": "Demo", "path": "samples/demo" } ] }"#,
    );

    let probe = DiskProbe(temp.path());
    let resolver = ResourcePackageResolver::new(&probe, "Packages");
    let root = NormalizedPath::new(temp.path().join("Packages/com.acme.c@1.2.0"));
    let manifest = load(temp.path(), "Packages/com.acme.c@1.2.0/package.json");

    let resolution = resolver
        .resolve_document(&owning_package_name(&root), &manifest, false)
        .unwrap();

    assert_eq!(resolution.packages, vec!["com.acme.c".to_string()]);
    assert_eq!(
        resolution.entries[0].action,
        ResourceAction::Copy {
            path: "Packages/com.acme.c/samples/demo".to_string()
        }
    );
}

#[test]
fn existing_install_path_is_not_resolved_again() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Packages/c/package.json",
        r#"{ "resourcePackages": [ { "executeMethod": "Acme.Setup", "installPath": "Assets/Setup" } ] }"#,
    );
    let probe = DiskProbe(temp.path());
    let resolver = ResourcePackageResolver::new(&probe, "Packages");
    let manifest = load(temp.path(), "Packages/c/package.json");

    assert_eq!(resolver.resolve_document("c", &manifest, false).unwrap().entries.len(), 1);

    fs::create_dir_all(temp.path().join("Assets/Setup")).unwrap();
    let resolution = resolver.resolve_document("c", &manifest, false).unwrap();
    assert!(resolution.is_empty());
    assert!(resolution.packages.is_empty());
}

#[test]
fn merged_registries_written_back_preserve_other_keys() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Packages/manifest.json",
        r#"{
  "dependencies": { "com.acme.a": "1.0.0" },
  "scopedRegistries": [ { "name": "Acme", "url": "https://acme", "scopes": ["com.acme"], "auth": true } ]
}"#,
    );
    write(
        temp.path(),
        "Packages/b/package.json",
        r#"{ "scopedRegistries": [ { "name": "Acme", "url": "https://elsewhere", "scopes": ["com.acme.pro"] } ] }"#,
    );

    let store = DocumentStore::new();
    let package = store
        .load(&NormalizedPath::new(temp.path().join("Packages/b/package.json")))
        .unwrap();
    let manifest_path = NormalizedPath::new(temp.path().join("Packages/manifest.json"));
    let mut project = store.load(&manifest_path).unwrap();

    let candidates = registries_from_document(&package).unwrap();
    let outcome = apply_registries(&mut project, &candidates).unwrap();
    store.save(&manifest_path, &project).unwrap();

    assert_eq!(outcome.scopes_added, 1);
    assert_eq!(
        outcome.registries,
        vec![RegistryEntry::new("Acme", "https://acme", ["com.acme", "com.acme.pro"])]
    );

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("Packages/manifest.json")).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "dependencies": { "com.acme.a": "1.0.0" },
            "scopedRegistries": [
                { "name": "Acme", "url": "https://acme", "scopes": ["com.acme", "com.acme.pro"], "auth": true }
            ]
        })
    );
}
