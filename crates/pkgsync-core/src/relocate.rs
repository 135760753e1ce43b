//! Moving stray packages into the managed packages root.
//!
//! A package dropped into the unmanaged tree (a directory there that
//! contains a package manifest) is invisible to the package index until it
//! lives under the packages root.

use pkgsync_fs::NormalizedPath;

use crate::config::ResolverConfig;
use crate::host::ProjectFilesystem;

/// Whether an imported file marks new package content under the unmanaged root.
pub fn is_stray_manifest(path: &NormalizedPath, config: &ResolverConfig) -> bool {
    path.file_name() == Some(config.package_manifest.as_str())
        && path
            .parent()
            .is_some_and(|dir| dir.starts_with_dir(&config.unmanaged_root))
}

/// Move every stray package to `<packages_root>/<dir-name>`.
///
/// An existing destination is replaced. A failed move is logged and the
/// remaining packages are still processed. Returns the moved directory names.
pub fn relocate_stray_packages(fs: &dyn ProjectFilesystem, config: &ResolverConfig) -> Vec<String> {
    let stray = match fs.package_dirs(&config.unmanaged_root, &config.package_manifest) {
        Ok(dirs) => dirs,
        Err(e) => {
            tracing::warn!(root = %config.unmanaged_root, "Could not scan for stray packages: {}", e);
            return Vec::new();
        }
    };

    let mut moved = Vec::new();
    for dir in stray {
        let dir = NormalizedPath::new(&dir);
        let Some(name) = dir.file_name().map(str::to_string) else {
            continue;
        };
        let destination = NormalizedPath::new(&config.packages_root).join(&name);

        tracing::info!(package = %name, "Moving package to {}", destination);
        match fs.move_dir(dir.as_str(), destination.as_str()) {
            Ok(()) => moved.push(name),
            Err(e) => tracing::error!(package = %name, "Failed to move package: {}", e),
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Assets/com.acme/package.json", true)]
    #[case("Assets/deep/com.acme/package.json", true)]
    #[case("Packages/com.acme/package.json", false)]
    #[case("Assets/com.acme/readme.md", false)]
    #[case("package.json", false)]
    fn stray_manifest_detection(#[case] path: &str, #[case] expected: bool) {
        let config = ResolverConfig::default();
        assert_eq!(is_stray_manifest(&NormalizedPath::new(path), &config), expected);
    }
}
