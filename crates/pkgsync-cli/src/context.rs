//! Project root detection
//!
//! Commands work from anywhere inside a project: the root is the nearest
//! ancestor holding a pkgsync config file or a project manifest.

use std::path::{Path, PathBuf};

use pkgsync_core::{CONFIG_FILENAMES, ResolverConfig};

/// Walk up from `cwd` to the project root, or return `cwd` when no marker is found.
pub fn detect_project_root(cwd: &Path) -> PathBuf {
    let default_manifest = ResolverConfig::default().project_manifest;
    cwd.ancestors()
        .find(|dir| {
            CONFIG_FILENAMES.iter().any(|name| dir.join(name).is_file()) || dir.join(&default_manifest).is_file()
        })
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Resolve the `--project` argument against `cwd`, falling back to detection.
pub fn project_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => detect_project_root(cwd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn detects_root_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Packages")).unwrap();
        fs::write(temp.path().join("Packages/manifest.json"), "{}").unwrap();
        let nested = temp.path().join("Assets/Scenes");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(detect_project_root(&nested), temp.path());
    }

    #[test]
    fn config_file_marks_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pkgsync.yaml"), "").unwrap();
        let nested = temp.path().join("tools");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(detect_project_root(&nested), temp.path());
    }

    #[test]
    fn explicit_relative_project_joins_cwd() {
        let cwd = Path::new("/work");
        assert_eq!(project_root(Some(Path::new("game")), cwd), PathBuf::from("/work/game"));
    }
}
