//! [`TestProject`] builder for resolution scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary project directory with helpers for laying out packages and
/// asserting on the result.
///
/// # Example
///
/// ```rust,no_run
/// use pkgsync_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.add_package("com.acme.a", r#"{ "name": "com.acme.a" }"#);
/// project.assert_file_exists("Packages/com.acme.a/package.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the project.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Create `Packages/<dir>/package.json` and return the package root.
    pub fn add_package(&self, dir: &str, manifest: &str) -> PathBuf {
        self.write_file(&format!("Packages/{dir}/package.json"), manifest);
        self.path(&format!("Packages/{dir}"))
    }

    /// Create `Assets/<dir>/package.json`, a package outside the packages root.
    pub fn add_stray_package(&self, dir: &str, manifest: &str) -> PathBuf {
        self.write_file(&format!("Assets/{dir}/package.json"), manifest);
        self.path(&format!("Assets/{dir}"))
    }

    /// Write `Packages/manifest.json`.
    pub fn write_project_manifest(&self, content: &str) {
        self.write_file("Packages/manifest.json", content);
    }

    /// Raw text of the file at `relative`.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Parsed JSON of the file at `relative`.
    pub fn read_json(&self, relative: &str) -> Value {
        let text = self.read(relative);
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid JSON in {relative}: {e}"))
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(!full_path.exists(), "Expected file NOT to exist: {}", full_path.display());
    }
}
