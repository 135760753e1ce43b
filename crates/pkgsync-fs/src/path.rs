//! Slash-normalized path handling
//!
//! Manifest documents always spell paths with forward slashes
//! (`Packages/com.acme/samples`), so project paths are kept in the same
//! form internally and converted to native paths only at I/O boundaries.

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a (possibly multi-segment) relative path.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let segment = segment.trim_start_matches("./");
        if self.inner.is_empty() {
            return Self {
                inner: segment.to_string(),
            };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the final path component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Iterate over the non-empty `/`-separated components.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty() && *s != ".")
    }

    /// Resolve `.` and `..` components lexically.
    ///
    /// Returns `None` when a `..` would climb above the first component.
    pub fn clean(&self) -> Option<Self> {
        let mut parts: Vec<&str> = Vec::new();
        for segment in self.segments() {
            if segment == ".." {
                parts.pop()?;
            } else {
                parts.push(segment);
            }
        }
        let prefix = if self.inner.starts_with('/') { "/" } else { "" };
        Some(Self {
            inner: format!("{}{}", prefix, parts.join("/")),
        })
    }

    /// Whether this path lies inside (or is) the directory `dir`.
    ///
    /// Comparison is component-wise, so `PackagesExtra/x` is not inside
    /// `Packages`.
    pub fn starts_with_dir(&self, dir: &str) -> bool {
        let dir = NormalizedPath::new(dir);
        let mut own = self.segments();
        dir.segments().all(|expected| own.next() == Some(expected))
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Packages/com.acme/samples", "Packages", true)]
    #[case("Packages", "Packages", true)]
    #[case("PackagesExtra/com.acme", "Packages", false)]
    #[case("samples/demo", "Packages", false)]
    #[case("./Packages/x", "Packages", true)]
    #[case("Assets/Packages/x", "Packages", false)]
    fn starts_with_dir_is_component_wise(
        #[case] path: &str,
        #[case] dir: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(NormalizedPath::new(path).starts_with_dir(dir), expected);
    }

    #[rstest]
    #[case("samples/demo", Some("samples/demo"))]
    #[case("./samples/../demo/", Some("demo"))]
    #[case("a\\..\\b", Some("b"))]
    #[case("/abs/x/../y", Some("/abs/y"))]
    #[case("../secrets", None)]
    #[case("a/../../b", None)]
    fn clean_resolves_dot_segments(#[case] path: &str, #[case] expected: Option<&str>) {
        let cleaned = NormalizedPath::new(path).clean();
        assert_eq!(cleaned.as_ref().map(NormalizedPath::as_str), expected);
    }

    #[test]
    fn join_normalizes_backslashes() {
        let p = NormalizedPath::new("Packages").join("com.acme\\samples\\demo");
        assert_eq!(p.as_str(), "Packages/com.acme/samples/demo");
    }

    #[test]
    fn join_onto_empty_path() {
        let p = NormalizedPath::new("").join("Packages");
        assert_eq!(p.as_str(), "Packages");
    }

    #[test]
    fn file_name_ignores_trailing_slash() {
        let p = NormalizedPath::new("Packages/com.acme@1.0.0/");
        assert_eq!(p.file_name(), Some("com.acme@1.0.0"));
    }

    #[test]
    fn extension_of_manifest() {
        assert_eq!(
            NormalizedPath::new("Packages/manifest.json").extension(),
            Some("json")
        );
        assert_eq!(NormalizedPath::new("Packages/.hidden").extension(), None);
    }
}
