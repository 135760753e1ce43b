//! Loading and saving manifest documents.

use pkgsync_fs::{NormalizedPath, io};

use crate::document::ManifestDocument;
use crate::error::{Error, Result};

/// Reads and writes [`ManifestDocument`]s on disk.
///
/// Saving goes through [`io::write_atomic`], so a concurrent reader sees
/// either the previous or the new manifest, never a partial one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load and parse the manifest at `path`.
    ///
    /// A missing or unreadable file is reported as [`Error::Parse`], the same
    /// as malformed content: either way the manifest contributes nothing.
    pub fn load(&self, path: &NormalizedPath) -> Result<ManifestDocument> {
        let text = io::read_text(path).map_err(|e| Error::parse(path.to_native(), e.to_string()))?;
        ManifestDocument::parse(&text).map_err(|message| Error::parse(path.to_native(), message))
    }

    /// Like [`load`](Self::load), but an absent file yields an empty document.
    pub fn load_or_empty(&self, path: &NormalizedPath) -> Result<ManifestDocument> {
        if !path.exists() {
            tracing::debug!(path = %path, "Manifest absent, starting from an empty document");
            return Ok(ManifestDocument::new());
        }
        self.load(path)
    }

    /// Serialize `doc` and atomically replace the file at `path`.
    pub fn save(&self, path: &NormalizedPath, doc: &ManifestDocument) -> Result<()> {
        let mut text = doc.to_pretty_string()?;
        text.push('\n');
        io::write_atomic(path, text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("package.json"));
        let err = DocumentStore::new().load(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn load_or_empty_on_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("manifest.json"));
        let doc = DocumentStore::new().load_or_empty(&path).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn load_or_empty_still_rejects_malformed_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("manifest.json");
        std::fs::write(&file, "{ not json").unwrap();
        let err = DocumentStore::new()
            .load_or_empty(&NormalizedPath::new(&file))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("Packages/manifest.json"));
        let mut doc = ManifestDocument::new();
        doc.set("dependencies", json!({ "com.acme": "1.0.0" }));

        let store = DocumentStore::new();
        store.save(&path, &doc).unwrap();

        assert_eq!(store.load(&path).unwrap(), doc);
    }
}
