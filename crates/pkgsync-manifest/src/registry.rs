//! Scoped registry entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::SCOPED_REGISTRIES_KEY;
use crate::document::{FieldAccess, ManifestDocument, value_kind};
use crate::error::{Error, Result};

/// A named distribution registry restricted to a set of package-name scopes.
///
/// Identity is the `name` alone (ordinal, case-sensitive). `scopes` is an
/// insertion-ordered set: duplicates are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub url: String,
    scopes: Vec<String>,
}

impl RegistryEntry {
    pub fn new<I, S>(name: impl Into<String>, url: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entry = Self {
            name: name.into(),
            url: url.into(),
            scopes: Vec::new(),
        };
        for scope in scopes {
            entry.add_scope(scope);
        }
        entry
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Add a scope, returning whether it was newly added.
    pub fn add_scope(&mut self, scope: impl Into<String>) -> bool {
        let scope = scope.into();
        if self.scopes.contains(&scope) {
            return false;
        }
        self.scopes.push(scope);
        true
    }

    /// Remove a scope, returning whether it was present.
    pub fn remove_scope(&mut self, scope: &str) -> bool {
        match self.scopes.iter().position(|s| s == scope) {
            Some(idx) => {
                self.scopes.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `other` designates the same registry.
    pub fn same_registry(&self, other: &RegistryEntry) -> bool {
        self.name == other.name
    }

    /// Append `other`'s unseen scopes in their order. Returns how many were added.
    pub fn merge_scopes_from(&mut self, other: &RegistryEntry) -> usize {
        other
            .scopes
            .iter()
            .filter(|scope| self.add_scope(scope.as_str()))
            .count()
    }

    /// Read an entry from its manifest object form.
    ///
    /// `name` is required; an absent `url` reads as empty and absent
    /// `scopes` as no scopes.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::TypeMismatch {
                key: SCOPED_REGISTRIES_KEY.to_string(),
                expected: "a list of maps",
                found: value_kind(value),
            });
        };
        Self::from_map(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let name = map.get_str("name")?.ok_or_else(|| Error::MissingField {
            key: "name".to_string(),
        })?;
        let url = map.get_str("url")?.unwrap_or_default();
        let scopes = map.get_str_list("scopes")?.unwrap_or_default();
        Ok(Self::new(name, url, scopes))
    }

    /// The manifest object form: `{ "name", "url", "scopes" }`.
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "url": self.url,
            "scopes": self.scopes,
        })
    }
}

/// Extract the scoped registries a manifest declares.
///
/// An absent section yields an empty list. Individual malformed entries
/// are skipped with a warning; a section that is not a list fails the
/// whole manifest.
pub fn registries_from_document(doc: &ManifestDocument) -> Result<Vec<RegistryEntry>> {
    let Some(items) = doc.get_list(SCOPED_REGISTRIES_KEY)? else {
        return Ok(Vec::new());
    };

    let mut registries = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match RegistryEntry::from_value(item) {
            Ok(entry) => registries.push(entry),
            Err(e) => tracing::warn!(index = idx, "Skipping malformed scoped registry: {}", e),
        }
    }
    Ok(registries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_scope_is_idempotent() {
        let mut entry = RegistryEntry::new("Acme", "https://acme", ["com.acme"]);
        assert!(!entry.add_scope("com.acme"));
        assert!(entry.add_scope("com.acme.pro"));
        assert_eq!(entry.scopes(), ["com.acme", "com.acme.pro"]);
    }

    #[test]
    fn constructor_dedups_preserving_first_seen_order() {
        let entry = RegistryEntry::new("Acme", "https://acme", ["b", "a", "b", "c", "a"]);
        assert_eq!(entry.scopes(), ["b", "a", "c"]);
    }

    #[test]
    fn remove_scope_reports_presence() {
        let mut entry = RegistryEntry::new("Acme", "https://acme", ["a", "b"]);
        assert!(entry.remove_scope("a"));
        assert!(!entry.remove_scope("a"));
        assert_eq!(entry.scopes(), ["b"]);
    }

    #[test]
    fn identity_ignores_url_and_is_case_sensitive() {
        let a = RegistryEntry::new("Acme", "https://one", Vec::<String>::new());
        let b = RegistryEntry::new("Acme", "https://two", Vec::<String>::new());
        let c = RegistryEntry::new("acme", "https://one", Vec::<String>::new());
        assert!(a.same_registry(&b));
        assert!(!a.same_registry(&c));
    }

    #[test]
    fn value_round_trip() {
        let entry = RegistryEntry::new("Acme", "https://acme", ["com.acme"]);
        assert_eq!(RegistryEntry::from_value(&entry.to_value()).unwrap(), entry);
    }

    #[test]
    fn from_value_defaults_url_and_scopes() {
        let entry = RegistryEntry::from_value(&json!({ "name": "Bare" })).unwrap();
        assert_eq!(entry.url, "");
        assert!(entry.scopes().is_empty());
    }

    #[test]
    fn from_value_requires_name() {
        let err = RegistryEntry::from_value(&json!({ "url": "https://x" })).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref key } if key == "name"));
    }

    #[test]
    fn registries_from_document_skips_malformed_entries() {
        let doc = ManifestDocument::parse(
            r#"{"scopedRegistries": [
                {"name": "Acme", "url": "https://acme", "scopes": ["com.acme"]},
                {"url": "https://nameless"},
                "not-an-object",
                {"name": "Other", "url": "https://other"}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = registries_from_document(&doc)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Acme", "Other"]);
    }

    #[test]
    fn registries_from_document_without_section() {
        let doc = ManifestDocument::parse(r#"{"name": "com.acme"}"#).unwrap();
        assert!(registries_from_document(&doc).unwrap().is_empty());
    }

    #[test]
    fn registries_section_of_wrong_type_fails() {
        let doc = ManifestDocument::parse(r#"{"scopedRegistries": {"name": "Acme"}}"#).unwrap();
        assert!(matches!(
            registries_from_document(&doc),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
