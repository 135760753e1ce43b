//! Generic manifest document.
//!
//! A [`ManifestDocument`] is an insertion-ordered JSON object. Nested
//! objects and arrays are parsed recursively into [`serde_json::Value`]s,
//! so callers can index into arbitrary depth. Keys the reconciliation logic
//! never touches keep their position and value across a parse/serialize
//! round trip.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Name of a JSON value's type, used in mismatch errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// Typed lookups that fail explicitly on a type mismatch.
///
/// Every accessor returns `Ok(None)` when the key is absent (or explicitly
/// `null`) and [`Error::TypeMismatch`] when it holds another type.
pub trait FieldAccess {
    fn field(&self, key: &str) -> Option<&Value>;

    fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "a string", other)),
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "a bool", other)),
        }
    }

    fn get_list(&self, key: &str) -> Result<Option<&Vec<Value>>> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(key, "a list", other)),
        }
    }

    fn get_map(&self, key: &str) -> Result<Option<&Map<String, Value>>> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(key, "a map", other)),
        }
    }

    /// A list whose items must all be strings.
    fn get_str_list(&self, key: &str) -> Result<Option<Vec<&str>>> {
        let Some(items) = self.get_list(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| mismatch(key, "a list of strings", item))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
        found: value_kind(found),
    }
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// A package or project manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestDocument {
    root: Map<String, Value>,
}

impl ManifestDocument {
    /// An empty document (`{}`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text. The top-level value must be an object.
    ///
    /// On failure returns the parser message; the store attaches the path.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(format!(
                "top-level value must be a map, found {}",
                value_kind(&other)
            )),
        }
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Build a document from any value that serializes to a JSON object.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::MalformedEntry {
                reason: format!("expected a map, found {}", value_kind(&other)),
            }),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// Insert or replace a key. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.root.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.root.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.root.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Serialize with two-space indentation.
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl FieldAccess for ManifestDocument {
    fn field(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_rejects_non_object_root() {
        let err = ManifestDocument::parse("[1, 2]").unwrap_err();
        assert!(err.contains("a list"), "unexpected message: {err}");
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(ManifestDocument::parse("{\"name\": ").is_err());
    }

    #[test]
    fn nested_values_are_fully_converted() {
        let doc = ManifestDocument::parse(
            r#"{"resourcePackages": [{"name": "demo", "meta": {"tags": ["a", "b"]}}]}"#,
        )
        .unwrap();

        let entries = doc.get_list("resourcePackages").unwrap().unwrap();
        let entry = entries[0].as_object().unwrap();
        let meta = entry.get_map("meta").unwrap().unwrap();
        assert_eq!(meta.get_str_list("tags").unwrap(), Some(vec!["a", "b"]));
    }

    #[test]
    fn accessors_report_type_mismatch() {
        let doc = ManifestDocument::parse(r#"{"name": 5, "optional": "yes"}"#).unwrap();

        let err = doc.get_str("name").unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { ref key, expected: "a string", found: "a number" } if key == "name"
        ));
        assert!(doc.get_bool("optional").is_err());
        assert_eq!(doc.get_str("missing").unwrap(), None);
    }

    #[test]
    fn null_reads_as_absent() {
        let doc = ManifestDocument::parse(r#"{"installPath": null}"#).unwrap();
        assert_eq!(doc.get_str("installPath").unwrap(), None);
    }

    #[test]
    fn str_list_rejects_mixed_items() {
        let doc = ManifestDocument::parse(r#"{"scopes": ["a", 1]}"#).unwrap();
        assert!(doc.get_str_list("scopes").is_err());
    }

    #[test]
    fn round_trip_preserves_key_order_and_unknown_keys() {
        let text = r#"{
  "zeta": 1,
  "dependencies": {
    "com.b": "1.0.0",
    "com.a": "2.0.0"
  },
  "alpha": [
    true,
    null,
    1.5,
    "x"
  ]
}"#;
        let doc = ManifestDocument::parse(text).unwrap();
        assert_eq!(doc.to_pretty_string().unwrap(), text);
    }

    #[test]
    fn round_trip_keeps_number_spelling() {
        let text = r#"{
  "big": 123456789012345678901234567890,
  "tiny": 1.0e-7,
  "ratio": 0.10000000000000000555
}"#;
        let doc = ManifestDocument::parse(text).unwrap();
        assert_eq!(doc.to_pretty_string().unwrap(), text);
    }

    #[test]
    fn from_serialize_keeps_field_order() {
        #[derive(serde::Serialize)]
        struct Definition {
            name: &'static str,
            version: &'static str,
        }

        let doc = ManifestDocument::from_serialize(&Definition {
            name: "com.acme",
            version: "1.0.0",
        })
        .unwrap();
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "version"]);
        assert!(ManifestDocument::from_serialize(&vec![1, 2]).is_err());
    }

    #[test]
    fn set_existing_key_keeps_position() {
        let mut doc = ManifestDocument::parse(r#"{"a": 1, "b": 2, "c": 3}"#).unwrap();
        doc.set("b", json!([]));
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
