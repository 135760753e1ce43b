use std::collections::BTreeMap;

use pkgsync_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use tempfile::TempDir;

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Sample {
    #[serde(default)]
    root: String,
    #[serde(default)]
    actions: BTreeMap<String, String>,
}

#[rstest]
#[case("pkgsync.toml", "root = \"Packages\"\n\n[actions]\n\"Acme.Setup.Run\" = \"echo hi\"\n")]
#[case("pkgsync.json", r#"{ "root": "Packages", "actions": { "Acme.Setup.Run": "echo hi" } }"#)]
#[case("pkgsync.yaml", "root: Packages\nactions:\n  Acme.Setup.Run: echo hi\n")]
#[case("pkgsync.YML", "root: Packages\nactions: { Acme.Setup.Run: echo hi }\n")]
fn test_load_each_format(#[case] file_name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join(file_name);
    std::fs::write(&file, content).unwrap();

    let loaded: Sample = ConfigStore::new().load(&NormalizedPath::new(&file)).unwrap();

    let mut actions = BTreeMap::new();
    actions.insert("Acme.Setup.Run".to_string(), "echo hi".to_string());
    assert_eq!(
        loaded,
        Sample {
            root: "Packages".into(),
            actions,
        }
    );
}

#[test]
fn test_invalid_yaml_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("pkgsync.yaml");
    std::fs::write(&file, "actions: [unterminated").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&file))
        .unwrap_err();
    assert!(matches!(err, Error::ConfigParse { ref format, .. } if format == "YAML"));
}

#[test]
fn test_load_or_default_when_missing() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("pkgsync.toml"));

    let loaded: Sample = ConfigStore::new().load_or_default(&path).unwrap();
    assert_eq!(loaded, Sample::default());
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("pkgsync.toml");
    std::fs::write(&file, "root = [unterminated").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&file))
        .unwrap_err();
    assert!(matches!(err, Error::ConfigParse { ref format, .. } if format == "TOML"));
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("pkgsync.ini");
    std::fs::write(&file, "").unwrap();

    let err = ConfigStore::new()
        .load::<Sample>(&NormalizedPath::new(&file))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}
