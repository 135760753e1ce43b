//! Package scaffolding against a temporary project.

use pkgsync_core::{
    Author, Error, GeneratorOptions, PackageDefinition, PackageFolder, PackageGenerator, ScriptedPrompt,
};
use pkgsync_test_utils::TestProject;
use pretty_assertions::assert_eq;
use serde_json::json;

fn all_folders() -> GeneratorOptions {
    GeneratorOptions {
        folders: PackageFolder::ALL.to_vec(),
        assembly_name: Some("Acme.Tools".to_string()),
    }
}

#[test]
fn generates_manifest_folders_and_assemblies() {
    let project = TestProject::new();
    let mut prompt = ScriptedPrompt::always(true);
    let mut package = PackageDefinition::new("com.acme.tools");
    package.display_name = "Acme Tools".to_string();
    package.keywords = vec!["tools".to_string()];
    package.author = Some(Author {
        name: "Acme".to_string(),
        email: Some("dev@acme.test".to_string()),
        url: None,
    });

    let generated = PackageGenerator::new(project.path("Packages"), &mut prompt)
        .generate(&package, &all_folders())
        .unwrap()
        .unwrap();

    assert!(!generated.replaced);
    assert_eq!(
        generated.files,
        vec![
            "package.json",
            "Runtime/Acme.Tools.asmdef",
            "Tests/Runtime/Acme.Tools.Tests.asmdef",
            "Editor/Acme.Tools.Editor.asmdef",
            "Tests/Editor/Acme.Tools.Editor.Tests.asmdef",
        ]
    );
    for folder in ["Resources", "EditorResources", "Documentation", "Tests/Runtime"] {
        assert!(project.path(&format!("Packages/com.acme.tools/{folder}")).is_dir(), "{folder}");
    }

    assert_eq!(
        project.read_json("Packages/com.acme.tools/package.json"),
        json!({
            "name": "com.acme.tools",
            "displayName": "Acme Tools",
            "description": "",
            "version": "1.0.0",
            "dependencies": {},
            "keywords": ["tools"],
            "author": { "name": "Acme", "email": "dev@acme.test" }
        })
    );

    let tests = project.read_json("Packages/com.acme.tools/Tests/Editor/Acme.Tools.Editor.Tests.asmdef");
    assert_eq!(tests["name"], "Acme.Tools.Editor.Tests");
    assert_eq!(tests["includePlatforms"], json!(["Editor"]));
    assert_eq!(tests["optionalUnityReferences"], json!(["TestAssemblies"]));
    assert!(prompt.shown().is_empty());
}

#[test]
fn default_layout_has_runtime_and_editor_only() {
    let project = TestProject::new();
    let mut prompt = ScriptedPrompt::always(true);

    let generated = PackageGenerator::new(project.path("Packages"), &mut prompt)
        .generate(&PackageDefinition::new("com.acme.min"), &GeneratorOptions::default())
        .unwrap()
        .unwrap();

    assert_eq!(generated.folders, vec!["Runtime", "Editor"]);
    project.assert_file_exists("Packages/com.acme.min/Runtime/com.acme.min.asmdef");
    project.assert_file_exists("Packages/com.acme.min/Editor/com.acme.min.Editor.asmdef");
    project.assert_file_not_exists("Packages/com.acme.min/Tests");
}

#[test]
fn declining_replacement_keeps_existing_package() {
    let project = TestProject::new();
    project.add_package("com.acme.tools", r#"{ "name": "com.acme.tools", "version": "3.0.0" }"#);
    let mut prompt = ScriptedPrompt::always(false);

    let generated = PackageGenerator::new(project.path("Packages"), &mut prompt)
        .generate(&PackageDefinition::new("com.acme.tools"), &GeneratorOptions::default())
        .unwrap();

    assert!(generated.is_none());
    assert_eq!(project.read_json("Packages/com.acme.tools/package.json")["version"], "3.0.0");
    project.assert_file_not_exists("Packages/com.acme.tools/Runtime");
    assert_eq!(prompt.shown().len(), 1);
}

#[test]
fn accepting_replacement_starts_from_an_empty_directory() {
    let project = TestProject::new();
    project.add_package("com.acme.tools", r#"{ "name": "com.acme.tools", "version": "3.0.0" }"#);
    project.write_file("Packages/com.acme.tools/Old/stale.txt", "old");
    let mut prompt = ScriptedPrompt::always(true);

    let generated = PackageGenerator::new(project.path("Packages"), &mut prompt)
        .generate(&PackageDefinition::new("com.acme.tools"), &GeneratorOptions::default())
        .unwrap()
        .unwrap();

    assert!(generated.replaced);
    assert_eq!(project.read_json("Packages/com.acme.tools/package.json")["version"], "1.0.0");
    project.assert_file_not_exists("Packages/com.acme.tools/Old");
}

#[test]
fn path_like_name_is_rejected_before_touching_disk() {
    let project = TestProject::new();
    let mut prompt = ScriptedPrompt::always(true);

    let result = PackageGenerator::new(project.path("Packages"), &mut prompt)
        .generate(&PackageDefinition::new("../outside"), &GeneratorOptions::default());

    assert!(matches!(result, Err(Error::InvalidPackageName { .. })));
    project.assert_file_not_exists("Packages");
    project.assert_file_not_exists("outside");
}
