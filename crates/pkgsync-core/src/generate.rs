//! Scaffolding for new packages.
//!
//! [`PackageGenerator::generate`] creates `<packages-dir>/<name>/` with a
//! `package.json`, the selected folder layout and an assembly definition
//! in each code folder:
//!
//! ```text
//! Packages/com.acme.tools/
//!   package.json
//!   Runtime/com.acme.tools.asmdef
//!   Editor/com.acme.tools.Editor.asmdef
//!   Tests/Editor/com.acme.tools.Editor.Tests.asmdef
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use pkgsync_fs::{NormalizedPath, io};
use pkgsync_manifest::{DocumentStore, ManifestDocument, PACKAGE_MANIFEST_FILENAME};

use crate::host::ConfirmationPrompt;
use crate::{Error, Result};

const REPLACE_TITLE: &str = "Replace Package?";

/// Version written when none is given.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The `author` object of a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Contents of a generated `package.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    /// Minimum host version, written as `unity`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unity: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl PackageDefinition {
    /// A definition with `name` as display name and [`DEFAULT_VERSION`].
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            version: DEFAULT_VERSION.to_string(),
            unity: None,
            dependencies: BTreeMap::new(),
            keywords: Vec::new(),
            author: None,
        }
    }
}

/// A folder of the generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackageFolder {
    Runtime,
    RuntimeTests,
    Editor,
    EditorTests,
    Resources,
    EditorResources,
    Documentation,
}

impl PackageFolder {
    /// Every folder, in creation order.
    pub const ALL: [PackageFolder; 7] = [
        PackageFolder::Runtime,
        PackageFolder::RuntimeTests,
        PackageFolder::Editor,
        PackageFolder::EditorTests,
        PackageFolder::Resources,
        PackageFolder::EditorResources,
        PackageFolder::Documentation,
    ];

    /// Location inside the package directory.
    pub fn relative_path(self) -> &'static str {
        match self {
            PackageFolder::Runtime => "Runtime",
            PackageFolder::RuntimeTests => "Tests/Runtime",
            PackageFolder::Editor => "Editor",
            PackageFolder::EditorTests => "Tests/Editor",
            PackageFolder::Resources => "Resources",
            PackageFolder::EditorResources => "EditorResources",
            PackageFolder::Documentation => "Documentation",
        }
    }

    /// Name accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            PackageFolder::Runtime => "runtime",
            PackageFolder::RuntimeTests => "runtime-tests",
            PackageFolder::Editor => "editor",
            PackageFolder::EditorTests => "editor-tests",
            PackageFolder::Resources => "resources",
            PackageFolder::EditorResources => "editor-resources",
            PackageFolder::Documentation => "documentation",
        }
    }
}

impl fmt::Display for PackageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageFolder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PackageFolder::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = PackageFolder::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown folder '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// An assembly definition file (`.asmdef`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyDefinition {
    pub name: String,
    pub references: Vec<String>,
    pub optional_unity_references: Vec<String>,
    pub include_platforms: Vec<String>,
    pub exclude_platforms: Vec<String>,
    pub allow_unsafe_code: bool,
    pub override_references: bool,
    pub precompiled_references: Vec<String>,
    pub auto_referenced: bool,
    pub define_constraints: Vec<String>,
}

impl AssemblyDefinition {
    /// A code assembly, restricted to the editor when `editor_only`.
    pub fn code(name: impl Into<String>, editor_only: bool) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
            optional_unity_references: Vec::new(),
            include_platforms: if editor_only { vec!["Editor".to_string()] } else { Vec::new() },
            exclude_platforms: Vec::new(),
            allow_unsafe_code: false,
            override_references: true,
            precompiled_references: Vec::new(),
            auto_referenced: true,
            define_constraints: Vec::new(),
        }
    }

    /// An editor-only test assembly.
    pub fn tests(name: impl Into<String>) -> Self {
        Self {
            optional_unity_references: vec!["TestAssemblies".to_string()],
            precompiled_references: vec!["NSubstitute.dll".to_string()],
            ..Self::code(name, true)
        }
    }
}

/// Which folders to create and how to name the assemblies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub folders: Vec<PackageFolder>,
    /// Base assembly name; the package name when `None`.
    pub assembly_name: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            folders: vec![PackageFolder::Runtime, PackageFolder::Editor],
            assembly_name: None,
        }
    }
}

impl GeneratorOptions {
    pub fn includes(&self, folder: PackageFolder) -> bool {
        self.folders.contains(&folder)
    }

    /// Assembly definitions to write, with the folder each goes in.
    ///
    /// Test assemblies are only generated alongside the assembly they test.
    fn assemblies(&self, base: &str) -> Vec<(PackageFolder, AssemblyDefinition)> {
        let mut assemblies = Vec::new();
        if self.includes(PackageFolder::Runtime) {
            assemblies.push((PackageFolder::Runtime, AssemblyDefinition::code(base, false)));
            if self.includes(PackageFolder::RuntimeTests) {
                assemblies.push((PackageFolder::RuntimeTests, AssemblyDefinition::tests(format!("{base}.Tests"))));
            }
        }
        if self.includes(PackageFolder::Editor) {
            assemblies.push((PackageFolder::Editor, AssemblyDefinition::code(format!("{base}.Editor"), true)));
            if self.includes(PackageFolder::EditorTests) {
                assemblies.push((
                    PackageFolder::EditorTests,
                    AssemblyDefinition::tests(format!("{base}.Editor.Tests")),
                ));
            }
        }
        assemblies
    }
}

/// What [`PackageGenerator::generate`] created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPackage {
    pub root: String,
    /// Files written, relative to `root`.
    pub files: Vec<String>,
    /// Folders created, relative to `root`.
    pub folders: Vec<String>,
    /// An existing package directory was replaced.
    pub replaced: bool,
}

/// A package name must be usable as a single directory name.
pub fn validate_package_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(Error::InvalidPackageName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Creates new packages under a packages directory.
pub struct PackageGenerator<'a> {
    packages_dir: NormalizedPath,
    prompt: &'a mut dyn ConfirmationPrompt,
    store: DocumentStore,
}

impl<'a> PackageGenerator<'a> {
    /// `prompt` confirms replacing a package directory that already exists.
    pub fn new(packages_dir: impl Into<NormalizedPath>, prompt: &'a mut dyn ConfirmationPrompt) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            prompt,
            store: DocumentStore::new(),
        }
    }

    /// Generate `package` with the layout in `options`.
    ///
    /// Returns `None` when the package exists and the user declines to
    /// replace it; the existing directory is then left untouched.
    pub fn generate(
        &mut self,
        package: &PackageDefinition,
        options: &GeneratorOptions,
    ) -> Result<Option<GeneratedPackage>> {
        validate_package_name(&package.name)?;

        let root = self.packages_dir.join(&package.name);
        let replaced = root.exists();
        if replaced {
            let lines = vec![format!(
                "Are you sure you want to replace the existing package at {}?",
                root
            )];
            if !self.prompt.confirm(REPLACE_TITLE, &lines) {
                tracing::info!(package = %package.name, "Kept existing package");
                return Ok(None);
            }
            io::remove_dir_all(&root)?;
        }
        io::create_dir_all(&root)?;

        let mut generated = GeneratedPackage {
            root: root.as_str().to_string(),
            files: Vec::new(),
            folders: Vec::new(),
            replaced,
        };
        self.write(&root, PACKAGE_MANIFEST_FILENAME, package, &mut generated)?;

        for folder in PackageFolder::ALL {
            if options.includes(folder) {
                io::create_dir_all(&root.join(folder.relative_path()))?;
                generated.folders.push(folder.relative_path().to_string());
            }
        }

        let base = options.assembly_name.as_deref().unwrap_or(&package.name);
        for (folder, definition) in options.assemblies(base) {
            let file = format!("{}/{}.asmdef", folder.relative_path(), definition.name);
            self.write(&root, &file, &definition, &mut generated)?;
        }

        tracing::info!(
            package = %package.name,
            folders = generated.folders.len(),
            files = generated.files.len(),
            replaced,
            "Generated package"
        );
        Ok(Some(generated))
    }

    fn write<T: Serialize>(
        &self,
        root: &NormalizedPath,
        relative: &str,
        value: &T,
        generated: &mut GeneratedPackage,
    ) -> Result<()> {
        let doc = ManifestDocument::from_serialize(value)?;
        self.store.save(&root.join(relative), &doc)?;
        generated.files.push(relative.to_string());
        Ok(())
    }
}
