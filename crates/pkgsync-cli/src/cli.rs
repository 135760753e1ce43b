//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pkgsync_core::PackageFolder;
use pkgsync_core::generate::DEFAULT_VERSION;

/// pkgsync - Resolve scoped registries and resource packages for a project
#[derive(Parser, Debug)]
#[command(name = "pkgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root (defaults to the nearest directory with a pkgsync config file or Packages/manifest.json)
    #[arg(short, long, global = true, env = "PKGSYNC_PROJECT")]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run a resolution pass
    ///
    /// Moves stray packages into the packages root, imports the resource
    /// packages installed packages declare and merges their scoped registries
    /// into the project manifest.
    ///
    /// Examples:
    ///   pkgsync resolve                      # Resolve unless already done
    ///   pkgsync resolve --force --yes        # Re-run without prompting
    Resolve {
        /// Also import resource packages marked optional
        #[arg(long)]
        include_optionals: bool,

        /// Accept the resource import without prompting
        #[arg(short, long)]
        yes: bool,

        /// Run even if a pass already completed
        #[arg(short, long)]
        force: bool,
    },

    /// Merge package scoped registries into the project manifest only
    AddRegistries,

    /// Move stray packages from the unmanaged root into the packages root
    Relocate,

    /// Show resolution state and the project's scoped registries
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Forget the resolution state and recorded consents
    Reset,

    /// Report imported files; a new stray package manifest resets the state
    MarkDirty {
        /// Imported paths, relative to the project root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Scaffold a new package under the packages root
    ///
    /// Examples:
    ///   pkgsync new com.acme.tools --display-name "Acme Tools"
    ///   pkgsync new com.acme.tools --folders runtime,runtime-tests,documentation
    New(NewArgs),
}

/// Arguments of `pkgsync new`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NewArgs {
    /// Package name, also used as its directory name
    pub name: String,

    /// Human-readable name (defaults to the package name)
    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Minimum host version
    #[arg(long)]
    pub unity: Option<String>,

    /// Dependency as NAME=VERSION (repeatable)
    #[arg(long = "dependency", value_name = "NAME=VERSION", value_parser = parse_dependency)]
    pub dependencies: Vec<(String, String)>,

    /// Keyword (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Author name
    #[arg(long)]
    pub author: Option<String>,

    #[arg(long, requires = "author")]
    pub author_email: Option<String>,

    #[arg(long, requires = "author")]
    pub author_url: Option<String>,

    /// Folders to create, comma-separated
    #[arg(long, value_delimiter = ',', default_values_t = [PackageFolder::Runtime, PackageFolder::Editor])]
    pub folders: Vec<PackageFolder>,

    /// Base assembly name (defaults to the package name)
    #[arg(long)]
    pub assembly_name: Option<String>,

    /// Replace an existing package without prompting
    #[arg(short, long)]
    pub yes: bool,
}

fn parse_dependency(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => {
            Ok((name.to_string(), version.to_string()))
        }
        _ => Err(format!("expected NAME=VERSION, got '{value}'")),
    }
}
