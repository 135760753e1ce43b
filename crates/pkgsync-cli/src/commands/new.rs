//! New command implementation

use std::path::Path;

use colored::Colorize;

use pkgsync_core::{Author, GeneratorOptions, PackageDefinition, PackageGenerator};
use pkgsync_fs::NormalizedPath;

use super::load_config;
use crate::cli::NewArgs;
use crate::error::Result;
use crate::host::TerminalPrompt;

/// Run the new command
pub fn run_new(root: &Path, args: NewArgs) -> Result<()> {
    let config = load_config(root)?;
    let packages_dir = NormalizedPath::new(root).join(&config.packages_root);

    let display_name = args.display_name.unwrap_or_else(|| args.name.clone());
    let package = PackageDefinition {
        display_name,
        description: args.description,
        version: args.version,
        unity: args.unity,
        dependencies: args.dependencies.into_iter().collect(),
        keywords: args.keywords,
        author: args.author.map(|name| Author {
            name,
            email: args.author_email,
            url: args.author_url,
        }),
        ..PackageDefinition::new(args.name)
    };
    let options = GeneratorOptions {
        folders: args.folders,
        assembly_name: args.assembly_name,
    };

    let mut prompt = TerminalPrompt::new(args.yes);
    let generated = PackageGenerator::new(packages_dir, &mut prompt).generate(&package, &options)?;

    let Some(generated) = generated else {
        println!("{} Kept existing package {}", "!".yellow(), package.name.cyan());
        return Ok(());
    };
    for file in &generated.files {
        println!("{} {}", "+".green(), file);
    }
    println!(
        "{} {} package {} at {}",
        "OK".green().bold(),
        if generated.replaced { "Replaced" } else { "Created" },
        package.name.cyan(),
        generated.root
    );
    Ok(())
}
