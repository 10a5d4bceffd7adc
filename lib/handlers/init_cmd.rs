//! Project scaffolding command handler.

use crate::constants::BUILD_FILE;
use crate::error::{ModuleError, ModuleResult};
use crate::project::validate_module_name;
use crate::scaffold::{ScaffoldOptions, build_file_template, scaffold_dirs};
use colored::Colorize;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Create a new module project.
pub async fn init_project(
    project_dir: PathBuf,
    path: Option<PathBuf>,
    name: Option<String>,
    group: Option<String>,
    version: Option<String>,
    force: bool,
) -> ModuleResult<()> {
    let target = match path {
        Some(p) if p.is_absolute() => p,
        Some(p) => project_dir.join(p),
        None => project_dir,
    };
    std::fs::create_dir_all(&target)?;
    let target = target.canonicalize()?;

    let name = match name {
        Some(name) => name,
        None => target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                ModuleError::Config(format!(
                    "cannot derive a module name from {}; pass --name",
                    target.display()
                ))
            })?,
    };

    let mut options = ScaffoldOptions::named(name);
    if let Some(group) = group {
        options.group = group;
    }
    if let Some(version) = version {
        options.version = version;
    }

    let build_file = scaffold_project(&target, &options, force)?;

    println!(
        "  {} Created {} for {}\n",
        "✓".bright_green(),
        build_file.display().to_string().bright_green(),
        options.name.bold()
    );
    println!("  {}", "Next steps:".bold());
    println!("    {} Put compiled classes in build/classes", "1.".dimmed());
    println!("    {} nmodule run jar", "2.".dimmed());
    println!("    {} nmodule install", "3.".dimmed());
    println!();

    Ok(())
}

/// Write the build file and standard directories into `target`.
pub fn scaffold_project(
    target: &Path,
    options: &ScaffoldOptions,
    force: bool,
) -> ModuleResult<PathBuf> {
    validate_module_name(&options.name)?;

    let build_file = target.join(BUILD_FILE);
    if build_file.exists() && !force {
        return Err(ModuleError::Config(format!(
            "{} already exists. Use --force to overwrite.",
            BUILD_FILE
        )));
    }

    for dir in scaffold_dirs() {
        std::fs::create_dir_all(target.join(dir))?;
    }
    std::fs::write(&build_file, build_file_template(options))?;
    tracing::debug!("wrote {}", build_file.display());

    Ok(build_file)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
