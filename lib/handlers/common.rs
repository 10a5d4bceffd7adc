//! Common setup for command handlers.

use crate::commands::Overrides;
use crate::configure::{Configuration, ModuleConfig};
use crate::env::InstallRoot;
use crate::error::ModuleResult;
use std::path::Path;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Configure the project, resolving the installation root from the environment.
pub fn configure(project_dir: &Path, overrides: &Overrides) -> ModuleResult<ModuleConfig> {
    configure_with(project_dir, overrides, InstallRoot::resolve())
}

/// Configure the project against a given installation root.
///
/// CLI overrides are applied before configuration ends, so `--with`
/// additions are merged like build file entries.
pub fn configure_with(
    project_dir: &Path,
    overrides: &Overrides,
    root: InstallRoot,
) -> ModuleResult<ModuleConfig> {
    let mut configuration = Configuration::load(project_dir, root)?;

    for declaration in &overrides.with {
        configuration.add_dependency(declaration)?;
    }
    if overrides.install_sources {
        configuration.settings_mut().install_sources = true;
    }

    configuration.finalize()
}

/// Format byte size.
pub(super) fn format_size(bytes: u64) -> String {
    if bytes < 1_000 {
        format!("{} B", bytes)
    } else if bytes < 1_000_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    }
}

/// Path relative to the project directory when possible.
pub(super) fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
