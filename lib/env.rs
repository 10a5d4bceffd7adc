//! Installation root resolution from the process environment.

use crate::constants::{BIN_EXT_DIR, MODULES_DIR, NIAGARA_HOME_ENV};
use crate::error::{ModuleError, ModuleResult};
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The framework installation root, or the diagnostic explaining why it is unavailable.
///
/// An unset root never fails configuration. Only consumers that need a real
/// directory (the installer) turn it into an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRoot {
    /// Root taken from the environment.
    Resolved(PathBuf),

    /// Variable absent or empty.
    Unset { diagnostic: String },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl InstallRoot {
    /// Resolve the root from the process environment.
    pub fn resolve() -> Self {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve the root using a custom variable lookup.
    pub fn resolve_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(NIAGARA_HOME_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => {
                tracing::debug!("{} = {}", NIAGARA_HOME_ENV, value);
                InstallRoot::Resolved(PathBuf::from(value))
            }
            None => {
                let diagnostic = format!("{} env variable not defined", NIAGARA_HOME_ENV);
                tracing::error!("{}", diagnostic);
                InstallRoot::Unset { diagnostic }
            }
        }
    }

    /// Root path if resolved.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            InstallRoot::Resolved(path) => Some(path),
            InstallRoot::Unset { .. } => None,
        }
    }

    /// Installation directory for packaged modules.
    pub fn modules_dir(&self) -> ModuleResult<PathBuf> {
        match self {
            InstallRoot::Resolved(root) => Ok(root.join(MODULES_DIR)),
            InstallRoot::Unset { diagnostic } => Err(ModuleError::MissingDestination {
                reason: diagnostic.clone(),
            }),
        }
    }

    /// Flat repository directories provided by the installation.
    pub fn flat_dirs(&self) -> Vec<PathBuf> {
        match self {
            InstallRoot::Resolved(root) => vec![root.join(BIN_EXT_DIR), root.join(MODULES_DIR)],
            InstallRoot::Unset { .. } => Vec::new(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
