//! Installation of built archives into the framework's module directory.

use crate::env::InstallRoot;
use crate::error::{ModuleError, ModuleResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Archives to copy and where to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSpec {
    /// Archives in copy order.
    pub archives: Vec<PathBuf>,

    /// Installation root the destination is derived from.
    pub root: InstallRoot,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl InstallSpec {
    /// Select the module archive, plus the sources archive when requested.
    pub fn new(root: InstallRoot, jar: PathBuf, sources_jar: PathBuf, install_sources: bool) -> Self {
        let mut archives = vec![jar];
        if install_sources {
            archives.push(sources_jar);
        }
        Self { archives, root }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Copy the spec's archives into `<root>/modules/`.
///
/// Fails with `MissingDestination` if the root is unset, does not exist, or
/// cannot be written.
pub fn install(spec: &InstallSpec) -> ModuleResult<Vec<PathBuf>> {
    let destination = spec.root.modules_dir()?;
    if let Some(root) = spec.root.path()
        && !root.is_dir()
    {
        return Err(ModuleError::MissingDestination {
            reason: format!("{} is not a directory", root.display()),
        });
    }

    std::fs::create_dir_all(&destination).map_err(|e| destination_error(&destination, e))?;

    let mut installed = Vec::with_capacity(spec.archives.len());
    for archive in &spec.archives {
        let file_name = archive.file_name().ok_or_else(|| {
            ModuleError::Generic(format!("not an archive file: {}", archive.display()))
        })?;
        let target = destination.join(file_name);

        std::fs::copy(archive, &target).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => destination_error(&destination, e),
            _ => ModuleError::Io(e),
        })?;

        tracing::info!("installed {}", target.display());
        installed.push(target);
    }

    Ok(installed)
}

fn destination_error(destination: &Path, err: std::io::Error) -> ModuleError {
    ModuleError::MissingDestination {
        reason: format!("cannot write to {}: {}", destination.display(), err),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn archives(dir: &Path) -> (PathBuf, PathBuf) {
        let jar = dir.join("demo.jar");
        let sources = dir.join("demo-sources.jar");
        std::fs::write(&jar, b"jar").unwrap();
        std::fs::write(&sources, b"sources").unwrap();
        (jar, sources)
    }

    #[test]
    fn test_installs_module_jar_only() {
        let build = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let (jar, sources) = archives(build.path());

        let root = InstallRoot::Resolved(home.path().to_path_buf());
        let installed = install(&InstallSpec::new(root, jar, sources, false)).unwrap();

        assert_eq!(installed, vec![home.path().join("modules/demo.jar")]);
        assert!(!home.path().join("modules/demo-sources.jar").exists());
    }

    #[test]
    fn test_installs_sources_when_requested() {
        let build = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let (jar, sources) = archives(build.path());

        let root = InstallRoot::Resolved(home.path().to_path_buf());
        let installed = install(&InstallSpec::new(root, jar, sources, true)).unwrap();

        assert_eq!(installed.len(), 2);
        assert_eq!(
            std::fs::read(home.path().join("modules/demo-sources.jar")).unwrap(),
            b"sources"
        );
    }

    #[test]
    fn test_unset_root_fails() {
        let build = TempDir::new().unwrap();
        let (jar, sources) = archives(build.path());

        let root = InstallRoot::Unset {
            diagnostic: "niagara_home env variable not defined".into(),
        };
        let result = install(&InstallSpec::new(root, jar, sources, false));
        assert!(matches!(
            result,
            Err(ModuleError::MissingDestination { .. })
        ));
    }

    #[test]
    fn test_missing_root_directory_fails() {
        let build = TempDir::new().unwrap();
        let (jar, sources) = archives(build.path());

        let root = InstallRoot::Resolved(build.path().join("no-such-home"));
        let result = install(&InstallSpec::new(root, jar, sources, false));
        assert!(matches!(
            result,
            Err(ModuleError::MissingDestination { .. })
        ));
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let build = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let root = InstallRoot::Resolved(home.path().to_path_buf());
        let spec = InstallSpec::new(
            root,
            build.path().join("missing.jar"),
            build.path().join("missing-sources.jar"),
            false,
        );
        assert!(matches!(install(&spec), Err(ModuleError::Io(_))));
    }
}
