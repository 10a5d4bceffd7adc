//! Build definition file and project metadata.

use crate::constants::{BUILD_FILE, UNSPECIFIED_VERSION};
use crate::error::{ModuleError, ModuleResult};
use crate::settings::ModuleSettings;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Allowed module names.
const MODULE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_.\-]*$";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Parsed `nmodule.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    /// Project metadata.
    #[serde(default)]
    pub project: ProjectSection,

    /// Extension settings.
    #[serde(default)]
    pub module: ModuleSettings,

    /// Bucket declarations.
    #[serde(default)]
    pub dependencies: DependenciesSection,

    /// Extra flat repositories.
    #[serde(default)]
    pub repositories: RepositoriesSection,

    /// Directory layout overrides.
    #[serde(default)]
    pub layout: LayoutSection,
}

/// The `[project]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub group: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,

    /// Directory of the parent project, relative to this project.
    pub parent: Option<PathBuf>,
}

/// The `[dependencies]` section, one list per bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependenciesSection {
    #[serde(default)]
    pub nmodule: Vec<String>,

    #[serde(default, rename = "nmoduleDepOnly")]
    pub nmodule_dep_only: Vec<String>,

    #[serde(default)]
    pub uberjar: Vec<String>,
}

/// The `[repositories]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoriesSection {
    /// Directories searched for `<name>[-<version>].jar`.
    #[serde(default)]
    pub flat_dirs: Vec<PathBuf>,
}

/// The `[layout]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    pub build_dir: Option<PathBuf>,
    pub classes_dir: Option<PathBuf>,
    pub resources_dir: Option<PathBuf>,
    pub processed_resources_dir: Option<PathBuf>,
    pub libs_dir: Option<PathBuf>,
    pub source_dirs: Option<Vec<PathBuf>>,
}

/// Resolved project directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root of all generated output.
    pub build_dir: PathBuf,

    /// Compiled output, filled by the external compiler.
    pub classes_dir: PathBuf,

    /// Resource sources.
    pub resources_dir: PathBuf,

    /// Processed resources; the descriptor is written here.
    pub processed_resources_dir: PathBuf,

    /// Archive output directory.
    pub libs_dir: PathBuf,

    /// Source roots of the main compilation unit.
    pub source_dirs: Vec<PathBuf>,
}

/// Metadata inherited from a parent project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentMetadata {
    pub dir: PathBuf,
    pub name: String,
    pub group: String,
    pub version: String,
}

/// Project metadata after parent inheritance.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project directory.
    pub dir: PathBuf,

    /// The build definition file.
    pub build_file: PathBuf,

    pub name: String,
    pub group: String,
    pub version: String,
    pub description: Option<String>,

    /// Parent project, if declared.
    pub parent: Option<ParentMetadata>,

    pub layout: Layout,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BuildFile {
    /// Load `nmodule.toml` from a project directory.
    pub fn load(dir: &Path) -> ModuleResult<Self> {
        let path = dir.join(BUILD_FILE);
        if !path.is_file() {
            return Err(ModuleError::ProjectNotFound(dir.to_path_buf()));
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Layout {
    /// Resolve layout overrides against the project directory.
    pub fn resolve(dir: &Path, section: &LayoutSection) -> Self {
        let build_dir = dir.join(section.build_dir.as_deref().unwrap_or(Path::new("build")));
        let pick = |value: &Option<PathBuf>, default: PathBuf| {
            value.as_ref().map(|p| dir.join(p)).unwrap_or(default)
        };

        let source_dirs = match &section.source_dirs {
            Some(dirs) => dirs.iter().map(|d| dir.join(d)).collect(),
            None => vec![
                dir.join("src/main/java"),
                dir.join("src/main/kotlin"),
                dir.join("src/main/resources"),
            ],
        };

        Self {
            classes_dir: pick(&section.classes_dir, build_dir.join("classes")),
            resources_dir: pick(&section.resources_dir, dir.join("src/main/resources")),
            processed_resources_dir: pick(
                &section.processed_resources_dir,
                build_dir.join("resources/main"),
            ),
            libs_dir: pick(&section.libs_dir, build_dir.join("libs")),
            source_dirs,
            build_dir,
        }
    }
}

impl Project {
    /// Build project metadata from a loaded build file.
    ///
    /// When a parent is declared, its group and version replace this
    /// project's own values.
    pub fn load(dir: &Path, build: &BuildFile) -> ModuleResult<Self> {
        Self::load_chain(dir, build, &mut Vec::new())
    }

    fn load_chain(dir: &Path, build: &BuildFile, chain: &mut Vec<PathBuf>) -> ModuleResult<Self> {
        let dir = dir.canonicalize()?;
        if chain.contains(&dir) {
            return Err(ModuleError::Config(format!(
                "parent cycle detected at {}",
                dir.display()
            )));
        }
        chain.push(dir.clone());

        let name = match &build.project.name {
            Some(name) => name.clone(),
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    ModuleError::Config(format!("cannot derive a name from {}", dir.display()))
                })?,
        };
        validate_module_name(&name)?;

        let mut group = build.project.group.clone().unwrap_or_default();
        let mut version = build
            .project
            .version
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_VERSION.to_string());

        let parent = match &build.project.parent {
            Some(relative) => {
                let parent_dir = dir.join(relative);
                let parent_build = BuildFile::load(&parent_dir)?;
                let parent = Self::load_chain(&parent_dir, &parent_build, chain)?;

                tracing::debug!(
                    "{} inherits group '{}' and version '{}' from {}",
                    name,
                    parent.group,
                    parent.version,
                    parent.name
                );
                group = parent.group.clone();
                version = parent.version.clone();

                Some(ParentMetadata {
                    dir: parent.dir,
                    name: parent.name,
                    group: parent.group,
                    version: parent.version,
                })
            }
            None => None,
        };

        Ok(Self {
            build_file: dir.join(BUILD_FILE),
            layout: Layout::resolve(&dir, &build.layout),
            dir,
            name,
            group,
            version,
            description: build.project.description.clone(),
            parent,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Check that a module name is usable as an archive and descriptor name.
pub fn validate_module_name(name: &str) -> ModuleResult<()> {
    let pattern = Regex::new(MODULE_NAME_PATTERN)?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(ModuleError::Config(format!(
            "invalid module name '{}': must start with a letter and contain only letters, digits, '.', '_' or '-'",
            name
        )))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
