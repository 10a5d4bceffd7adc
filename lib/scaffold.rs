//! Scaffold templates for new module projects.

use crate::constants::UNSPECIFIED_VERSION;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Values filled into a new project's build file.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub name: String,
    pub group: String,
    pub version: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ScaffoldOptions {
    /// Options with the default group and version.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            version: UNSPECIFIED_VERSION.to_string(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Generate `nmodule.toml` content.
pub fn build_file_template(options: &ScaffoldOptions) -> String {
    format!(
        r#"[project]
name = "{name}"
group = "{group}"
version = "{version}"
# description = ""
# parent = ".."

[module]
install_sources = false
# runtime_profile = "rt"

[dependencies]
# Framework modules this module depends on.
nmodule = []
# Modules declared in module.xml but kept off the classpath.
nmoduleDepOnly = []
# Archives merged into the module jar.
uberjar = []

[repositories]
# Extra directories searched for dependency archives, besides libs/.
flat_dirs = []
"#,
        name = options.name,
        group = options.group,
        version = options.version,
    )
}

/// Directories a new project starts with.
pub fn scaffold_dirs() -> &'static [&'static str] {
    &["src/main/java", "src/main/resources", "libs"]
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{BuildFile, Project};
    use crate::constants::BUILD_FILE;
    use tempfile::TempDir;

    #[test]
    fn test_template_loads() {
        let dir = TempDir::new().unwrap();
        let options = ScaffoldOptions {
            group: "acme".into(),
            version: "1.0.0".into(),
            ..ScaffoldOptions::named("weatherDriver")
        };
        std::fs::write(dir.path().join(BUILD_FILE), build_file_template(&options)).unwrap();

        let build = BuildFile::load(dir.path()).unwrap();
        assert!(build.dependencies.uberjar.is_empty());
        assert!(!build.module.install_sources);

        let project = Project::load(dir.path(), &build).unwrap();
        assert_eq!(project.name, "weatherDriver");
        assert_eq!(project.group, "acme");
        assert_eq!(project.version, "1.0.0");
    }
}
