//! Constants for nmodule-cli.
//!
//! File names, paths, environment variables and bucket names.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The build definition file name.
pub const BUILD_FILE: &str = "nmodule.toml";

/// Environment variable pointing at the framework installation root.
pub const NIAGARA_HOME_ENV: &str = "niagara_home";

/// Optional fragment merged verbatim into the module descriptor.
pub const MODULE_INCLUDE_FILE: &str = "module-include.xml";

/// Optional fragment populating the descriptor's permissions section.
pub const MODULE_PERMISSIONS_FILE: &str = "module-permissions.xml";

/// Auxiliary palette resource packed at the archive root.
pub const MODULE_PALETTE_FILE: &str = "module.palette";

/// Descriptor path relative to the processed resources directory.
pub const MODULE_DESCRIPTOR_PATH: &str = "META-INF/module.xml";

/// Jar manifest entry.
pub const JAR_MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// File extension for packaged archives.
pub const JAR_EXT: &str = "jar";

/// Classifier of the sources archive.
pub const SOURCES_CLASSIFIER: &str = "sources";

/// Installation subdirectory below the framework root.
pub const MODULES_DIR: &str = "modules";

/// Extension jar directory below the framework root.
pub const BIN_EXT_DIR: &str = "bin/ext";

/// Project-local flat repository directory.
pub const PROJECT_LIBS_DIR: &str = "libs";

/// Version reported for projects that do not declare one.
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// Bucket of runtime module dependencies.
pub const NMODULE_BUCKET: &str = "nmodule";

/// Bucket of module dependencies declared without compile visibility.
pub const NMODULE_DEP_ONLY_BUCKET: &str = "nmoduleDepOnly";

/// Bucket of dependencies merged into the packaged archive.
pub const UBERJAR_BUCKET: &str = "uberjar";

/// Standard compile and runtime dependency set.
pub const IMPLEMENTATION_BUCKET: &str = "implementation";
