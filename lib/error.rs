//! Error types for nmodule-cli.

use std::path::PathBuf;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Result type for nmodule-cli operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Error type for nmodule-cli operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Build definition file not found.
    #[error("nmodule.toml not found in {0}")]
    ProjectNotFound(PathBuf),

    /// Invalid build configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Requested task does not exist.
    #[error("Task not found: {0}")]
    UnknownTask(String),

    /// Requested dependency bucket does not exist.
    #[error("Bucket not found: {0}")]
    UnknownBucket(String),

    /// Installation destination unset or unusable.
    #[error("Missing install destination: {reason}")]
    MissingDestination { reason: String },

    /// Dependency could not be resolved to a readable archive.
    #[error("Could not resolve dependency '{coordinate}'")]
    DependencyResolution {
        /// The coordinate that failed to resolve.
        coordinate: String,
        /// Directories that were searched.
        searched: Vec<PathBuf>,
    },

    /// Archive assembly failed.
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// One or more tasks failed during a run.
    #[error("Build failed")]
    TasksFailed {
        /// Names of the failed tasks.
        failed: Vec<String>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip error.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walkdir error.
    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path strip error.
    #[error("Path error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Ignore pattern error.
    #[error("Ignore pattern error: {0}")]
    Ignore(#[from] ignore::Error),

    /// Build file parse error.
    #[error("Failed to parse nmodule.toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
