//! CLI command definitions.

use crate::styles::styles;
use crate::{examples, examples_section};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const INIT_EXAMPLES: &str = examples![
    "nmodule init                          " # "Create nmodule.toml in the current directory",
    "nmodule init weatherDriver            " # "Create a project in ./weatherDriver",
    "nmodule init . -g acme --version 1.0.0" # "Set vendor and version",
    "nmodule init . -f                     " # "Overwrite an existing build file",
];

const TASKS_EXAMPLES: &str = examples![
    "nmodule tasks                         " # "List tasks and their dependencies",
    "nmodule -C ../other tasks             " # "List tasks of another project",
];

const DEPS_EXAMPLES: &str = examples![
    "nmodule deps                          " # "Show buckets and resolved archives",
    "nmodule deps --json                   " # "JSON output for scripts",
];

const RUN_EXAMPLES: &str = examples![
    "nmodule run jar                       " # "Generate module.xml and build the jar",
    "nmodule run clean jar                 " # "Rebuild resources, descriptor and jar",
    "nmodule run sourcesJar                " # "Build the sources jar only",
    "nmodule run install --install-sources " # "Install both archives",
    "nmodule run jar --with uberjar=gson:2.10" # "Merge an extra archive",
];

const INSTALL_EXAMPLES: &str = examples![
    "nmodule install                       " # "Build and copy the jar to $niagara_home/modules",
    "nmodule install --install-sources     " # "Also copy the sources jar",
];

const CLEAN_EXAMPLES: &str = examples![
    "nmodule clean                         " # "Delete generated resources and archives",
];

const CLI_EXAMPLES: &str = concat!(
    examples![
        "nmodule init                          " # "Create a module project",
        "nmodule deps                          " # "Check dependency resolution",
        "nmodule run jar                       " # "Build the module jar",
        "nmodule install                       " # "Install into $niagara_home/modules",
    ],
    "\n",
    examples_section!["Getting started:";
        "nmodule init                          " # "1. Create nmodule.toml",
        "nmodule run jar                       " # "2. Build build/libs/<name>.jar",
        "nmodule install                       " # "3. Copy it into the installation",
    ],
);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// nmodule - Build and install framework modules.
#[derive(Debug, Parser)]
#[command(name = "nmodule", author, version, styles=styles())]
#[command(about = "Build and install framework modules", after_help = CLI_EXAMPLES)]
pub struct Cli {
    /// Project directory containing nmodule.toml.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new module project.
    #[command(after_help = INIT_EXAMPLES)]
    Init {
        /// Directory to create the project in (defaults to the project directory).
        path: Option<PathBuf>,

        /// Module name (defaults to the directory name).
        #[arg(short, long)]
        name: Option<String>,

        /// Vendor name.
        #[arg(short, long)]
        group: Option<String>,

        /// Module version.
        #[arg(long = "version", id = "module_version")]
        module_version: Option<String>,

        /// Overwrite an existing build file.
        #[arg(short, long)]
        force: bool,
    },

    /// List tasks and their dependencies.
    #[command(after_help = TASKS_EXAMPLES)]
    Tasks,

    /// Show dependency buckets and where their archives resolve.
    #[command(after_help = DEPS_EXAMPLES)]
    Deps {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run tasks and their dependencies.
    #[command(after_help = RUN_EXAMPLES)]
    Run {
        /// Tasks to run.
        #[arg(required = true)]
        tasks: Vec<String>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Build and install the module (same as `run install`).
    #[command(after_help = INSTALL_EXAMPLES)]
    Install {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Delete generated resources and archives, keeping compiled classes (same as `run clean`).
    #[command(after_help = CLEAN_EXAMPLES)]
    Clean,
}

/// Settings applied on top of the build file before configuration ends.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Also install the sources jar.
    #[arg(long)]
    pub install_sources: bool,

    /// Add a dependency (BUCKET=COORDINATE, repeatable).
    #[arg(long = "with", value_name = "BUCKET=COORDINATE")]
    pub with: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
