//! Two-phase project configuration.
//!
//! A [`Configuration`] collects intents: the build file, CLI overrides and
//! any late bucket additions. [`Configuration::finalize`] freezes settings,
//! snapshots bucket membership and builds every task spec. Nothing downstream
//! reads mutable state.

use crate::archive::ArchiveSpec;
use crate::buckets::{Buckets, Coordinate, ResolvedBuckets};
use crate::constants::{
    NMODULE_BUCKET, NMODULE_DEP_ONLY_BUCKET, PROJECT_LIBS_DIR, UBERJAR_BUCKET,
};
use crate::descriptor::{DescriptorMetadata, DescriptorSpec};
use crate::env::InstallRoot;
use crate::error::{ModuleError, ModuleResult};
use crate::installer::InstallSpec;
use crate::project::{BuildFile, Project};
use crate::resolver::FlatDirResolver;
use crate::settings::ModuleSettings;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration phase state. Mutable.
#[derive(Debug, Clone)]
pub struct Configuration {
    project: Project,
    settings: ModuleSettings,
    buckets: Buckets,
    install_root: InstallRoot,
    flat_dirs: Vec<PathBuf>,
}

/// Finalized configuration. Read-only for the rest of the invocation.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub project: Project,
    pub settings: ModuleSettings,
    pub buckets: ResolvedBuckets,
    pub install_root: InstallRoot,
    pub resolver: FlatDirResolver,
    pub descriptor: DescriptorSpec,
    pub jar: ArchiveSpec,
    pub sources_jar: ArchiveSpec,
    module_dependencies: Vec<Coordinate>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Configuration {
    /// Load a project and register its declared buckets and repositories.
    pub fn load(dir: &Path, install_root: InstallRoot) -> ModuleResult<Self> {
        let build = BuildFile::load(dir)?;
        let project = Project::load(dir, &build)?;

        let mut buckets = Buckets::standard();
        buckets.add_all(NMODULE_BUCKET, &build.dependencies.nmodule)?;
        buckets.add_all(NMODULE_DEP_ONLY_BUCKET, &build.dependencies.nmodule_dep_only)?;
        buckets.add_all(UBERJAR_BUCKET, &build.dependencies.uberjar)?;

        let mut flat_dirs = vec![project.dir.join(PROJECT_LIBS_DIR)];
        flat_dirs.extend(
            build
                .repositories
                .flat_dirs
                .iter()
                .map(|d| project.dir.join(d)),
        );
        flat_dirs.extend(install_root.flat_dirs());

        tracing::debug!(
            "configured {} {}:{} from {}",
            project.name,
            project.group,
            project.version,
            project.build_file.display()
        );

        Ok(Self {
            project,
            settings: build.module,
            buckets,
            install_root,
            flat_dirs,
        })
    }

    /// Project metadata.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Extension settings, writable until finalization.
    pub fn settings_mut(&mut self) -> &mut ModuleSettings {
        &mut self.settings
    }

    /// Bucket registry, writable until finalization.
    pub fn buckets_mut(&mut self) -> &mut Buckets {
        &mut self.buckets
    }

    /// Add a dependency given as `BUCKET=COORDINATE`.
    pub fn add_dependency(&mut self, declaration: &str) -> ModuleResult<()> {
        let (bucket, coordinate) = declaration.split_once('=').ok_or_else(|| {
            ModuleError::Config(format!(
                "invalid dependency '{}': expected BUCKET=COORDINATE",
                declaration
            ))
        })?;
        self.buckets.add(bucket.trim(), coordinate.parse()?)
    }

    /// End the configuration phase.
    pub fn finalize(self) -> ModuleResult<ModuleConfig> {
        let buckets = self.buckets.finalize()?;
        let descriptor = DescriptorSpec::configure(&self.project);
        let jar = ArchiveSpec::module_jar(&self.project, buckets.merged().to_vec());
        let sources_jar = ArchiveSpec::sources_jar(&self.project);
        let module_dependencies = buckets.module_dependencies();

        Ok(ModuleConfig {
            project: self.project,
            settings: self.settings,
            install_root: self.install_root,
            resolver: FlatDirResolver::new(self.flat_dirs),
            buckets,
            descriptor,
            jar,
            sources_jar,
            module_dependencies,
        })
    }
}

impl ModuleConfig {
    /// Metadata written into the descriptor.
    pub fn descriptor_metadata(&self) -> DescriptorMetadata<'_> {
        DescriptorMetadata {
            name: &self.project.name,
            vendor: &self.project.group,
            version: &self.project.version,
            description: self.project.description.as_deref(),
            runtime_profile: self.settings.runtime_profile.as_deref(),
            dependencies: &self.module_dependencies,
        }
    }

    /// Install spec, reading `install_sources` at call time.
    pub fn install_spec(&self) -> InstallSpec {
        InstallSpec::new(
            self.install_root.clone(),
            self.jar.output_path(),
            self.sources_jar.output_path(),
            self.settings.install_sources,
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
