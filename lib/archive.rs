//! Module archive assembly.
//!
//! Builds the packaged module jar (own output plus merged `uberjar`
//! dependencies) and the sources jar. Entry paths are unique: the first entry
//! written for a path wins and every later duplicate is recorded as a
//! [`Collision`] and logged.

use crate::buckets::Coordinate;
use crate::constants::{JAR_EXT, JAR_MANIFEST_PATH, MODULE_PALETTE_FILE, SOURCES_CLASSIFIER};
use crate::descriptor::DescriptorSpec;
use crate::error::{ModuleError, ModuleResult};
use crate::project::Project;
use crate::resolver::FlatDirResolver;
use chrono::{Datelike, Timelike};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::DateTime as ZipDateTime;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What goes into an archive and where it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
    /// Archive base name (the project name).
    pub base_name: String,

    /// Version suffix. Module archives always leave this empty so the
    /// installed file name is stable across versions.
    pub version: Option<String>,

    /// Classifier suffix, e.g. `sources`.
    pub classifier: Option<String>,

    /// Output directory.
    pub destination_dir: PathBuf,

    /// Project content, in write order.
    pub contents: Vec<ArchiveContent>,

    /// Dependencies whose archives are merged after the project content.
    pub merged: Vec<Coordinate>,
}

/// A source of project entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveContent {
    /// Every file below a directory, named relative to it. Missing directories are skipped.
    Tree(PathBuf),

    /// A single file stored under `entry`.
    File { path: PathBuf, entry: String },
}

/// A duplicate entry that was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// Entry path inside the archive.
    pub path: String,

    /// Origin of the entry that was kept.
    pub kept_from: String,

    /// Origin of the entry that was dropped.
    pub ignored_from: String,
}

/// Result of assembling an archive.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    /// Path to the created archive.
    pub output_path: PathBuf,

    /// Number of file entries written.
    pub file_count: usize,

    /// Total uncompressed size in bytes.
    pub total_size: u64,

    /// Archive size in bytes.
    pub compressed_size: u64,

    /// SHA-256 checksum of the archive.
    pub checksum: String,

    /// Duplicate entries that were dropped.
    pub collisions: Vec<Collision>,
}

/// Zip writer enforcing unique entry paths.
struct JarWriter {
    zip: ZipWriter<File>,
    origins: HashMap<String, String>,
    collisions: Vec<Collision>,
    file_count: usize,
    total_size: u64,
}

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Editor and OS files never packed from project trees.
const DEFAULT_IGNORES: &[&str] = &[".DS_Store", "Thumbs.db", "*.swp", "*.swo", "*~", ".gitkeep"];

/// Suffixes of signature files dropped from merged archives.
const SIGNATURE_SUFFIXES: &[&str] = &[".SF", ".DSA", ".RSA", ".EC"];

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ArchiveSpec {
    /// Spec of the packaged module archive.
    pub fn module_jar(project: &Project, merged: Vec<Coordinate>) -> Self {
        let mut contents = vec![
            ArchiveContent::Tree(project.layout.classes_dir.clone()),
            ArchiveContent::Tree(project.layout.processed_resources_dir.clone()),
        ];

        // The palette is picked up only if present when the project is configured.
        let palette = project.dir.join(MODULE_PALETTE_FILE);
        if palette.is_file() {
            contents.push(ArchiveContent::File {
                path: palette,
                entry: MODULE_PALETTE_FILE.to_string(),
            });
        }

        Self {
            base_name: project.name.clone(),
            version: None,
            classifier: None,
            destination_dir: project.layout.libs_dir.clone(),
            contents,
            merged,
        }
    }

    /// Spec of the sources archive.
    pub fn sources_jar(project: &Project) -> Self {
        Self {
            base_name: project.name.clone(),
            version: None,
            classifier: Some(SOURCES_CLASSIFIER.to_string()),
            destination_dir: project.layout.libs_dir.clone(),
            contents: project
                .layout
                .source_dirs
                .iter()
                .cloned()
                .map(ArchiveContent::Tree)
                .collect(),
            merged: Vec::new(),
        }
    }

    /// Archive file name: `<base>[-<version>][-<classifier>].jar`.
    pub fn file_name(&self) -> String {
        let mut name = self.base_name.clone();
        for suffix in [&self.version, &self.classifier].into_iter().flatten() {
            if !suffix.is_empty() {
                name.push('-');
                name.push_str(suffix);
            }
        }
        format!("{}.{}", name, JAR_EXT)
    }

    /// Full output path.
    pub fn output_path(&self) -> PathBuf {
        self.destination_dir.join(self.file_name())
    }
}

impl JarWriter {
    fn create(path: &Path) -> ModuleResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            zip: ZipWriter::new(file),
            origins: HashMap::new(),
            collisions: Vec::new(),
            file_count: 0,
            total_size: 0,
        })
    }

    /// Write an entry unless its path is already taken.
    fn add_entry(
        &mut self,
        name: &str,
        bytes: &[u8],
        modified: Option<ZipDateTime>,
        origin: &str,
    ) -> ModuleResult<()> {
        if let Some(kept_from) = self.origins.get(name) {
            tracing::warn!(
                "duplicate entry {} from {} ignored (keeping {})",
                name,
                origin,
                kept_from
            );
            self.collisions.push(Collision {
                path: name.to_string(),
                kept_from: kept_from.clone(),
                ignored_from: origin.to_string(),
            });
            return Ok(());
        }

        let mut options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);
        if let Some(dt) = modified {
            options = options.last_modified_time(dt);
        }

        self.zip.start_file(name, options)?;
        self.zip.write_all(bytes)?;

        self.origins.insert(name.to_string(), origin.to_string());
        self.file_count += 1;
        self.total_size += bytes.len() as u64;
        Ok(())
    }

    fn add_file(&mut self, path: &Path, name: &str) -> ModuleResult<()> {
        let bytes = std::fs::read(path)?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(system_time_to_zip_datetime);
        self.add_entry(name, &bytes, modified, &path.display().to_string())
    }

    fn add_tree(&mut self, root: &Path) -> ModuleResult<()> {
        if !root.is_dir() {
            tracing::debug!("skipping missing directory {}", root.display());
            return Ok(());
        }

        let matcher = build_ignore_matcher(root)?;
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root)?;
            if matcher
                .matched_path_or_any_parents(relative, false)
                .is_ignore()
            {
                continue;
            }

            self.add_file(entry.path(), &entry_name(relative))?;
        }
        Ok(())
    }

    fn merge_archive(&mut self, path: &Path) -> ModuleResult<()> {
        let file = File::open(path).map_err(|e| unreadable_archive(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| unreadable_archive(path, e))?;
        let origin = path.display().to_string();

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| unreadable_archive(path, e))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            if is_merge_excluded(&name) {
                continue;
            }

            // Header sizes are untrusted; let the buffer grow with the data.
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| unreadable_archive(path, e))?;
            drop(entry);

            self.add_entry(&name, &bytes, None, &origin)?;
        }
        Ok(())
    }

    fn finish(self) -> ModuleResult<(usize, u64, Vec<Collision>)> {
        self.zip.finish()?;
        Ok((self.file_count, self.total_size, self.collisions))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Assemble an archive from its spec and already-resolved merge archives.
pub fn assemble(spec: &ArchiveSpec, merged_archives: &[PathBuf]) -> ModuleResult<ArchiveResult> {
    std::fs::create_dir_all(&spec.destination_dir)?;
    let output_path = spec.output_path();
    let partial_path = output_path.with_extension("jar.part");

    let written = write_archive(spec, merged_archives, &partial_path);
    let (file_count, total_size, collisions) = match written {
        Ok(summary) => summary,
        Err(e) => {
            std::fs::remove_file(&partial_path).ok();
            return Err(e);
        }
    };
    std::fs::rename(&partial_path, &output_path)?;

    let bytes = std::fs::read(&output_path)?;
    let result = ArchiveResult {
        compressed_size: bytes.len() as u64,
        checksum: compute_sha256(&bytes),
        output_path,
        file_count,
        total_size,
        collisions,
    };

    tracing::info!(
        "assembled {} ({} files, {} collisions)",
        result.output_path.display(),
        result.file_count,
        result.collisions.len()
    );
    Ok(result)
}

/// Assemble the packaged module archive.
///
/// Requires the descriptor to exist and every merged dependency to resolve
/// before anything is written.
pub fn assemble_module_jar(
    spec: &ArchiveSpec,
    descriptor: &DescriptorSpec,
    resolver: &FlatDirResolver,
) -> ModuleResult<ArchiveResult> {
    if !descriptor.output_path.is_file() {
        return Err(ModuleError::Packaging(format!(
            "module descriptor {} has not been generated",
            descriptor.output_path.display()
        )));
    }

    let archives = resolver.resolve_all(&spec.merged)?;
    assemble(spec, &archives)
}

/// Assemble the sources archive.
pub fn assemble_sources_jar(spec: &ArchiveSpec) -> ModuleResult<ArchiveResult> {
    assemble(spec, &[])
}

fn write_archive(
    spec: &ArchiveSpec,
    merged_archives: &[PathBuf],
    path: &Path,
) -> ModuleResult<(usize, u64, Vec<Collision>)> {
    let mut writer = JarWriter::create(path)?;
    writer.add_entry(JAR_MANIFEST_PATH, b"Manifest-Version: 1.0\r\n\r\n", None, "manifest")?;

    for content in &spec.contents {
        match content {
            ArchiveContent::Tree(root) => writer.add_tree(root)?,
            ArchiveContent::File { path, entry } => writer.add_file(path, entry)?,
        }
    }

    for archive in merged_archives {
        writer.merge_archive(archive)?;
    }

    writer.finish()
}

/// Build the ignore matcher applied to project trees.
fn build_ignore_matcher(root: &Path) -> ModuleResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        builder.add_line(None, pattern)?;
    }
    Ok(builder.build()?)
}

fn unreadable_archive(path: &Path, err: impl std::fmt::Display) -> ModuleError {
    ModuleError::Packaging(format!("cannot read archive {}: {}", path.display(), err))
}

/// Entries of merged archives that are never copied.
fn is_merge_excluded(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    if upper == JAR_MANIFEST_PATH {
        return true;
    }
    upper.starts_with("META-INF/")
        && !upper["META-INF/".len()..].contains('/')
        && SIGNATURE_SUFFIXES.iter().any(|s| upper.ends_with(s))
}

/// Archive entry name for a relative path.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert SystemTime to zip DateTime, preserving file modification times.
fn system_time_to_zip_datetime(time: std::time::SystemTime) -> Option<ZipDateTime> {
    let dt: chrono::DateTime<chrono::Utc> = time.into();
    ZipDateTime::from_date_and_time(
        u16::try_from(dt.year()).ok()?,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .ok()
}

/// Compute SHA-256 checksum of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
