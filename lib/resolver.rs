//! Flat-directory dependency resolution.

use crate::buckets::Coordinate;
use crate::error::{ModuleError, ModuleResult};
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves coordinates to archive files in an ordered list of directories.
#[derive(Debug, Clone, Default)]
pub struct FlatDirResolver {
    dirs: Vec<PathBuf>,
}

/// A coordinate paired with its archive, if one was found.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub coordinate: Coordinate,
    pub path: Option<PathBuf>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl FlatDirResolver {
    /// Create a resolver searching `dirs` in order.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Searched directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the archive for a coordinate.
    ///
    /// Each directory is checked for `<name>-<version>.jar` then `<name>.jar`
    /// before moving to the next one.
    pub fn resolve(&self, coordinate: &Coordinate) -> ModuleResult<PathBuf> {
        self.find(coordinate)
            .ok_or_else(|| ModuleError::DependencyResolution {
                coordinate: coordinate.to_string(),
                searched: self.dirs.clone(),
            })
    }

    /// Resolve every coordinate, failing on the first missing one.
    pub fn resolve_all(&self, coordinates: &[Coordinate]) -> ModuleResult<Vec<PathBuf>> {
        coordinates.iter().map(|c| self.resolve(c)).collect()
    }

    /// Resolve every coordinate, keeping unresolved ones.
    pub fn inspect(&self, coordinates: &[Coordinate]) -> Vec<ResolvedDependency> {
        coordinates
            .iter()
            .map(|c| ResolvedDependency {
                coordinate: c.clone(),
                path: self.find(c),
            })
            .collect()
    }

    fn find(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let candidates = coordinate.candidate_file_names();
        self.dirs.iter().find_map(|dir| {
            candidates
                .iter()
                .map(|name| dir.join(name))
                .find(|path| is_readable_file(path))
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
