//! Output types for `nmodule deps --json`.
//!
//! Buckets are keyed by name (BTreeMap) so the document is self-describing and
//! stable across runs.

use crate::buckets::{Coordinate, ResolvedBuckets};
use crate::resolver::FlatDirResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Output for `nmodule deps --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepsOutput {
    pub module: String,
    pub buckets: BTreeMap<String, Vec<DependencyOutput>>,
    pub classpath: Vec<String>,
    pub merged: Vec<String>,
    pub repositories: Vec<String>,
}

/// One coordinate and the archive it resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyOutput {
    pub coordinate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DepsOutput {
    /// Describe finalized buckets, resolving each direct member.
    pub fn new(module: &str, buckets: &ResolvedBuckets, resolver: &FlatDirResolver) -> Self {
        let describe = |coordinates: &[Coordinate]| -> Vec<DependencyOutput> {
            resolver
                .inspect(coordinates)
                .into_iter()
                .map(|r| DependencyOutput {
                    coordinate: r.coordinate.to_string(),
                    path: r.path.map(|p| p.display().to_string()),
                })
                .collect()
        };

        Self {
            module: module.to_string(),
            buckets: buckets
                .names()
                .map(|name| (name.to_string(), describe(buckets.declared(name))))
                .collect(),
            classpath: buckets.classpath().iter().map(|c| c.to_string()).collect(),
            merged: buckets.merged().iter().map(|c| c.to_string()).collect(),
            repositories: resolver
                .dirs()
                .iter()
                .map(|d| d.display().to_string())
                .collect(),
        }
    }

    /// Coordinates that did not resolve in any bucket.
    pub fn unresolved(&self) -> Vec<&str> {
        self.buckets
            .values()
            .flatten()
            .filter(|d| d.path.is_none())
            .map(|d| d.coordinate.as_str())
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
