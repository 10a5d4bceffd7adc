//! Dependency buckets.
//!
//! Buckets are named, appendable sets of dependency coordinates. Members may be
//! added at any point during configuration; packaging only ever reads the
//! snapshot produced by [`Buckets::finalize`].

use crate::constants::{
    IMPLEMENTATION_BUCKET, NMODULE_BUCKET, NMODULE_DEP_ONLY_BUCKET, UBERJAR_BUCKET,
};
use crate::error::{ModuleError, ModuleResult};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The module buckets consumers declare dependencies in. Membership must not overlap.
pub const MODULE_BUCKETS: [&str; 3] = [NMODULE_BUCKET, NMODULE_DEP_ONLY_BUCKET, UBERJAR_BUCKET];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A dependency coordinate: `[group:]name[:version]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
}

/// A named bucket and the buckets it extends.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub name: String,
    pub members: Vec<Coordinate>,
    pub extends: Vec<String>,
}

/// Mutable bucket registry used during configuration.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    buckets: BTreeMap<String, Bucket>,
}

/// Immutable snapshot of bucket membership.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBuckets {
    declared: BTreeMap<String, Vec<Coordinate>>,
    effective: BTreeMap<String, Vec<Coordinate>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Coordinate {
    /// Archive file names a flat repository may hold for this coordinate.
    pub fn candidate_file_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(2);
        if let Some(version) = &self.version {
            names.push(format!("{}-{}.jar", self.name, version));
        }
        names.push(format!("{}.jar", self.name));
        names
    }
}

impl Buckets {
    /// Registry with the standard `implementation` set and the three module
    /// buckets. `nmodule` and `uberjar` feed the compile/runtime classpath,
    /// `nmoduleDepOnly` does not.
    pub fn standard() -> Self {
        let mut buckets = Self::default();
        for name in [
            IMPLEMENTATION_BUCKET,
            NMODULE_BUCKET,
            NMODULE_DEP_ONLY_BUCKET,
            UBERJAR_BUCKET,
        ] {
            buckets.insert_empty(name);
        }
        buckets.link(IMPLEMENTATION_BUCKET, NMODULE_BUCKET);
        buckets.link(IMPLEMENTATION_BUCKET, UBERJAR_BUCKET);
        buckets
    }

    /// Create a new empty bucket.
    pub fn create_bucket(&mut self, name: &str) -> ModuleResult<&mut Bucket> {
        if self.buckets.contains_key(name) {
            return Err(ModuleError::Config(format!(
                "bucket '{}' already exists",
                name
            )));
        }
        Ok(self.insert_empty(name))
    }

    /// Make every member of `source` visible through `target`.
    pub fn extend(&mut self, target: &str, source: &str) -> ModuleResult<()> {
        if !self.buckets.contains_key(source) {
            return Err(ModuleError::UnknownBucket(source.to_string()));
        }
        if !self.buckets.contains_key(target) {
            return Err(ModuleError::UnknownBucket(target.to_string()));
        }
        self.link(target, source);
        Ok(())
    }

    /// Add a coordinate to a bucket. Duplicates within a bucket are ignored.
    pub fn add(&mut self, bucket: &str, coordinate: Coordinate) -> ModuleResult<()> {
        let bucket = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ModuleError::UnknownBucket(bucket.to_string()))?;

        if !bucket.members.contains(&coordinate) {
            tracing::debug!("{} += {}", bucket.name, coordinate);
            bucket.members.push(coordinate);
        }
        Ok(())
    }

    /// Parse and add every coordinate in `coordinates`.
    pub fn add_all<S: AsRef<str>>(&mut self, bucket: &str, coordinates: &[S]) -> ModuleResult<()> {
        for coordinate in coordinates {
            self.add(bucket, coordinate.as_ref().parse()?)?;
        }
        Ok(())
    }

    /// Get a bucket by name.
    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    /// Snapshot membership. After this point the snapshot is the only view
    /// packaging steps read.
    pub fn finalize(&self) -> ModuleResult<ResolvedBuckets> {
        self.check_overlap()?;

        let declared = self
            .buckets
            .iter()
            .map(|(name, bucket)| (name.clone(), bucket.members.clone()))
            .collect();

        let effective = self
            .buckets
            .keys()
            .map(|name| {
                let mut seen = HashSet::new();
                let mut members = Vec::new();
                self.collect_members(name, &mut seen, &mut members);
                (name.clone(), members)
            })
            .collect();

        Ok(ResolvedBuckets {
            declared,
            effective,
        })
    }

    fn insert_empty(&mut self, name: &str) -> &mut Bucket {
        self.buckets.entry(name.to_string()).or_insert_with(|| Bucket {
            name: name.to_string(),
            members: Vec::new(),
            extends: Vec::new(),
        })
    }

    fn link(&mut self, target: &str, source: &str) {
        if let Some(bucket) = self.buckets.get_mut(target)
            && !bucket.extends.iter().any(|s| s == source)
        {
            bucket.extends.push(source.to_string());
        }
    }

    fn collect_members(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        members: &mut Vec<Coordinate>,
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(bucket) = self.buckets.get(name) else {
            return;
        };

        for member in &bucket.members {
            if !members.contains(member) {
                members.push(member.clone());
            }
        }
        for source in &bucket.extends {
            self.collect_members(source, visited, members);
        }
    }

    fn check_overlap(&self) -> ModuleResult<()> {
        let mut owner: BTreeMap<&Coordinate, &str> = BTreeMap::new();
        for name in MODULE_BUCKETS {
            let Some(bucket) = self.buckets.get(name) else {
                continue;
            };
            for member in &bucket.members {
                if let Some(previous) = owner.insert(member, name) {
                    return Err(ModuleError::Config(format!(
                        "dependency '{}' is declared in both '{}' and '{}'",
                        member, previous, name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ResolvedBuckets {
    /// Members declared directly on a bucket.
    pub fn declared(&self, name: &str) -> &[Coordinate] {
        self.declared.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members of a bucket including everything it extends.
    pub fn members(&self, name: &str) -> &[Coordinate] {
        self.effective.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Compile and runtime classpath coordinates.
    pub fn classpath(&self) -> &[Coordinate] {
        self.members(IMPLEMENTATION_BUCKET)
    }

    /// Archives merged into the packaged module.
    pub fn merged(&self) -> &[Coordinate] {
        self.members(UBERJAR_BUCKET)
    }

    /// Module dependencies declared in the descriptor.
    pub fn module_dependencies(&self) -> Vec<Coordinate> {
        self.members(NMODULE_BUCKET)
            .iter()
            .chain(self.members(NMODULE_DEP_ONLY_BUCKET))
            .cloned()
            .collect()
    }

    /// Bucket names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declared.keys().map(String::as_str)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for Coordinate {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(ModuleError::Config(format!(
                "invalid dependency coordinate '{}'",
                s
            )));
        }

        let owned = |p: &str| p.trim().to_string();
        match parts.as_slice() {
            [name] => Ok(Self {
                group: None,
                name: owned(name),
                version: None,
            }),
            [name, version] => Ok(Self {
                group: None,
                name: owned(name),
                version: Some(owned(version)),
            }),
            [group, name, version] => Ok(Self {
                group: Some(owned(group)),
                name: owned(name),
                version: Some(owned(version)),
            }),
            _ => Err(ModuleError::Config(format!(
                "invalid dependency coordinate '{}': expected [group:]name[:version]",
                s
            ))),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = &self.group {
            write!(f, "{}:", group)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
