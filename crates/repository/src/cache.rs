use limn_core::Error;
use limn_semver::{Constraint, Version};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One published release of a package: its version and the constraints it
/// declares on its own dependencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRelease {
    pub version: Version,
    pub dependencies: BTreeMap<String, Constraint>,
}

/// A pure function from package name to its published releases. The
/// solver never mutates or revisits this beyond calling
/// [`PackageCache::get`].
pub trait PackageCache {
    /// Look up every published release of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPackage`] if the cache has no metadata for
    /// `name` at all.
    fn get(&self, name: &str) -> Result<Vec<PackageRelease>, Error>;
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    releases: Vec<RawRelease>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    version: Version,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// A [`PackageCache`] backed by on-disk metadata, one JSON file per
/// package at `{root}/{author}/{name}.json`.
pub struct FsPackageCache {
    root: PathBuf,
}

impl FsPackageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsPackageCache { root: root.into() }
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in name.split('/') {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }
}

impl PackageCache for FsPackageCache {
    fn get(&self, name: &str) -> Result<Vec<PackageRelease>, Error> {
        let path = self.metadata_path(name);
        let raw = std::fs::read_to_string(&path)
            .map_err(|_| Error::UnknownPackage(name.to_string()))?;

        let file: ReleaseFile = serde_json::from_str(&raw)
            .map_err(|e| Error::UnknownPackage(format!("{}: malformed metadata: {}", name, e)))?;

        file.releases
            .into_iter()
            .map(|raw| {
                let dependencies = raw
                    .dependencies
                    .into_iter()
                    .map(|(dep_name, raw_constraint)| {
                        Constraint::parse(&raw_constraint)
                            .map(|c| (dep_name, c))
                            .map_err(|e| {
                                Error::UnknownPackage(format!(
                                    "{}: malformed dependency constraint: {}",
                                    name, e
                                ))
                            })
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?;

                Ok(PackageRelease {
                    version: raw.version,
                    dependencies,
                })
            })
            .collect()
    }
}

/// An in-memory [`PackageCache`] for tests (and anywhere metadata is
/// supplied programmatically rather than read from disk).
#[derive(Default)]
pub struct MemoryPackageCache {
    releases: BTreeMap<String, Vec<PackageRelease>>,
}

impl MemoryPackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, release: PackageRelease) -> &mut Self {
        self.releases.entry(name.into()).or_default().push(release);
        self
    }
}

impl PackageCache for MemoryPackageCache {
    fn get(&self, name: &str) -> Result<Vec<PackageRelease>, Error> {
        self.releases
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownPackage(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_package_surfaces_as_unknown_package_error() {
        let cache = MemoryPackageCache::new();
        assert!(matches!(cache.get("author/missing"), Err(Error::UnknownPackage(_))));
    }

    #[test]
    fn memory_cache_returns_inserted_releases() {
        let mut cache = MemoryPackageCache::new();
        cache.insert(
            "author/q",
            PackageRelease {
                version: Version::new(1, 9, 0),
                dependencies: BTreeMap::new(),
            },
        );

        let releases = cache.get("author/q").unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].version, Version::new(1, 9, 0));
    }
}
