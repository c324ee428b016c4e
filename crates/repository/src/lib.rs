//! Package metadata, manifest loading, and the dependency solver.

mod cache;
mod manifest;
mod solver;

pub use self::cache::{FsPackageCache, MemoryPackageCache, PackageCache, PackageRelease};
pub use self::manifest::{Manifest, PackageMeta};
pub use self::solver::{solve, Solution};
