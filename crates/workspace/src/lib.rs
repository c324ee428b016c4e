//! `WorkspaceHandle`: the facade a host (editor, CLI, test harness) drives
//! to load a project, keep it in sync with edits, and run queries over it.
//!
//! Everything here is a thin orchestration layer over the other crates:
//! `limn-repository` for the manifest and dependency solver,
//! `limn-sourcereader` for enumerating files on disk, `limn-forest` for
//! the parsed-tree store, and `limn-resolver` for the actual queries.

use limn_core::{
    CancellationToken, DefinitionNode, Error, FileUri, Position, Reference, ResolvedImport,
    TreeContainer,
};
use limn_forest::Forest;
use limn_repository::{solve, FsPackageCache, Manifest, Solution};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The manifest filename at a project's root, the way the teacher's
/// compiler looks for `reproto.toml`.
pub const MANIFEST_FILE: &str = "limn.toml";

/// Where solved dependency sources are vendored, relative to the project
/// root: `<root>/limn-packages/<author>/<name>/<version>/`. A solved
/// package's own `source-directories` (from its metadata) are resolved
/// under this path.
pub const PACKAGE_DIRECTORY: &str = "limn-packages";

/// A change delivered by the host for a single file.
pub enum FileChange {
    Updated(Vec<u8>),
    Deleted,
}

/// A loaded project: its manifest, its solved dependency versions, and
/// the forest of every project and dependency tree.
pub struct WorkspaceHandle {
    root: PathBuf,
    manifest: Manifest,
    solution: Solution,
    forest: Forest,
}

impl WorkspaceHandle {
    /// Load the manifest at `root`/`limn.toml`, solve its dependencies
    /// against the on-disk package cache at `root`/`limn-packages`, and
    /// populate the forest with every project and solved-dependency
    /// source file.
    ///
    /// A solver failure degrades rather than aborting the load: the
    /// forest still ends up populated with the project's own sources so
    /// editor features keep working within a single file even when
    /// dependencies can't be resolved.
    pub fn load_workspace(root: impl AsRef<Path>) -> Result<WorkspaceHandle, Error> {
        let root = root.as_ref().to_path_buf();
        let manifest = Manifest::load(root.join(MANIFEST_FILE))?;

        let mut forest = Forest::new();
        for file in
            limn_sourcereader::enumerate_project(&root, &manifest.package.source_directories)?
        {
            forest.add_or_replace(file.uri, &file.bytes, file.writeable)?;
        }

        let solution = match Self::solve_dependencies(&root, &manifest) {
            Ok(solution) => solution,
            Err(error) => {
                warn!("dependency solve failed, continuing with project files only: {}", error);
                Solution::new()
            }
        };

        Self::load_dependency_sources(&root, &solution, &mut forest);

        info!(
            "loaded workspace {} ({} file(s), {} dependenc{})",
            manifest.package.name,
            forest.len(),
            solution.len(),
            if solution.len() == 1 { "y" } else { "ies" }
        );

        Ok(WorkspaceHandle { root, manifest, solution, forest })
    }

    fn solve_dependencies(root: &Path, manifest: &Manifest) -> Result<Solution, Error> {
        let cache = FsPackageCache::new(root.join(PACKAGE_DIRECTORY));
        solve(manifest.dependencies()?, &cache)
    }

    fn load_dependency_sources(root: &Path, solution: &Solution, forest: &mut Forest) {
        for (name, version) in solution {
            let package_root = root.join(PACKAGE_DIRECTORY).join(name).join(version.to_string());
            for file in limn_sourcereader::enumerate_dependency(&package_root, &["src".to_string()])
            {
                if let Err(error) = forest.add_or_replace(file.uri, &file.bytes, file.writeable) {
                    warn!("failed to parse dependency source under {}: {}", package_root.display(), error);
                }
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Apply a single file's change to the forest: reparse on update,
    /// drop both indices on delete. Always applies to
    /// a writeable (project) tree; dependency sources are never mutated
    /// after the solve.
    pub fn apply_file_change(&mut self, uri: FileUri, change: FileChange) -> Result<(), Error> {
        match change {
            FileChange::Updated(bytes) => self.forest.add_or_replace(uri, &bytes, true),
            FileChange::Deleted => {
                self.forest.remove(&uri);
                Ok(())
            }
        }
    }

    pub fn get_forest(&self) -> &Forest {
        &self.forest
    }

    pub fn get_tree(&self, uri: &FileUri) -> Option<&Rc<TreeContainer>> {
        self.forest.get_by_uri(uri)
    }

    /// Resolve a cursor position to the occurrence it's defined by.
    pub fn find_definition(&self, uri: &FileUri, position: Position) -> Option<DefinitionNode> {
        limn_resolver::find_definition(&self.forest, uri, position)
    }

    /// Find every occurrence across the workspace that resolves back to
    /// `definition`.
    pub fn find_references(
        &self,
        definition: &DefinitionNode,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Reference>, Error> {
        limn_resolver::find_references(&self.forest, definition, cancellation)
    }

    /// The resolved import environment for a single file.
    pub fn get_imports(&self, uri: &FileUri) -> Option<Rc<Vec<ResolvedImport>>> {
        let container = self.forest.get_by_uri(uri)?;
        Some(limn_resolver::resolve_imports(container, &self.forest))
    }

    /// The grammar-intrinsic types that carry no declaration of their own.
    pub fn get_empty_types(&self) -> &'static [limn_core::EmptyType] {
        limn_core::empty_types()
    }
}
