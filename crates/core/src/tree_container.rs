use crate::binding::TopLevelBinding;
use crate::import::ResolvedImport;
use crate::module::{ExposingSet, ModuleName};
use crate::node::Tree;
use crate::uri::FileUri;
use std::cell::RefCell;
use std::rc::Rc;

/// A parsed file together with its module-level index.
///
/// `resolved_imports` is deliberately not a plain field: resolving a
/// module's imports requires looking at *other* trees in the forest,
/// which would make this crate depend on the forest crate and the
/// forest crate depend back on this one. The forest stays the single
/// authoritative store; the resolver crate recomputes a container's
/// imports as a pure view and caches the result here, keyed by
/// `generation` so a reparse invalidates it without a separate
/// dirty-bit map.
pub struct TreeContainer {
    pub uri: FileUri,
    pub tree: Tree,
    pub writeable: bool,
    pub module_name: ModuleName,
    pub exposing: ExposingSet,
    pub top_level_bindings: Vec<TopLevelBinding>,
    /// Bumped by the forest on every `addOrReplace` of this uri.
    pub generation: u64,
    /// Keyed on `(self.generation, forest.version())`: import resolution
    /// reads other containers, so invalidating on this tree's own
    /// generation alone would miss a change to a module it imports.
    import_cache: RefCell<Option<(u64, u64, Rc<Vec<ResolvedImport>>)>>,
}

impl TreeContainer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uri: FileUri,
        tree: Tree,
        writeable: bool,
        module_name: ModuleName,
        exposing: ExposingSet,
        top_level_bindings: Vec<TopLevelBinding>,
        generation: u64,
    ) -> Self {
        TreeContainer {
            uri,
            tree,
            writeable,
            module_name,
            exposing,
            top_level_bindings,
            generation,
            import_cache: RefCell::new(None),
        }
    }

    pub fn binding(&self, name: &str) -> Option<&TopLevelBinding> {
        self.top_level_bindings.iter().find(|b| b.name == name)
    }

    pub fn constructors_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a TopLevelBinding> {
        self.top_level_bindings
            .iter()
            .filter(move |b| b.is_constructor_of(type_name))
    }

    /// The cached resolved imports, if they were computed at the current
    /// generation and forest version. Returns `None` after a reparse of
    /// this tree, or any other tree in the forest, invalidates it.
    pub fn cached_resolved_imports(&self, forest_version: u64) -> Option<Rc<Vec<ResolvedImport>>> {
        let cache = self.import_cache.borrow();
        match cache.as_ref() {
            Some((generation, version, imports))
                if *generation == self.generation && *version == forest_version =>
            {
                Some(Rc::clone(imports))
            }
            _ => None,
        }
    }

    pub fn cache_resolved_imports(
        &self,
        forest_version: u64,
        imports: Vec<ResolvedImport>,
    ) -> Rc<Vec<ResolvedImport>> {
        let imports = Rc::new(imports);
        *self.import_cache.borrow_mut() = Some((self.generation, forest_version, Rc::clone(&imports)));
        imports
    }
}
