use crate::module_index::{extract_module_header, extract_top_level_bindings};
use limn_core::{Error, FileUri, ModuleName, TreeContainer};
use std::collections::HashMap;
use std::rc::Rc;

/// The collection of parsed trees for every source file in a workspace,
/// plus the secondary module-name index.
///
/// Invariant: both maps are bijective on their respective key sets; no
/// two writeable trees share a module name (enforced by
/// [`Forest::add_or_replace`], which evicts whichever writeable tree
/// previously claimed a module name a new one collides with — the
/// newest write wins, matching how an editor's last save should behave).
#[derive(Default)]
pub struct Forest {
    by_uri: HashMap<FileUri, Rc<TreeContainer>>,
    by_module: HashMap<ModuleName, FileUri>,
    next_generation: u64,
    /// Bumped on every mutation of the forest (add/replace/remove), not
    /// just of a single tree. Import resolution reads *other* containers,
    /// so a per-tree generation alone can't tell a resolver cache that
    /// one of its dependencies changed; the resolver keys its cache on
    /// `(container.generation, forest.version())` instead, which is
    /// coarser than strictly necessary but never stale.
    version: u64,
}

impl Forest {
    pub fn new() -> Forest {
        Forest::default()
    }

    /// Monotonic counter bumped by every `add_or_replace`/`remove`, used
    /// by the resolver crate to invalidate cross-file caches (see the
    /// `version` field doc above).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Parse `bytes`, rebuild the `TreeContainer` for `uri`, and update
    /// both indices.
    pub fn add_or_replace(&mut self, uri: FileUri, bytes: &[u8], writeable: bool) -> Result<(), Error> {
        self.version += 1;
        let source = std::str::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let tree = limn_parser::parse(source);
        let header = extract_module_header(tree.root());
        let bindings = extract_top_level_bindings(tree.root());

        // A reparse may have renamed the module; drop the stale
        // secondary-index entry before it's superseded below.
        if let Some(previous) = self.by_uri.get(&uri) {
            if previous.module_name != header.module_name {
                self.by_module.remove(&previous.module_name);
            }
        }

        if writeable {
            if let Some(existing_uri) = self.by_module.get(&header.module_name) {
                if existing_uri != &uri {
                    log::warn!(
                        "module {} is claimed by both {} and {}; keeping the latest write",
                        header.module_name,
                        existing_uri,
                        uri
                    );
                    self.by_uri.remove(existing_uri);
                }
            }
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let container = TreeContainer::new(
            uri.clone(),
            tree,
            writeable,
            header.module_name.clone(),
            header.exposing,
            bindings,
            generation,
        );

        self.by_module.insert(header.module_name, uri.clone());
        self.by_uri.insert(uri, Rc::new(container));

        Ok(())
    }

    /// Remove `uri` and invalidate its module-name mapping. Any cached
    /// analyses keyed on the removed container are dropped along with
    /// it, since they're owned by the `Rc` this releases.
    pub fn remove(&mut self, uri: &FileUri) {
        self.version += 1;
        if let Some(container) = self.by_uri.remove(uri) {
            if self.by_module.get(&container.module_name) == Some(uri) {
                self.by_module.remove(&container.module_name);
            }
        }
    }

    pub fn get_by_uri(&self, uri: &FileUri) -> Option<&Rc<TreeContainer>> {
        self.by_uri.get(uri)
    }

    pub fn get_by_module(&self, name: &ModuleName) -> Option<&Rc<TreeContainer>> {
        self.by_module.get(name).and_then(|uri| self.by_uri.get(uri))
    }

    pub fn all_writeable(&self) -> impl Iterator<Item = &Rc<TreeContainer>> {
        self.by_uri.values().filter(|c| c.writeable)
    }

    pub fn all(&self) -> impl Iterator<Item = &Rc<TreeContainer>> {
        self.by_uri.values()
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }
}
