use crate::module::ModuleName;
use std::collections::HashMap;

/// One import statement resolved into a binding environment fragment.
#[derive(Clone, Debug)]
pub struct ResolvedImport {
    pub source_module: ModuleName,
    pub alias: Option<String>,
    /// Local unqualified name -> (module it came from, name in that
    /// module). Populated from an explicit `exposing (...)` clause, a
    /// wildcard `exposing (..)`, or the default prelude imports.
    pub exposed_locally: HashMap<String, (ModuleName, String)>,
}

impl ResolvedImport {
    pub fn new(source_module: ModuleName) -> Self {
        ResolvedImport {
            source_module,
            alias: None,
            exposed_locally: HashMap::new(),
        }
    }

    /// The qualifier importers use for `Qualifier.name` access: the alias
    /// if one was declared with `as`, otherwise the module's own name.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.source_module.as_str())
    }
}
