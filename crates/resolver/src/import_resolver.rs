use crate::default_imports::default_imports;
use limn_core::{Node, NodeKind, ResolvedImport, TreeContainer};
use limn_forest::{dotted_name, Forest};
use std::rc::Rc;

/// Resolve every import statement in `container` into a binding
/// environment fragment, plus the default prelude imports it doesn't
/// shadow.
///
/// Cached on the container keyed by its generation number, so a file
/// that hasn't reparsed since the last call gets its cached result back
/// instead of re-walking the tree and re-querying the forest.
pub fn resolve_imports(container: &TreeContainer, forest: &Forest) -> Rc<Vec<ResolvedImport>> {
    let forest_version = forest.version();
    if let Some(cached) = container.cached_resolved_imports(forest_version) {
        return cached;
    }

    let mut imports = Vec::new();
    for child in container.tree.root().children() {
        if child.kind == NodeKind::ImportClause {
            imports.push(resolve_import_clause(child, forest));
        }
    }

    for default in default_imports() {
        let shadowed = imports.iter().any(|imp| imp.source_module == default.source_module);
        if !shadowed {
            imports.push(default);
        }
    }

    container.cache_resolved_imports(forest_version, imports)
}

fn resolve_import_clause(node: &Rc<Node>, forest: &Forest) -> ResolvedImport {
    let module_name = dotted_name(&node.children()[0]);
    let mut import = ResolvedImport::new(module_name.clone());

    let mut exposing_node = None;
    for child in &node.children()[1..] {
        match child.kind {
            NodeKind::ImportAlias => {
                import.alias = child.children().first().map(|n| n.text().to_string());
            }
            NodeKind::ExposingList => exposing_node = Some(child),
            _ => {}
        }
    }

    if let Some(exposing_node) = exposing_node {
        let target = forest.get_by_module(&module_name).map(|c| c.as_ref());
        populate_exposed_locally(&mut import, exposing_node, target);
    }

    import
}

/// Bring an import clause's `exposing (...)` entries into the local
/// unqualified namespace, restricted to what the target module actually
/// exposes; the resolver never fabricates a binding for a name an import
/// does not expose.
///
/// `target` is `None` when the imported module isn't in the forest
/// (missing dependency or typo); every entry is then left unresolved,
/// the same as any other import that can't find its target module.
fn populate_exposed_locally(import: &mut ResolvedImport, exposing_node: &Rc<Node>, target: Option<&TreeContainer>) {
    let Some(target) = target else {
        return;
    };

    let wildcard = exposing_node
        .children()
        .iter()
        .any(|c| c.kind == NodeKind::ExposingAll);

    if wildcard {
        for binding in &target.top_level_bindings {
            if target.exposing.exposes(&binding.name) {
                import
                    .exposed_locally
                    .insert(binding.name.clone(), (import.source_module.clone(), binding.name.clone()));
            }
        }
        return;
    }

    for item in exposing_node.children() {
        match item.kind {
            NodeKind::ExposedValue | NodeKind::ExposedOperator | NodeKind::ExposedType => {
                let Some(name_node) = item.children().first() else { continue };
                let name = name_node.text();
                if target.exposing.exposes(name) {
                    import
                        .exposed_locally
                        .insert(name.to_string(), (import.source_module.clone(), name.to_string()));
                }
            }
            NodeKind::ExposedTypeAllConstructors => {
                let Some(type_name_node) = item.children().first() else { continue };
                let type_name = type_name_node.text();
                for ctor in target.constructors_of(type_name) {
                    if target.exposing.exposes_constructor(type_name, &ctor.name) {
                        import
                            .exposed_locally
                            .insert(ctor.name.clone(), (import.source_module.clone(), ctor.name.clone()));
                    }
                }
            }
            NodeKind::ExposedTypeSomeConstructors => {
                let mut children = item.children().iter();
                let Some(type_name_node) = children.next() else { continue };
                let type_name = type_name_node.text();
                for ctor_node in children {
                    let ctor_name = ctor_node.text();
                    if target.exposing.exposes_constructor(type_name, ctor_name) {
                        import.exposed_locally.insert(
                            ctor_name.to_string(),
                            (import.source_module.clone(), ctor_name.to_string()),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_core::FileUri;

    fn uri(path: &str) -> FileUri {
        FileUri::from_path(path).unwrap()
    }

    #[test]
    fn explicit_exposing_only_brings_in_listed_names() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(uri("/workspace/src/A.limn"), b"module A exposing (x, y)\nx = 1\ny = 2\n", true)
            .unwrap();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport A exposing (x)\nz = x\n",
                true,
            )
            .unwrap();

        let b = forest.get_by_uri(&uri("/workspace/src/B.limn")).unwrap();
        let imports = resolve_imports(b, &forest);
        let a_import = imports.iter().find(|i| i.source_module.as_str() == "A").unwrap();
        assert!(a_import.exposed_locally.contains_key("x"));
        assert!(!a_import.exposed_locally.contains_key("y"));
    }

    #[test]
    fn unexposed_name_is_not_brought_in_even_if_listed() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(uri("/workspace/src/A.limn"), b"module A exposing (x)\nx = 1\ny = 2\n", true)
            .unwrap();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport A exposing (y)\n",
                true,
            )
            .unwrap();

        let b = forest.get_by_uri(&uri("/workspace/src/B.limn")).unwrap();
        let imports = resolve_imports(b, &forest);
        let a_import = imports.iter().find(|i| i.source_module.as_str() == "A").unwrap();
        assert!(!a_import.exposed_locally.contains_key("y"));
    }

    #[test]
    fn alias_becomes_the_qualifier() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(uri("/workspace/src/A.limn"), b"module A exposing (x)\nx = 1\n", true)
            .unwrap();
        forest
            .add_or_replace(uri("/workspace/src/B.limn"), b"module B exposing (..)\nimport A as Q\n", true)
            .unwrap();

        let b = forest.get_by_uri(&uri("/workspace/src/B.limn")).unwrap();
        let imports = resolve_imports(b, &forest);
        let a_import = imports.iter().find(|i| i.source_module.as_str() == "A").unwrap();
        assert_eq!(a_import.qualifier(), "Q");
    }

    #[test]
    fn missing_module_leaves_exposing_unresolved() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport Missing exposing (x)\n",
                true,
            )
            .unwrap();

        let b = forest.get_by_uri(&uri("/workspace/src/B.limn")).unwrap();
        let imports = resolve_imports(b, &forest);
        let missing_import = imports
            .iter()
            .find(|i| i.source_module.as_str() == "Missing")
            .unwrap();
        assert!(missing_import.exposed_locally.is_empty());
    }

    #[test]
    fn wildcard_import_exposing_brings_in_every_exported_name() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(uri("/workspace/src/A.limn"), b"module A exposing (..)\nx = 1\ny = 2\n", true)
            .unwrap();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport A exposing (..)\n",
                true,
            )
            .unwrap();

        let b = forest.get_by_uri(&uri("/workspace/src/B.limn")).unwrap();
        let imports = resolve_imports(b, &forest);
        let a_import = imports.iter().find(|i| i.source_module.as_str() == "A").unwrap();
        assert!(a_import.exposed_locally.contains_key("x"));
        assert!(a_import.exposed_locally.contains_key("y"));
    }
}
