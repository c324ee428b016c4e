use crate::definition::resolve_node;
use limn_core::{CancellationToken, DefinitionNode, Error, Node, NodeKind, Reference, ReferenceKind};
use limn_forest::Forest;
use std::rc::Rc;

/// Find every occurrence of `definition`'s name across the forest's
/// writeable trees whose own resolution leads back to it ("find all
/// references").
///
/// This is deliberately the literal reverse of [`crate::find_definition`]:
/// rather than maintaining a separate use-site index, every candidate
/// identifier in every writeable tree is re-resolved with the same
/// resolution logic a cursor query would use, and kept only if it
/// resolves to the same occurrence. Dependency (read-only) trees are
/// never searched; only a project's own writeable files can hold a
/// meaningful reference.
///
/// `cancellation` is checked once per file; on cancellation the partial
/// result is discarded and [`Error::Cancelled`] is returned, since the
/// query never mutates state and has nothing to roll back.
pub fn find_references(
    forest: &Forest,
    definition: &DefinitionNode,
    cancellation: &CancellationToken,
) -> Result<Vec<Reference>, Error> {
    let name = definition.node.text();
    let mut references = Vec::new();

    for container in forest.all_writeable() {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        collect_matches(forest, container, definition, name, container.tree.root(), &mut references);
    }

    Ok(references)
}

fn collect_matches(
    forest: &Forest,
    container: &Rc<limn_core::TreeContainer>,
    definition: &DefinitionNode,
    name: &str,
    node: &Rc<Node>,
    out: &mut Vec<Reference>,
) {
    if candidate_matches(node, name) {
        if let Some(resolved) = resolve_node(forest, container, node) {
            if resolved.is_same_occurrence(definition) {
                out.push(Reference {
                    uri: container.uri.clone(),
                    node: Rc::clone(node),
                    kind: classify(node, definition),
                });
            }
        }
    }

    for child in node.children() {
        collect_matches(forest, container, definition, name, child, out);
    }
}

/// Whether `node` is a candidate occurrence of `name`: either a bare
/// identifier leaf, or a dotted path (`ModuleName` used in value/type
/// position, or `QualifiedValueReference`) whose last segment is `name`,
/// the same split a qualified-reference resolution performs.
fn candidate_matches(node: &Rc<Node>, name: &str) -> bool {
    match node.kind {
        NodeKind::LowerIdentifier
        | NodeKind::UpperIdentifier
        | NodeKind::OperatorIdentifier
        | NodeKind::FunctionParameter
        | NodeKind::AnonymousFunctionParameter => node.text() == name,
        NodeKind::ModuleName | NodeKind::QualifiedValueReference => {
            node.children().last().map(|c| c.text()) == Some(name)
        }
        _ => false,
    }
}

/// Tag a matched occurrence with its role: an entry under an `import
/// ... exposing (...)` clause, an entry under the module's own `exposing
/// (...)` clause (its "re-exposure"), the definition's own occurrence,
/// or a plain use.
fn classify(node: &Rc<Node>, definition: &DefinitionNode) -> ReferenceKind {
    if node.ancestor_of_kind(NodeKind::ImportClause).is_some() {
        return ReferenceKind::ImportClauseEntry;
    }
    if node.ancestor_of_kind(NodeKind::ModuleDeclaration).is_some() {
        return ReferenceKind::ExposingClauseEntry;
    }
    if Rc::ptr_eq(node, &definition.node) {
        ReferenceKind::Definition
    } else {
        ReferenceKind::Use
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::find_definition;
    use limn_core::{FileUri, Position};

    fn uri(path: &str) -> FileUri {
        FileUri::from_path(path).unwrap()
    }

    fn position_at(source: &str, offset: usize) -> Position {
        let mut row = 0u32;
        let mut last_line_start = 0usize;
        for (index, ch) in source.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                row += 1;
                last_line_start = index + 1;
            }
        }
        Position::new(row, (offset - last_line_start) as u32)
    }

    /// A single-file definition's references are its own occurrence plus
    /// its re-exposure in `exposing (...)`.
    #[test]
    fn single_file_definition_has_exactly_one_reference() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (x)\nx = 1\n", true)
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.rfind("x = 1").unwrap();
        let definition = find_definition(&forest, &a, position_at(source, offset)).unwrap();

        let references = find_references(&forest, &definition, &CancellationToken::never()).unwrap();
        // The defining occurrence and its own re-exposure in `exposing (x)`.
        assert_eq!(references.len(), 2);
        assert!(references.iter().any(|r| r.kind == ReferenceKind::Definition));
        assert!(references.iter().any(|r| r.kind == ReferenceKind::ExposingClauseEntry));
    }

    /// A cross-file use is found, and disappears once the defining
    /// module stops exposing the name.
    #[test]
    fn cross_file_reference_is_found_and_disappears_when_unexposed() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (x)\nx = 1\n", true)
            .unwrap();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport A exposing (x)\ny = x + 1\n",
                true,
            )
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.rfind("x = 1").unwrap();
        let definition = find_definition(&forest, &a, position_at(source, offset)).unwrap();

        let references = find_references(&forest, &definition, &CancellationToken::never()).unwrap();
        let uses_in_b = references.iter().filter(|r| r.uri == uri("/workspace/src/B.limn")).count();
        assert!(uses_in_b >= 1);

        forest
            .add_or_replace(a.clone(), b"module A exposing ()\nx = 1\n", true)
            .unwrap();
        let definition = find_definition(&forest, &a, position_at(source, offset)).unwrap();
        let references = find_references(&forest, &definition, &CancellationToken::never()).unwrap();
        assert!(references.iter().all(|r| r.uri == a));
    }

    #[test]
    fn round_trip_definition_is_among_its_own_references() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (..)\nx = 1\ny = x\n", true)
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.find("x = 1").unwrap();
        let definition = find_definition(&forest, &a, position_at(source, offset)).unwrap();

        let references = find_references(&forest, &definition, &CancellationToken::never()).unwrap();
        assert!(references.iter().any(|r| r.node.text() == "x" && Rc::ptr_eq(&r.node, &definition.node)));
    }

    #[test]
    fn closure_every_reference_resolves_back_to_the_same_definition() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (..)\nx = 1\ny = x\nz = x\n", true)
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.find("x = 1").unwrap();
        let definition = find_definition(&forest, &a, position_at(source, offset)).unwrap();

        let references = find_references(&forest, &definition, &CancellationToken::never()).unwrap();
        for reference in &references {
            let position = reference.node.start;
            let redefinition = find_definition(&forest, &reference.uri, position).unwrap();
            assert!(redefinition.is_same_occurrence(&definition));
        }
    }
}
