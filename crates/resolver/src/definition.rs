use crate::import_resolver::resolve_imports;
use limn_core::{
    BindingKind, DefinitionNode, DefinitionNodeType, FileUri, Node, NodeKind, Position,
    TopLevelBinding, TreeContainer,
};
use limn_forest::{dotted_name, Forest};
use std::rc::Rc;

/// Resolve the symbol under `position` in `uri` to its defining
/// occurrence ("go to definition").
pub fn find_definition(forest: &Forest, uri: &FileUri, position: Position) -> Option<DefinitionNode> {
    let container = forest.get_by_uri(uri)?;
    let node = container.tree.node_at(position);
    resolve_node(forest, container, &node)
}

/// Whether a node sits in a type expression, a value expression, or is
/// itself a bare module-name reference — the three contexts a bare
/// `UpperIdentifier`/`ModuleName` node can appear in, which the grammar
/// doesn't otherwise disambiguate between a qualified constructor
/// reference and a plain type reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Context {
    Type,
    Value,
    ModuleReference,
}

fn expression_context(node: &Rc<Node>) -> Context {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind {
            NodeKind::TypeAlias
            | NodeKind::UnionVariant
            | NodeKind::Port
            | NodeKind::TypeAnnotation => return Context::Type,
            NodeKind::ModuleDeclaration | NodeKind::ImportClause => return Context::ModuleReference,
            NodeKind::ValueDeclaration
            | NodeKind::LetDeclaration
            | NodeKind::LetExpression
            | NodeKind::CaseExpression
            | NodeKind::CaseBranch
            | NodeKind::CasePattern
            | NodeKind::Expression => return Context::Value,
            _ => current = ancestor.parent(),
        }
    }
    Context::Value
}

pub(crate) fn resolve_node(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    node: &Rc<Node>,
) -> Option<DefinitionNode> {
    match node.kind {
        NodeKind::LowerIdentifier => resolve_lower_identifier(forest, container, node),
        NodeKind::UpperIdentifier => resolve_upper_identifier(forest, container, node),
        NodeKind::OperatorIdentifier => resolve_operator_identifier(forest, container, node),
        NodeKind::ModuleName => resolve_module_name(forest, container, node),
        NodeKind::QualifiedValueReference => resolve_qualified_value(forest, container, node),
        NodeKind::FunctionParameter => Some(DefinitionNode {
            uri: container.uri.clone(),
            node: Rc::clone(node),
            node_type: DefinitionNodeType::FunctionParameter,
        }),
        NodeKind::AnonymousFunctionParameter => Some(DefinitionNode {
            uri: container.uri.clone(),
            node: Rc::clone(node),
            node_type: DefinitionNodeType::AnonymousFunctionParameter,
        }),
        _ => None,
    }
}

fn is_nth_child(parent: &Rc<Node>, node: &Rc<Node>, index: usize) -> bool {
    parent.children().get(index).map(|c| Rc::ptr_eq(c, node)).unwrap_or(false)
}

fn binding_to_definition(uri: &FileUri, binding: &TopLevelBinding) -> DefinitionNode {
    let node_type = match &binding.kind {
        BindingKind::Value => DefinitionNodeType::Value,
        BindingKind::TypeAlias => DefinitionNodeType::TypeAlias,
        BindingKind::UnionType => DefinitionNodeType::UnionType,
        BindingKind::UnionConstructor { .. } => DefinitionNodeType::UnionConstructor,
        BindingKind::Port => DefinitionNodeType::Port,
        BindingKind::Operator { .. } => DefinitionNodeType::Operator,
    };
    DefinitionNode {
        uri: uri.clone(),
        node: Rc::clone(&binding.defining_node),
        node_type,
    }
}

fn resolve_lower_identifier(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    node: &Rc<Node>,
) -> Option<DefinitionNode> {
    let name = node.text();

    if let Some(parent) = node.parent() {
        if matches!(parent.kind, NodeKind::ValueDeclaration | NodeKind::LetDeclaration)
            && is_nth_child(&parent, node, 0)
        {
            return Some(DefinitionNode {
                uri: container.uri.clone(),
                node: Rc::clone(node),
                node_type: DefinitionNodeType::Value,
            });
        }

        if matches!(parent.kind, NodeKind::ExposedValue) {
            return resolve_exposing_entry(forest, container, node, BindingMatch::Value);
        }
    }

    if node.ancestor_of_kind(NodeKind::CasePattern).is_some() {
        return Some(DefinitionNode {
            uri: container.uri.clone(),
            node: Rc::clone(node),
            node_type: DefinitionNodeType::CasePattern,
        });
    }

    resolve_unqualified_lower(forest, container, node, name)
}

fn resolve_unqualified_lower(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    node: &Rc<Node>,
    name: &str,
) -> Option<DefinitionNode> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind {
            NodeKind::Expression if is_lambda(&ancestor) => {
                for child in ancestor.children() {
                    if child.kind == NodeKind::AnonymousFunctionParameter && child.text() == name {
                        return Some(DefinitionNode {
                            uri: container.uri.clone(),
                            node: Rc::clone(child),
                            node_type: DefinitionNodeType::AnonymousFunctionParameter,
                        });
                    }
                }
            }
            NodeKind::ValueDeclaration | NodeKind::LetDeclaration => {
                for child in ancestor.children() {
                    if child.kind == NodeKind::FunctionParameter && child.text() == name {
                        return Some(DefinitionNode {
                            uri: container.uri.clone(),
                            node: Rc::clone(child),
                            node_type: DefinitionNodeType::FunctionParameter,
                        });
                    }
                }
            }
            NodeKind::LetExpression => {
                for child in ancestor.children() {
                    if child.kind == NodeKind::LetDeclaration {
                        if let Some(name_node) = child.children().first() {
                            if name_node.text() == name {
                                return Some(DefinitionNode {
                                    uri: container.uri.clone(),
                                    node: Rc::clone(name_node),
                                    node_type: DefinitionNodeType::Value,
                                });
                            }
                        }
                    }
                }
            }
            NodeKind::CaseBranch => {
                if let Some(pattern) = ancestor.children().first() {
                    if let Some(found) = find_pattern_binding(pattern, name) {
                        return Some(DefinitionNode {
                            uri: container.uri.clone(),
                            node: found,
                            node_type: DefinitionNodeType::CasePattern,
                        });
                    }
                }
            }
            _ => {}
        }
        current = ancestor.parent();
    }

    if let Some(binding) = container.top_level_bindings.iter().find(|b| {
        b.name == name && matches!(b.kind, BindingKind::Value | BindingKind::Port)
    }) {
        return Some(binding_to_definition(&container.uri, binding));
    }

    resolve_imported_value(forest, container, name)
}

fn resolve_imported_value(forest: &Forest, container: &TreeContainer, name: &str) -> Option<DefinitionNode> {
    let imports = resolve_imports(container, forest);
    for import in imports.iter() {
        if let Some((module, original)) = import.exposed_locally.get(name) {
            if let Some(target) = forest.get_by_module(module) {
                if let Some(binding) = target.binding(original) {
                    if matches!(binding.kind, BindingKind::Value | BindingKind::Port) {
                        return Some(binding_to_definition(&target.uri, binding));
                    }
                }
            }
        }
    }
    None
}

/// Whether an `Expression` node is actually a desugared lambda body: the
/// grammar reuses the generic `Expression` node for lambdas, tagged only
/// by a leading run of `AnonymousFunctionParameter` children.
fn is_lambda(node: &Rc<Node>) -> bool {
    node.children().first().map(|c| c.kind) == Some(NodeKind::AnonymousFunctionParameter)
}

/// Recursively search a pattern subtree for a bound variable named
/// `name`, returning the `LowerIdentifier` leaf that binds it.
fn find_pattern_binding(pattern: &Rc<Node>, name: &str) -> Option<Rc<Node>> {
    if pattern.kind == NodeKind::LowerIdentifier && pattern.text() == name {
        return Some(Rc::clone(pattern));
    }
    for child in pattern.children() {
        if let Some(found) = find_pattern_binding(child, name) {
            return Some(found);
        }
    }
    None
}

enum BindingMatch {
    Value,
    Operator,
    Type,
}

/// Resolve an entry of an `exposing (...)` clause back to the binding it
/// names: the current module's own binding when the clause belongs to
/// the module declaration, or the imported module's binding when it
/// belongs to an `import ... exposing (...)` clause. An entry naming a
/// symbol the target module doesn't actually expose resolves to nothing,
/// the same as any other unexposed cross-file reference.
fn resolve_exposing_entry(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    name_node: &Rc<Node>,
    kind: BindingMatch,
) -> Option<DefinitionNode> {
    let matches_kind = |binding_kind: &BindingKind| match kind {
        BindingMatch::Value => matches!(binding_kind, BindingKind::Value | BindingKind::Port),
        BindingMatch::Operator => matches!(binding_kind, BindingKind::Operator { .. }),
        BindingMatch::Type => matches!(binding_kind, BindingKind::TypeAlias | BindingKind::UnionType),
    };

    let name = name_node.text();

    if let Some(import_clause) = name_node.ancestor_of_kind(NodeKind::ImportClause) {
        let module_name = dotted_name(&import_clause.children()[0]);
        let target = forest.get_by_module(&module_name)?;
        if !target.exposing.exposes(name) {
            return None;
        }
        let binding = target.top_level_bindings.iter().find(|b| b.name == name && matches_kind(&b.kind))?;
        return Some(binding_to_definition(&target.uri, binding));
    }

    let binding = container
        .top_level_bindings
        .iter()
        .find(|b| b.name == name && matches_kind(&b.kind))?;
    Some(binding_to_definition(&container.uri, binding))
}

fn resolve_upper_identifier(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    node: &Rc<Node>,
) -> Option<DefinitionNode> {
    let name = node.text();

    if let Some(parent) = node.parent() {
        if parent.kind == NodeKind::TypeAlias && is_nth_child(&parent, node, 0) {
            return Some(DefinitionNode {
                uri: container.uri.clone(),
                node: Rc::clone(node),
                node_type: DefinitionNodeType::TypeAlias,
            });
        }
        if parent.kind == NodeKind::UnionType && is_nth_child(&parent, node, 0) {
            return Some(DefinitionNode {
                uri: container.uri.clone(),
                node: Rc::clone(node),
                node_type: DefinitionNodeType::UnionType,
            });
        }
        if parent.kind == NodeKind::UnionVariant && is_nth_child(&parent, node, 0) {
            return Some(DefinitionNode {
                uri: container.uri.clone(),
                node: Rc::clone(node),
                node_type: DefinitionNodeType::UnionConstructor,
            });
        }
        if parent.kind == NodeKind::ImportAlias {
            return None;
        }
        if matches!(
            parent.kind,
            NodeKind::ExposedType | NodeKind::ExposedTypeAllConstructors | NodeKind::ExposedTypeSomeConstructors
        ) && is_nth_child(&parent, node, 0)
        {
            return resolve_exposing_entry(forest, container, node, BindingMatch::Type);
        }
        if parent.kind == NodeKind::ExposedTypeSomeConstructors && !is_nth_child(&parent, node, 0) {
            return resolve_constructor_reference(forest, container, name);
        }
    }

    match expression_context(node) {
        Context::Type => resolve_type_reference(forest, container, name),
        Context::Value => resolve_constructor_reference(forest, container, name),
        Context::ModuleReference => None,
    }
}

fn resolve_constructor_reference(forest: &Forest, container: &TreeContainer, name: &str) -> Option<DefinitionNode> {
    if let Some(binding) = container
        .top_level_bindings
        .iter()
        .find(|b| b.name == name && matches!(b.kind, BindingKind::UnionConstructor { .. }))
    {
        return Some(binding_to_definition(&container.uri, binding));
    }

    let imports = resolve_imports(container, forest);
    for import in imports.iter() {
        if let Some((module, original)) = import.exposed_locally.get(name) {
            if let Some(target) = forest.get_by_module(module) {
                if let Some(binding) = target.binding(original) {
                    if matches!(binding.kind, BindingKind::UnionConstructor { .. }) {
                        return Some(binding_to_definition(&target.uri, binding));
                    }
                }
            }
        }
    }
    None
}

fn resolve_type_reference(forest: &Forest, container: &TreeContainer, name: &str) -> Option<DefinitionNode> {
    if let Some(binding) = container
        .top_level_bindings
        .iter()
        .find(|b| b.name == name && matches!(b.kind, BindingKind::TypeAlias | BindingKind::UnionType))
    {
        return Some(binding_to_definition(&container.uri, binding));
    }

    let imports = resolve_imports(container, forest);
    for import in imports.iter() {
        if let Some((module, original)) = import.exposed_locally.get(name) {
            if let Some(target) = forest.get_by_module(module) {
                if let Some(binding) = target.binding(original) {
                    if matches!(binding.kind, BindingKind::TypeAlias | BindingKind::UnionType) {
                        return Some(binding_to_definition(&target.uri, binding));
                    }
                }
            }
        }
    }
    None
}

fn resolve_operator_identifier(
    forest: &Forest,
    container: &Rc<TreeContainer>,
    node: &Rc<Node>,
) -> Option<DefinitionNode> {
    let name = node.text();

    if let Some(parent) = node.parent() {
        if parent.kind == NodeKind::InfixDeclaration {
            return Some(DefinitionNode {
                uri: container.uri.clone(),
                node: Rc::clone(node),
                node_type: DefinitionNodeType::Operator,
            });
        }
        if parent.kind == NodeKind::ExposedOperator {
            return resolve_exposing_entry(forest, container, node, BindingMatch::Operator);
        }
    }

    if let Some(binding) = container
        .top_level_bindings
        .iter()
        .find(|b| b.name == name && matches!(b.kind, BindingKind::Operator { .. }))
    {
        return Some(binding_to_definition(&container.uri, binding));
    }

    let imports = resolve_imports(container, forest);
    for import in imports.iter() {
        if let Some((module, original)) = import.exposed_locally.get(name) {
            if let Some(target) = forest.get_by_module(module) {
                if let Some(binding) = target.binding(original) {
                    if matches!(binding.kind, BindingKind::Operator { .. }) {
                        return Some(binding_to_definition(&target.uri, binding));
                    }
                }
            }
        }
    }
    None
}

/// A multi-segment `ModuleName` node standing in value or type position:
/// the grammar's dotted-all-uppercase-path quirk means a qualified
/// constructor reference like `Mod.Just` parses as a plain `ModuleName`,
/// not a dedicated qualified-reference node. The last segment is the
/// referenced name; everything before it is the import qualifier.
fn resolve_module_name(forest: &Forest, container: &Rc<TreeContainer>, node: &Rc<Node>) -> Option<DefinitionNode> {
    if let Some(parent) = node.parent() {
        if matches!(parent.kind, NodeKind::ModuleDeclaration | NodeKind::ImportClause) {
            return None;
        }
    }

    let segments = node.children();
    let (qualifier_segments, name_segment) = segments.split_at(segments.len().checked_sub(1)?);
    let name_node = name_segment.first()?;
    let name = name_node.text();
    let qualifier = qualifier_segments
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join(".");

    let imports = resolve_imports(container, forest);
    let import = imports.iter().find(|i| i.qualifier() == qualifier)?;
    let target = forest.get_by_module(&import.source_module)?;

    match expression_context(node) {
        Context::Type => {
            let binding = target
                .top_level_bindings
                .iter()
                .find(|b| b.name == name && matches!(b.kind, BindingKind::TypeAlias | BindingKind::UnionType))?;
            Some(binding_to_definition(&target.uri, binding))
        }
        _ => {
            let binding = target
                .top_level_bindings
                .iter()
                .find(|b| b.name == name && matches!(b.kind, BindingKind::UnionConstructor { .. }))?;
            Some(binding_to_definition(&target.uri, binding))
        }
    }
}

/// `Mod.value` — a dotted path bottoming out on a lowercase name, its own
/// dedicated node kind unlike the constructor case above (the parser's
/// `parse_value_position_upper`).
fn resolve_qualified_value(forest: &Forest, container: &Rc<TreeContainer>, node: &Rc<Node>) -> Option<DefinitionNode> {
    let segments = node.children();
    let (qualifier_segments, name_segment) = segments.split_at(segments.len().checked_sub(1)?);
    let name_node = name_segment.first()?;
    let name = name_node.text();
    let qualifier = qualifier_segments
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join(".");

    let imports = resolve_imports(container, forest);
    let import = imports.iter().find(|i| i.qualifier() == qualifier)?;
    let target = forest.get_by_module(&import.source_module)?;
    let binding = target
        .top_level_bindings
        .iter()
        .find(|b| b.name == name && matches!(b.kind, BindingKind::Value | BindingKind::Port))?;
    Some(binding_to_definition(&target.uri, binding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_core::Position;

    fn uri(path: &str) -> FileUri {
        FileUri::from_path(path).unwrap()
    }

    #[test]
    fn resolves_a_use_to_a_top_level_value() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (..)\nx = 1\ny = x\n", true)
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.find("= x").unwrap() + 2;
        let position = position_at(source, offset);

        let def = find_definition(&forest, &a, position).unwrap();
        assert_eq!(def.node_type, DefinitionNodeType::Value);
        assert_eq!(def.node.text(), "x");
    }

    #[test]
    fn resolves_a_function_parameter_use() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(a.clone(), b"module A exposing (..)\nf n = n\n", true)
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.rfind('n').unwrap();
        let position = position_at(source, offset);

        let def = find_definition(&forest, &a, position).unwrap();
        assert_eq!(def.node_type, DefinitionNodeType::FunctionParameter);
    }

    #[test]
    fn resolves_a_qualified_value_reference_across_files() {
        let mut forest = Forest::new();
        forest
            .add_or_replace(uri("/workspace/src/A.limn"), b"module A exposing (x)\nx = 1\n", true)
            .unwrap();
        forest
            .add_or_replace(
                uri("/workspace/src/B.limn"),
                b"module B exposing (..)\nimport A\ny = A.x\n",
                true,
            )
            .unwrap();

        let b = uri("/workspace/src/B.limn");
        let container = forest.get_by_uri(&b).unwrap();
        let source = container.tree.source();
        let offset = source.rfind("A.x").unwrap() + 2;
        let position = position_at(source, offset);

        let def = find_definition(&forest, &b, position).unwrap();
        assert_eq!(def.uri, uri("/workspace/src/A.limn"));
        assert_eq!(def.node_type, DefinitionNodeType::Value);
    }

    #[test]
    fn resolves_a_case_pattern_bound_variable() {
        let mut forest = Forest::new();
        let a = uri("/workspace/src/A.limn");
        forest
            .add_or_replace(
                a.clone(),
                b"module A exposing (..)\nf m = case m of\n  Just x -> x\n  Nothing -> 0\n",
                true,
            )
            .unwrap();

        let container = forest.get_by_uri(&a).unwrap();
        let source = container.tree.source();
        let offset = source.find("-> x").unwrap() + 3;
        let position = position_at(source, offset);

        let def = find_definition(&forest, &a, position).unwrap();
        assert_eq!(def.node_type, DefinitionNodeType::CasePattern);
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
}
