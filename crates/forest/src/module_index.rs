use limn_core::{
    Associativity, BindingKind, ConstructorExposure, ExposedItem, ExposingSet, ModuleName, Node,
    NodeKind, TopLevelBinding,
};
use std::rc::Rc;

/// A tree's module declaration, extracted before its bindings.
pub struct ModuleHeader {
    pub module_name: ModuleName,
    pub exposing: ExposingSet,
}

/// Extract the module declaration from a parsed source file, falling
/// back to the synthesized `Main` name and an empty exposing set when
/// the file has no `module ... exposing (...)` header at all.
pub fn extract_module_header(root: &Rc<Node>) -> ModuleHeader {
    for child in root.children() {
        if child.kind == NodeKind::ModuleDeclaration {
            let module_name = dotted_name(&child.children()[0]);
            let exposing = child
                .children()
                .get(1)
                .map(|node| exposing_set_from_node(node))
                .unwrap_or_else(|| ExposingSet::Explicit(Vec::new()));
            return ModuleHeader {
                module_name,
                exposing,
            };
        }
    }

    ModuleHeader {
        module_name: ModuleName::synthesized_main(),
        exposing: ExposingSet::Explicit(Vec::new()),
    }
}

/// The dotted text of a `ModuleName` node (one or more `UpperIdentifier`
/// children joined with `.`).
pub fn dotted_name(node: &Rc<Node>) -> ModuleName {
    let joined = node
        .children()
        .iter()
        .map(|c| c.text())
        .collect::<Vec<_>>()
        .join(".");
    ModuleName::new(joined)
}

fn exposing_set_from_node(node: &Rc<Node>) -> ExposingSet {
    if node
        .children()
        .iter()
        .any(|c| c.kind == NodeKind::ExposingAll)
    {
        return ExposingSet::All;
    }

    let items = node
        .children()
        .iter()
        .filter_map(exposed_item_from_node)
        .collect();
    ExposingSet::Explicit(items)
}

fn exposed_item_from_node(node: &Rc<Node>) -> Option<ExposedItem> {
    match node.kind {
        NodeKind::ExposedValue => Some(ExposedItem::Value(node.children().first()?.text().to_string())),
        NodeKind::ExposedOperator => {
            Some(ExposedItem::Operator(node.children().first()?.text().to_string()))
        }
        NodeKind::ExposedType => Some(ExposedItem::Type {
            name: node.children().first()?.text().to_string(),
            constructors: None,
        }),
        NodeKind::ExposedTypeAllConstructors => Some(ExposedItem::Type {
            name: node.children().first()?.text().to_string(),
            constructors: Some(ConstructorExposure::All),
        }),
        NodeKind::ExposedTypeSomeConstructors => {
            let mut children = node.children().iter();
            let name = children.next()?.text().to_string();
            let ctors = children.map(|c| c.text().to_string()).collect();
            Some(ExposedItem::Type {
                name,
                constructors: Some(ConstructorExposure::Some(ctors)),
            })
        }
        _ => None,
    }
}

/// Every value declaration, type alias, union type (+ constructors), port,
/// and infix operator declared at file scope, each carrying its defining
/// node and, for values, a preceding type-annotation sibling.
pub fn extract_top_level_bindings(root: &Rc<Node>) -> Vec<TopLevelBinding> {
    let children = root.children();
    let mut bindings = Vec::new();

    for (index, node) in children.iter().enumerate() {
        match node.kind {
            NodeKind::ValueDeclaration => {
                let name_node = &node.children()[0];
                let name = name_node.text().to_string();
                let mut binding =
                    TopLevelBinding::new(name.clone(), BindingKind::Value, Rc::clone(name_node));

                if let Some(previous) = index.checked_sub(1).and_then(|i| children.get(i)) {
                    if previous.kind == NodeKind::TypeAnnotation
                        && previous.children().first().map(|n| n.text()) == Some(name.as_str())
                    {
                        binding = binding.with_type_annotation(Rc::clone(previous));
                    }
                }

                bindings.push(binding);
            }
            NodeKind::TypeAlias => {
                let name_node = &node.children()[0];
                bindings.push(TopLevelBinding::new(
                    name_node.text().to_string(),
                    BindingKind::TypeAlias,
                    Rc::clone(name_node),
                ));
            }
            NodeKind::UnionType => {
                let type_name_node = &node.children()[0];
                let type_name = type_name_node.text().to_string();
                bindings.push(TopLevelBinding::new(
                    type_name.clone(),
                    BindingKind::UnionType,
                    Rc::clone(type_name_node),
                ));

                for variant in node
                    .children()
                    .iter()
                    .filter(|c| c.kind == NodeKind::UnionVariant)
                {
                    let ctor_name_node = &variant.children()[0];
                    bindings.push(TopLevelBinding::new(
                        ctor_name_node.text().to_string(),
                        BindingKind::UnionConstructor {
                            parent_type: type_name.clone(),
                        },
                        Rc::clone(ctor_name_node),
                    ));
                }
            }
            NodeKind::Port => {
                let name_node = &node.children()[0];
                bindings.push(TopLevelBinding::new(
                    name_node.text().to_string(),
                    BindingKind::Port,
                    Rc::clone(name_node),
                ));
            }
            NodeKind::InfixDeclaration => {
                if let Some(op_node) = node
                    .children()
                    .iter()
                    .find(|c| c.kind == NodeKind::OperatorIdentifier)
                {
                    let (precedence, associativity) = infix_metadata(node);
                    bindings.push(TopLevelBinding::new(
                        op_node.text().to_string(),
                        BindingKind::Operator {
                            precedence,
                            associativity,
                        },
                        Rc::clone(op_node),
                    ));
                }
            }
            _ => {}
        }
    }

    bindings
}

/// `infix left 9 (+) = add` carries its precedence and associativity as
/// bare `Expression` leaves (the grammar's generic fallback node); this
/// reads them back out by text rather than by a dedicated node kind,
/// since the parser never distinguished them at parse time.
fn infix_metadata(node: &Rc<Node>) -> (u8, Associativity) {
    let mut precedence = 9u8;
    let mut associativity = Associativity::Left;

    for child in node.children() {
        if child.kind != NodeKind::Expression {
            continue;
        }
        let text = child.text();
        match text {
            "left" => associativity = Associativity::Left,
            "right" => associativity = Associativity::Right,
            "non" => associativity = Associativity::NonAssociative,
            _ => {
                if let Ok(parsed) = text.parse::<u8>() {
                    precedence = parsed;
                }
            }
        }
    }

    (precedence, associativity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_parser::parse;

    #[test]
    fn extracts_module_name_and_explicit_exposing() {
        let tree = parse("module A exposing (x)\n\nx = 1\n");
        let header = extract_module_header(tree.root());
        assert_eq!(header.module_name, ModuleName::new("A"));
        assert_eq!(header.exposing, ExposingSet::Explicit(vec![ExposedItem::Value("x".to_string())]));
    }

    #[test]
    fn synthesizes_main_when_no_module_declaration() {
        let tree = parse("x = 1\n");
        let header = extract_module_header(tree.root());
        assert_eq!(header.module_name, ModuleName::synthesized_main());
    }

    #[test]
    fn wildcard_exposing_is_all() {
        let tree = parse("module A exposing (..)\n\nx = 1\n");
        let header = extract_module_header(tree.root());
        assert_eq!(header.exposing, ExposingSet::All);
    }

    #[test]
    fn value_binding_carries_type_annotation_sibling() {
        let tree = parse("x : Int\nx = 1\n");
        let bindings = extract_top_level_bindings(tree.root());
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].type_annotation.is_some());
    }

    #[test]
    fn union_type_exposes_constructors_pointing_back_to_parent() {
        let tree = parse("type Maybe a = Just a | Nothing\n");
        let bindings = extract_top_level_bindings(tree.root());
        assert_eq!(bindings.len(), 3);
        assert!(bindings[0].kind == BindingKind::UnionType);
        assert!(bindings[1].is_constructor_of("Maybe"));
        assert!(bindings[2].is_constructor_of("Maybe"));
    }
}
