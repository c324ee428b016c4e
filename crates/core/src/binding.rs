use crate::node::Node;
use std::rc::Rc;

/// Fixity of an infix operator declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    NonAssociative,
}

/// What kind of top-level binding a name refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Value,
    TypeAlias,
    UnionType,
    /// Carries the name of the union type this constructor belongs to, so
    /// the binding can be traced back to its parent without a separate
    /// lookup.
    UnionConstructor { parent_type: String },
    Port,
    /// The grammar attaches precedence/associativity to the declaration
    /// node itself (SPEC_FULL.md "Operator declarations"); carried here
    /// too so the resolver never has to synthesize it.
    Operator {
        precedence: u8,
        associativity: Associativity,
    },
}

/// A binding introduced at file scope.
#[derive(Clone, Debug)]
pub struct TopLevelBinding {
    pub name: String,
    pub kind: BindingKind,
    pub defining_node: Rc<Node>,
    /// The type-annotation sibling immediately preceding a value
    /// declaration, if one was written.
    pub type_annotation: Option<Rc<Node>>,
}

impl TopLevelBinding {
    pub fn new(name: impl Into<String>, kind: BindingKind, defining_node: Rc<Node>) -> Self {
        TopLevelBinding {
            name: name.into(),
            kind,
            defining_node,
            type_annotation: None,
        }
    }

    pub fn with_type_annotation(mut self, node: Rc<Node>) -> Self {
        self.type_annotation = Some(node);
        self
    }

    pub fn is_constructor_of(&self, type_name: &str) -> bool {
        matches!(&self.kind, BindingKind::UnionConstructor { parent_type } if parent_type == type_name)
    }
}
