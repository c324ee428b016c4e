use crate::position::{ByteRange, Position};
use std::rc::{Rc, Weak};

/// The fixed grammar's node kinds.
///
/// `Error` nodes are produced by the parser's recovery mode and never
/// fail a parse outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    ModuleDeclaration,
    ModuleName,
    ImportClause,
    ImportAlias,
    ExposingList,
    ExposingAll,
    ExposedValue,
    ExposedType,
    ExposedTypeAllConstructors,
    ExposedTypeSomeConstructors,
    ExposedOperator,
    ValueDeclaration,
    TypeAnnotation,
    UnionType,
    UnionVariant,
    TypeAlias,
    Port,
    InfixDeclaration,
    LetExpression,
    LetDeclaration,
    CaseExpression,
    CaseBranch,
    CasePattern,
    FunctionParameter,
    AnonymousFunctionParameter,
    QualifiedValueReference,
    LowerIdentifier,
    UpperIdentifier,
    OperatorIdentifier,
    RecordPattern,
    TuplePattern,
    Expression,
    /// A subtree the parser's recovery mode could not make sense of.
    Error,
}

/// A node in a parsed concrete syntax tree.
///
/// Parent/child/sibling links are all navigable from any node. Trees are
/// immutable once built: a reparse constructs an entirely new `Tree`
/// rather than mutating this one in place.
pub struct Node {
    pub kind: NodeKind,
    pub range: ByteRange,
    pub start: Position,
    pub end: Position,
    source: Rc<str>,
    children: Vec<Rc<Node>>,
    parent: std::cell::RefCell<Weak<Node>>,
}

impl Node {
    /// Build a node together with its (already-built) children, wiring up
    /// the children's parent pointers to the freshly allocated node.
    pub fn with_children(
        kind: NodeKind,
        range: ByteRange,
        start: Position,
        end: Position,
        source: Rc<str>,
        children: Vec<Rc<Node>>,
    ) -> Rc<Node> {
        let node = Rc::new(Node {
            kind,
            range,
            start,
            end,
            source,
            children,
            parent: std::cell::RefCell::new(Weak::new()),
        });

        for child in &node.children {
            *child.parent.borrow_mut() = Rc::downgrade(&node);
        }

        node
    }

    pub fn leaf(
        kind: NodeKind,
        range: ByteRange,
        start: Position,
        end: Position,
        source: Rc<str>,
    ) -> Rc<Node> {
        Node::with_children(kind, range, start, end, source, Vec::new())
    }

    /// The exact source text this node spans.
    pub fn text(&self) -> &str {
        &self.source[self.range.clone()]
    }

    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }

    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().upgrade()
    }

    /// Walk up the parent chain looking for the first ancestor of `kind`.
    pub fn ancestor_of_kind(self: &Rc<Node>, kind: NodeKind) -> Option<Rc<Node>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind == kind {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// The sibling immediately following this node under the same parent.
    pub fn next_sibling(self: &Rc<Node>) -> Option<Rc<Node>> {
        let parent = self.parent()?;
        let index = parent
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, self))?;
        parent.children.get(index + 1).cloned()
    }

    /// The sibling immediately preceding this node under the same parent.
    pub fn prev_sibling(self: &Rc<Node>) -> Option<Rc<Node>> {
        let parent = self.parent()?;
        let index = parent
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, self))?;
        index.checked_sub(1).and_then(|i| parent.children.get(i)).cloned()
    }

    /// The smallest descendant (possibly `self`) whose byte range covers
    /// `offset`.
    pub fn smallest_covering(self: &Rc<Node>, offset: usize) -> Rc<Node> {
        for child in &self.children {
            if child.range.start <= offset && offset < child.range.end {
                return child.smallest_covering(offset);
            }
            // Zero-width or end-of-file cursor: allow landing on the last
            // child whose range ends exactly at `offset`.
            if child.range.end == offset && offset == self.range.end {
                return child.smallest_covering(offset);
            }
        }
        Rc::clone(self)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NodeKind::Error
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("range", &self.range)
            .field("text", &self.text())
            .finish()
    }
}

/// A parsed concrete syntax tree for one source file.
///
/// Parsing always succeeds: syntax errors are recorded as `Error` nodes
/// rather than failing the parse.
#[derive(Debug)]
pub struct Tree {
    root: Rc<Node>,
    source: Rc<str>,
}

impl Tree {
    pub fn new(root: Rc<Node>, source: Rc<str>) -> Tree {
        Tree { root, source }
    }

    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Convert a `(row, column)` position into a byte offset into the
    /// tree's source text.
    pub fn offset_of(&self, position: Position) -> usize {
        let mut offset = 0usize;
        for (row_index, line) in self.source.split_inclusive('\n').enumerate() {
            if row_index as u32 == position.row {
                let column = position.column as usize;
                return offset + column.min(line.len());
            }
            offset += line.len();
        }
        self.source.len()
    }

    /// The smallest node covering `position`.
    pub fn node_at(&self, position: Position) -> Rc<Node> {
        let offset = self.offset_of(position);
        self.root.smallest_covering(offset)
    }

    /// Whether the parse produced any recovery (`Error`) nodes.
    pub fn has_errors(&self) -> bool {
        fn walk(node: &Rc<Node>) -> bool {
            node.is_error() || node.children.iter().any(walk)
        }
        walk(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, range: ByteRange, source: &Rc<str>) -> Rc<Node> {
        Node::leaf(kind, range, Position::new(0, 0), Position::new(0, 0), Rc::clone(source))
    }

    #[test]
    fn smallest_covering_descends_to_leaf() {
        let source: Rc<str> = Rc::from("x = 1");
        let leaf_node = leaf(NodeKind::LowerIdentifier, 0..1, &source);
        let root = Node::with_children(
            NodeKind::SourceFile,
            0..5,
            Position::new(0, 0),
            Position::new(0, 5),
            Rc::clone(&source),
            vec![Rc::clone(&leaf_node)],
        );

        let found = root.smallest_covering(0);
        assert!(Rc::ptr_eq(&found, &leaf_node));
    }

    #[test]
    fn parent_pointer_is_wired_up() {
        let source: Rc<str> = Rc::from("x = 1");
        let leaf_node = leaf(NodeKind::LowerIdentifier, 0..1, &source);
        let root = Node::with_children(
            NodeKind::SourceFile,
            0..5,
            Position::new(0, 0),
            Position::new(0, 5),
            source,
            vec![Rc::clone(&leaf_node)],
        );

        let parent = leaf_node.parent().expect("leaf should have a parent");
        assert!(Rc::ptr_eq(&parent, &root));
    }

    #[test]
    fn siblings_navigate_in_order() {
        let source: Rc<str> = Rc::from("a b");
        let first = leaf(NodeKind::LowerIdentifier, 0..1, &source);
        let second = leaf(NodeKind::LowerIdentifier, 2..3, &source);
        let root = Node::with_children(
            NodeKind::SourceFile,
            0..3,
            Position::new(0, 0),
            Position::new(0, 3),
            source,
            vec![Rc::clone(&first), Rc::clone(&second)],
        );
        let _ = root;

        assert!(Rc::ptr_eq(&first.next_sibling().unwrap(), &second));
        assert!(Rc::ptr_eq(&second.prev_sibling().unwrap(), &first));
        assert!(first.prev_sibling().is_none());
        assert!(second.next_sibling().is_none());
    }
}
