use crate::lexer::{tokenize, Token, TokenKind};
use limn_core::{Node, NodeKind, Position, Tree};
use log::trace;
use std::rc::Rc;

/// A hand-written recursive-descent parser with token-level error
/// recovery: any construct it cannot make sense of is wrapped in a
/// `NodeKind::Error` node rather than aborting the parse; a parse always
/// succeeds with a tree.
///
/// Declarations are delimited by column, matching the convention real
/// layout-sensitive grammars in this family use: a token starting at
/// column 0 always begins a new top-level item. This is the one layout
/// rule the parser leans on; it is enough to recover declaration
/// boundaries without implementing the full off-side rule.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    source: Rc<str>,
}

/// Parse `source` into a [`Tree`]. Always succeeds.
pub fn parse(source: &str) -> Tree {
    let mut parser = Parser::new(source);
    parser.parse_source_file()
}

impl Parser {
    fn new(source: &str) -> Parser {
        let source: Rc<str> = Rc::from(source);
        let tokens = tokenize(&source);
        Parser {
            tokens,
            pos: 0,
            source,
        }
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_top_level_boundary(&self) -> bool {
        self.at(TokenKind::Eof) || self.peek().start.column == 0
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn leaf(&mut self, kind: NodeKind) -> Rc<Node> {
        let token = self.bump();
        Node::leaf(kind, token.range, token.start, token.end, Rc::clone(&self.source))
    }

    fn make(&self, kind: NodeKind, children: Vec<Rc<Node>>) -> Rc<Node> {
        let start = children
            .first()
            .map(|c| (c.range.start, c.start))
            .unwrap_or((self.peek().range.start, self.peek().start));
        let end = children
            .last()
            .map(|c| (c.range.end, c.end))
            .unwrap_or(start);

        Node::with_children(
            kind,
            start.0..end.0,
            start.1,
            end.1,
            Rc::clone(&self.source),
            children,
        )
    }

    /// Consume one token as an unrecognized subtree.
    fn error_token(&mut self) -> Rc<Node> {
        self.leaf(NodeKind::Error)
    }

    // ---- top level -------------------------------------------------

    fn parse_source_file(&mut self) -> Tree {
        let mut children = Vec::new();

        while !self.at(TokenKind::Eof) {
            children.push(self.parse_top_level_item());
        }

        let eof = self.peek();
        let root = Node::with_children(
            NodeKind::SourceFile,
            0..eof.range.end,
            Position::new(0, 0),
            eof.end,
            Rc::clone(&self.source),
            children,
        );

        Tree::new(root, Rc::clone(&self.source))
    }

    fn parse_top_level_item(&mut self) -> Rc<Node> {
        match self.peek_kind() {
            TokenKind::KwModule => self.parse_module_declaration(),
            TokenKind::KwImport => self.parse_import_clause(),
            TokenKind::KwType => self.parse_type_declaration(),
            TokenKind::KwPort => self.parse_port(),
            TokenKind::KwInfix => self.parse_infix_declaration(),
            TokenKind::LowerIdent => self.parse_lower_led_top_level_item(),
            _ => {
                trace!("skipping unrecognized top-level token {:?}", self.peek_kind());
                self.error_token()
            }
        }
    }

    /// A top-level item starting with a lowercase identifier is either a
    /// standalone type annotation (`name : Type`) or a value declaration
    /// (`name args = body`); disambiguated by what follows the name.
    fn parse_lower_led_top_level_item(&mut self) -> Rc<Node> {
        let next_is_colon = self
            .tokens
            .get(self.pos + 1)
            .map(|t| t.kind == TokenKind::Colon)
            .unwrap_or(false);

        if next_is_colon {
            self.parse_type_annotation()
        } else {
            self.parse_value_declaration()
        }
    }

    fn parse_module_declaration(&mut self) -> Rc<Node> {
        let _module_kw = self.bump(); // `module`
        let mut children = vec![self.parse_module_name()];

        if self.at(TokenKind::KwExposing) {
            children.push(self.parse_exposing_list());
        }

        self.make(NodeKind::ModuleDeclaration, children)
    }

    fn parse_import_clause(&mut self) -> Rc<Node> {
        let _import_kw = self.bump();
        let mut children = vec![self.parse_module_name()];

        if self.eat(TokenKind::KwAs).is_some() {
            let alias_name = self.leaf(NodeKind::UpperIdentifier);
            children.push(self.make(NodeKind::ImportAlias, vec![alias_name]));
        }

        if self.at(TokenKind::KwExposing) {
            children.push(self.parse_exposing_list());
        }

        self.make(NodeKind::ImportClause, children)
    }

    /// `Author.Module.Sub` as a single dotted name node.
    fn parse_module_name(&mut self) -> Rc<Node> {
        let mut segments = vec![self.leaf(NodeKind::UpperIdentifier)];
        while self.at(TokenKind::Dot)
            && self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.kind == TokenKind::UpperIdent)
                .unwrap_or(false)
        {
            let _dot = self.bump();
            segments.push(self.leaf(NodeKind::UpperIdentifier));
        }
        self.make(NodeKind::ModuleName, segments)
    }

    fn parse_exposing_list(&mut self) -> Rc<Node> {
        let _exposing_kw = self.bump();
        let mut children = Vec::new();

        if self.eat(TokenKind::LParen).is_none() {
            return self.make(NodeKind::ExposingList, children);
        }

        if self.at(TokenKind::DotDot) {
            let all = self.leaf(NodeKind::ExposingAll);
            children.push(all);
            let _ = self.eat(TokenKind::RParen);
            return self.make(NodeKind::ExposingList, children);
        }

        loop {
            if self.at(TokenKind::RParen) || self.at(TokenKind::Eof) {
                break;
            }

            children.push(self.parse_exposing_item());

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let _ = self.eat(TokenKind::RParen);
        self.make(NodeKind::ExposingList, children)
    }

    fn parse_exposing_item(&mut self) -> Rc<Node> {
        match self.peek_kind() {
            TokenKind::LowerIdent => {
                let name = self.leaf(NodeKind::LowerIdentifier);
                self.make(NodeKind::ExposedValue, vec![name])
            }
            TokenKind::LParen => {
                let _lparen = self.bump();
                let op = self.leaf(NodeKind::OperatorIdentifier);
                let _ = self.eat(TokenKind::RParen);
                self.make(NodeKind::ExposedOperator, vec![op])
            }
            TokenKind::UpperIdent => {
                let name = self.leaf(NodeKind::UpperIdentifier);

                if self.eat(TokenKind::LParen).is_some() {
                    if self.eat(TokenKind::DotDot).is_some() {
                        let _ = self.eat(TokenKind::RParen);
                        return self.make(NodeKind::ExposedTypeAllConstructors, vec![name]);
                    }

                    let mut ctors = vec![name];
                    loop {
                        if self.at(TokenKind::RParen) || self.at(TokenKind::Eof) {
                            break;
                        }
                        ctors.push(self.leaf(NodeKind::UpperIdentifier));
                        if self.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    let _ = self.eat(TokenKind::RParen);
                    return self.make(NodeKind::ExposedTypeSomeConstructors, ctors);
                }

                self.make(NodeKind::ExposedType, vec![name])
            }
            _ => self.error_token(),
        }
    }

    fn parse_type_annotation(&mut self) -> Rc<Node> {
        let name = self.leaf(NodeKind::LowerIdentifier);
        let mut children = vec![name];
        let _colon = self.bump();

        while !self.at_top_level_boundary() {
            children.push(self.parse_type_expr_token());
        }

        self.make(NodeKind::TypeAnnotation, children)
    }

    fn parse_type_expr_token(&mut self) -> Rc<Node> {
        match self.peek_kind() {
            TokenKind::UpperIdent => self.parse_module_name_or_type(),
            TokenKind::LowerIdent => self.leaf(NodeKind::LowerIdentifier),
            _ => self.leaf(NodeKind::Expression),
        }
    }

    /// A type-position identifier, possibly dotted (`Mod.Type`). Unlike
    /// value-position qualification this never needs to split into a
    /// separate qualifier + bare name, since the type lookup walks the
    /// forest's module index directly by dotted text.
    fn parse_module_name_or_type(&mut self) -> Rc<Node> {
        let mut segments = vec![self.leaf(NodeKind::UpperIdentifier)];
        while self.at(TokenKind::Dot)
            && self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.kind == TokenKind::UpperIdent)
                .unwrap_or(false)
        {
            let _dot = self.bump();
            segments.push(self.leaf(NodeKind::UpperIdentifier));
        }
        if segments.len() == 1 {
            segments.into_iter().next().unwrap()
        } else {
            self.make(NodeKind::ModuleName, segments)
        }
    }

    fn parse_value_declaration(&mut self) -> Rc<Node> {
        let name = self.leaf(NodeKind::LowerIdentifier);
        let mut children = vec![name];

        while self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::FunctionParameter));
        }

        let _ = self.eat(TokenKind::Equals);
        children.push(self.parse_expression());

        self.make(NodeKind::ValueDeclaration, children)
    }

    fn parse_type_declaration(&mut self) -> Rc<Node> {
        let _type_kw = self.bump();

        if self.eat(TokenKind::KwAlias).is_some() {
            return self.parse_type_alias();
        }

        self.parse_union_type()
    }

    fn parse_type_alias(&mut self) -> Rc<Node> {
        let name = self.leaf(NodeKind::UpperIdentifier);
        let mut children = vec![name];

        while self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::LowerIdentifier));
        }

        let _ = self.eat(TokenKind::Equals);

        while !self.at_top_level_boundary() {
            children.push(self.parse_type_expr_token());
        }

        self.make(NodeKind::TypeAlias, children)
    }

    fn parse_union_type(&mut self) -> Rc<Node> {
        let name = self.leaf(NodeKind::UpperIdentifier);
        let mut children = vec![name];

        while self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::LowerIdentifier));
        }

        let _ = self.eat(TokenKind::Equals);

        loop {
            children.push(self.parse_union_variant());
            if self.eat(TokenKind::Pipe).is_none() {
                break;
            }
        }

        self.make(NodeKind::UnionType, children)
    }

    fn parse_union_variant(&mut self) -> Rc<Node> {
        let mut children = vec![self.leaf(NodeKind::UpperIdentifier)];

        while !self.at_top_level_boundary() && !self.at(TokenKind::Pipe) {
            children.push(self.parse_type_expr_token());
        }

        self.make(NodeKind::UnionVariant, children)
    }

    fn parse_port(&mut self) -> Rc<Node> {
        let _port_kw = self.bump();
        let name = self.leaf(NodeKind::LowerIdentifier);
        let mut children = vec![name];
        let _ = self.eat(TokenKind::Colon);

        while !self.at_top_level_boundary() {
            children.push(self.parse_type_expr_token());
        }

        self.make(NodeKind::Port, children)
    }

    fn parse_infix_declaration(&mut self) -> Rc<Node> {
        let _infix_kw = self.bump();
        let mut children = Vec::new();

        if matches!(
            self.peek_kind(),
            TokenKind::KwLeft | TokenKind::KwRight | TokenKind::KwNon
        ) {
            children.push(self.leaf(NodeKind::Expression)); // associativity keyword
        }

        if self.at(TokenKind::IntLiteral) {
            children.push(self.leaf(NodeKind::Expression)); // precedence literal
        }

        if self.eat(TokenKind::LParen).is_some() {
            children.push(self.leaf(NodeKind::OperatorIdentifier));
            let _ = self.eat(TokenKind::RParen);
        } else if self.at(TokenKind::Operator) {
            children.push(self.leaf(NodeKind::OperatorIdentifier));
        }

        let _ = self.eat(TokenKind::Equals);

        if self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::LowerIdentifier));
        }

        self.make(NodeKind::InfixDeclaration, children)
    }

    // ---- expressions -------------------------------------------------

    fn parse_expression(&mut self) -> Rc<Node> {
        self.parse_operator_chain()
    }

    fn parse_operator_chain(&mut self) -> Rc<Node> {
        let mut children = vec![self.parse_application()];

        while !self.at_top_level_boundary() && self.at(TokenKind::Operator) {
            children.push(self.leaf(NodeKind::OperatorIdentifier));
            children.push(self.parse_application());
        }

        if children.len() == 1 {
            children.into_iter().next().unwrap()
        } else {
            self.make(NodeKind::Expression, children)
        }
    }

    fn parse_application(&mut self) -> Rc<Node> {
        let mut children = vec![self.parse_atom()];

        while !self.at_top_level_boundary() && self.starts_atom() {
            children.push(self.parse_atom());
        }

        if children.len() == 1 {
            children.into_iter().next().unwrap()
        } else {
            self.make(NodeKind::Expression, children)
        }
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::LowerIdent
                | TokenKind::UpperIdent
                | TokenKind::IntLiteral
                | TokenKind::StringLiteral
                | TokenKind::LParen
                | TokenKind::Backslash
        )
    }

    fn parse_atom(&mut self) -> Rc<Node> {
        match self.peek_kind() {
            TokenKind::KwLet => self.parse_let_expression(),
            TokenKind::KwCase => self.parse_case_expression(),
            TokenKind::Backslash => self.parse_lambda(),
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LowerIdent => self.leaf(NodeKind::LowerIdentifier),
            TokenKind::UpperIdent => self.parse_value_position_upper(),
            TokenKind::IntLiteral | TokenKind::StringLiteral => self.leaf(NodeKind::Expression),
            _ => self.error_token(),
        }
    }

    fn parse_parenthesized(&mut self) -> Rc<Node> {
        let _lparen = self.bump();

        if self.at(TokenKind::RParen) {
            let _rparen = self.bump();
            return self.make(NodeKind::Expression, Vec::new());
        }

        if self.at(TokenKind::Operator) {
            let op = self.leaf(NodeKind::OperatorIdentifier);
            let _ = self.eat(TokenKind::RParen);
            return op;
        }

        let inner = self.parse_expression();
        let _ = self.eat(TokenKind::RParen);
        inner
    }

    /// An uppercase identifier in expression position: either a bare
    /// constructor reference (`Just`) or a qualified value reference
    /// (`Mod.foo`) once a dotted path bottoms out on a lowercase name.
    fn parse_value_position_upper(&mut self) -> Rc<Node> {
        let mut path = vec![self.leaf(NodeKind::UpperIdentifier)];

        loop {
            let next_is_upper = self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.kind == TokenKind::UpperIdent)
                .unwrap_or(false);
            let next_is_lower = self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.kind == TokenKind::LowerIdent)
                .unwrap_or(false);

            if self.at(TokenKind::Dot) && next_is_upper {
                let _dot = self.bump();
                path.push(self.leaf(NodeKind::UpperIdentifier));
                continue;
            }

            if self.at(TokenKind::Dot) && next_is_lower {
                let _dot = self.bump();
                path.push(self.leaf(NodeKind::LowerIdentifier));
                return self.make(NodeKind::QualifiedValueReference, path);
            }

            break;
        }

        if path.len() == 1 {
            path.into_iter().next().unwrap()
        } else {
            self.make(NodeKind::ModuleName, path)
        }
    }

    fn parse_let_expression(&mut self) -> Rc<Node> {
        let _let_kw = self.bump();
        let base_column = self.peek().start.column;
        let mut children = Vec::new();

        while !self.at(TokenKind::KwIn)
            && !self.at(TokenKind::Eof)
            && self.peek().start.column == base_column
        {
            children.push(self.parse_let_declaration());
        }

        let _ = self.eat(TokenKind::KwIn);
        children.push(self.parse_expression());

        self.make(NodeKind::LetExpression, children)
    }

    fn parse_let_declaration(&mut self) -> Rc<Node> {
        let name = self.leaf(NodeKind::LowerIdentifier);
        let mut children = vec![name];

        while self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::FunctionParameter));
        }

        let _ = self.eat(TokenKind::Equals);
        children.push(self.parse_expression());

        self.make(NodeKind::LetDeclaration, children)
    }

    fn parse_case_expression(&mut self) -> Rc<Node> {
        let _case_kw = self.bump();
        let scrutinee = self.parse_application();
        let _ = self.eat(TokenKind::KwOf);

        let mut children = vec![scrutinee];

        if !self.at(TokenKind::Eof) {
            let base_column = self.peek().start.column;
            while !self.at(TokenKind::Eof) && self.peek().start.column == base_column {
                children.push(self.parse_case_branch());
            }
        }

        self.make(NodeKind::CaseExpression, children)
    }

    fn parse_case_branch(&mut self) -> Rc<Node> {
        let pattern = self.parse_pattern();
        let case_pattern = self.make(NodeKind::CasePattern, vec![pattern]);
        let _ = self.eat(TokenKind::Arrow);
        let body = self.parse_expression();
        self.make(NodeKind::CaseBranch, vec![case_pattern, body])
    }

    fn parse_pattern(&mut self) -> Rc<Node> {
        match self.peek_kind() {
            TokenKind::UpperIdent => {
                let mut children = vec![self.leaf(NodeKind::UpperIdentifier)];
                while self.at(TokenKind::LowerIdent) {
                    children.push(self.leaf(NodeKind::LowerIdentifier));
                }
                if children.len() == 1 {
                    children.into_iter().next().unwrap()
                } else {
                    self.make(NodeKind::Expression, children)
                }
            }
            TokenKind::LowerIdent => self.leaf(NodeKind::LowerIdentifier),
            TokenKind::LParen => {
                let _lparen = self.bump();
                let mut children = Vec::new();
                loop {
                    if self.at(TokenKind::RParen) || self.at(TokenKind::Eof) {
                        break;
                    }
                    children.push(self.parse_pattern());
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                let _ = self.eat(TokenKind::RParen);
                self.make(NodeKind::TuplePattern, children)
            }
            _ => self.error_token(),
        }
    }

    fn parse_lambda(&mut self) -> Rc<Node> {
        let _backslash = self.bump();
        let mut children = Vec::new();

        while self.at(TokenKind::LowerIdent) {
            children.push(self.leaf(NodeKind::AnonymousFunctionParameter));
        }

        let _ = self.eat(TokenKind::Arrow);
        children.push(self.parse_expression());

        self.make(NodeKind::Expression, children)
    }
}
