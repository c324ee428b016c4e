use limn_core::Position;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LowerIdent,
    UpperIdent,
    Operator,
    IntLiteral,
    StringLiteral,
    KwModule,
    KwExposing,
    KwImport,
    KwAs,
    KwType,
    KwAlias,
    KwPort,
    KwInfix,
    KwLeft,
    KwRight,
    KwNon,
    KwLet,
    KwIn,
    KwCase,
    KwOf,
    LParen,
    RParen,
    Comma,
    Dot,
    DotDot,
    Equals,
    Arrow,
    Pipe,
    Colon,
    Backslash,
    Eof,
    /// A byte the lexer could not classify as the start of any token.
    Unknown,
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
    pub start: Position,
    pub end: Position,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("module", TokenKind::KwModule),
    ("exposing", TokenKind::KwExposing),
    ("import", TokenKind::KwImport),
    ("as", TokenKind::KwAs),
    ("type", TokenKind::KwType),
    ("alias", TokenKind::KwAlias),
    ("port", TokenKind::KwPort),
    ("infix", TokenKind::KwInfix),
    ("left", TokenKind::KwLeft),
    ("right", TokenKind::KwRight),
    ("non", TokenKind::KwNon),
    ("let", TokenKind::KwLet),
    ("in", TokenKind::KwIn),
    ("case", TokenKind::KwCase),
    ("of", TokenKind::KwOf),
];

/// Tokenize `source` into a flat token stream, including a trailing `Eof`
/// token so the parser never has to special-case running off the end.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = 0usize;
    let mut row = 0u32;
    let mut column = 0u32;

    let advance = |offset: &mut usize, row: &mut u32, column: &mut u32, n: usize| {
        for _ in 0..n {
            if bytes.get(*offset) == Some(&b'\n') {
                *row += 1;
                *column = 0;
            } else {
                *column += 1;
            }
            *offset += 1;
        }
    };

    while offset < bytes.len() {
        let c = source[offset..].chars().next().unwrap();

        if c.is_whitespace() {
            advance(&mut offset, &mut row, &mut column, c.len_utf8());
            continue;
        }

        if c == '-' && source[offset..].starts_with("--") {
            while offset < bytes.len() && bytes[offset] != b'\n' {
                advance(&mut offset, &mut row, &mut column, 1);
            }
            continue;
        }

        let start = Position::new(row, column);
        let start_offset = offset;

        let kind = if c.is_ascii_lowercase() || c == '_' {
            while offset < bytes.len() && is_ident_continue(source[offset..].chars().next().unwrap()) {
                advance(&mut offset, &mut row, &mut column, source[offset..].chars().next().unwrap().len_utf8());
            }
            let text = &source[start_offset..offset];
            KEYWORDS
                .iter()
                .find(|(kw, _)| *kw == text)
                .map(|(_, kind)| *kind)
                .unwrap_or(TokenKind::LowerIdent)
        } else if c.is_ascii_uppercase() {
            while offset < bytes.len() && is_ident_continue(source[offset..].chars().next().unwrap()) {
                advance(&mut offset, &mut row, &mut column, source[offset..].chars().next().unwrap().len_utf8());
            }
            TokenKind::UpperIdent
        } else if c.is_ascii_digit() {
            while offset < bytes.len() && source[offset..].chars().next().unwrap().is_ascii_digit() {
                advance(&mut offset, &mut row, &mut column, 1);
            }
            TokenKind::IntLiteral
        } else if c == '"' {
            advance(&mut offset, &mut row, &mut column, 1);
            while offset < bytes.len() && bytes[offset] != b'"' {
                advance(&mut offset, &mut row, &mut column, 1);
            }
            if offset < bytes.len() {
                advance(&mut offset, &mut row, &mut column, 1);
            }
            TokenKind::StringLiteral
        } else {
            match c {
                '(' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    TokenKind::LParen
                }
                ')' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    TokenKind::RParen
                }
                ',' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    TokenKind::Comma
                }
                '\\' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    TokenKind::Backslash
                }
                '.' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    if bytes.get(offset) == Some(&b'.') {
                        advance(&mut offset, &mut row, &mut column, 1);
                        TokenKind::DotDot
                    } else {
                        TokenKind::Dot
                    }
                }
                ':' => {
                    advance(&mut offset, &mut row, &mut column, 1);
                    TokenKind::Colon
                }
                _ if c.is_ascii_punctuation() => {
                    let sym_start = offset;
                    while offset < bytes.len() {
                        let ch = source[offset..].chars().next().unwrap();
                        if ch.is_ascii_punctuation() && !matches!(ch, '(' | ')' | ',' | '\\' | '.' | ':' | '"') {
                            advance(&mut offset, &mut row, &mut column, ch.len_utf8());
                        } else {
                            break;
                        }
                    }
                    let text = &source[sym_start..offset];
                    match text {
                        "=" => TokenKind::Equals,
                        "->" => TokenKind::Arrow,
                        "|" => TokenKind::Pipe,
                        _ => TokenKind::Operator,
                    }
                }
                _ => {
                    advance(&mut offset, &mut row, &mut column, c.len_utf8());
                    TokenKind::Unknown
                }
            }
        };

        let end = Position::new(row, column);
        tokens.push(Token {
            kind,
            range: start_offset..offset,
            start,
            end,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        range: source.len()..source.len(),
        start: Position::new(row, column),
        end: Position::new(row, column),
    });

    tokens
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}
