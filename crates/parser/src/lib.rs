//! A hand-written, error-recovering recursive-descent parser producing
//! the fixed CST grammar. Parsing never fails outright: unrecognized
//! input becomes an `Error` subtree.

mod lexer;
mod parser;

pub use crate::parser::parse;
