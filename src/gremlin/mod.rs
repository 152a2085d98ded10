//! # Gremlin Language
//!
//! The query-building half of the mapper plus a small reader for the same
//! step subset.
//!
//! - [`builder`]: typed values → query text. Pure functions, no I/O.
//! - [`lexer`] / [`parser`]: query text → [`ast::Traversal`], used by the
//!   in-memory transport to execute what the builder emits.

pub mod ast;
pub mod builder;
pub mod lexer;
pub mod parser;
mod query;

pub use query::{quote, Query};

use crate::Result;
use ast::Traversal;

/// Parse a Gremlin query string into an AST.
pub fn parse(query: &str) -> Result<Traversal> {
    let tokens = lexer::tokenize(query)?;
    parser::parse_traversal(&tokens)
}
