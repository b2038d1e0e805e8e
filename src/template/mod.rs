//! The template language
//!
//! A small indentation-based method language. Each template is a single `def` whose body uses
//! attribute stores, `return`/`yield`, one level of `if`/`else`, tuples, calls, `==`/`is`, and
//! f-strings. Generated templates are compiled by [`crate::codegen::compiler`].
//!
//! ## Module Structure
//!
//! - `ast` - Syntax tree
//! - `lexer` - Tokenization with INDENT/DEDENT
//! - `parser` - Recursive descent into [`ast::MethodDef`]
//! - `diagnostics` - [`TemplateError`] and its `miette` report

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use ast::{MethodDef, Span};
pub use diagnostics::{ErrorKind, TemplateError, TemplateReport};

/// Lex and parse a template, keeping the first error.
pub fn parse_source(source: &str) -> Result<MethodDef, TemplateError> {
    let tokens = lexer::lex(source).map_err(|mut errors| errors.remove(0))?;
    parser::parse(&tokens)
}
