//! Compile the template into an ES module syntax tree.
//!
//! This process has three stages:
//! - The lexer chunks the template source into tokens.
//! - The parser constructs a template AST from the token stream.
//! - The lowerer translates the AST into the target syntax tree.

pub(crate) mod lex;
mod lower;
mod parse;
mod yard;

use crate::types::js;
use crate::Result;

/// Compile a template into a module program.
pub(crate) fn module(source: &str, name: Option<&str>) -> Result<js::Program> {
    let template = parse::Parser::new(source).parse_template()?;
    lower::template(&template, source, name)
}
