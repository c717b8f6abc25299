//! Recursive-descent parser: lexer token stream -> AST (§4.2).
//!
//! Single pass, no backtracking beyond the bounded lookaheads used to disambiguate
//! generic-argument lists and function types from parenthesized tuples. The first
//! fatal diagnostic aborts parsing; non-fatal ones (`AmbiguousEquals`, `UnreachableCode`)
//! are collected alongside the successful result.

pub mod ast;
mod parser;

pub use ast::{Expression, NodeId, Statement, TypeRef};

use std::sync::Arc;

use ion_common::span::SourceFile;
use ion_common::Diagnostic;

/// Lexes and parses a whole source file, returning its top-level statements plus any
/// non-fatal diagnostics collected along the way.
pub fn parse(file: Arc<SourceFile>, source: &str) -> Result<(Vec<Statement>, Vec<Diagnostic>), Diagnostic> {
    let tokens = ion_lexer::Lexer::tokenize(file, source)?;
    parser::parse(tokens)
}
