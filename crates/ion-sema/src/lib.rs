//! Semantic analysis for Ion: name resolution, symbol binding, and type solving.
//!
//! Sits between the parser and `ionc`'s codegen-free diagnostic driver. Runs the AST
//! the parser hands back through three passes, each allowed to assume the previous one
//! already succeeded:
//!
//! - [`resolver`]: validates every name use is legal (declared, in scope, used in a
//!   legal context for `break`/`continue`/`return`/`await`).
//! - [`binder`]: attaches a [`symbol::Symbol`] to every declaration and use.
//! - [`infer`]: computes a [`ty::Type`] for the forms that have one.
//!
//! The first fatal [`Diagnostic`] from any pass stops the pipeline; non-fatal warnings
//! from all passes are collected and returned alongside a successful result.

pub mod binder;
pub mod builtins;
pub mod infer;
pub mod resolver;
pub mod symbol;
pub mod ty;

use ion_common::Diagnostic;
use ion_parser::Statement;

use crate::binder::{Binder, Bindings};
use crate::infer::TypeSolver;
use crate::resolver::Resolver;

/// Everything semantic analysis produces for a checked program: the symbol/type side
/// table and any non-fatal warnings collected along the way.
pub struct CheckResult {
    pub bindings: Bindings,
    pub warnings: Vec<Diagnostic>,
}

/// Runs name resolution, binding, and type solving over an already-parsed program.
///
/// Returns the first fatal diagnostic encountered, from whichever pass raised it.
pub fn check(statements: &[Statement]) -> Result<CheckResult, Diagnostic> {
    let mut warnings = Resolver::new().resolve_program(statements)?;
    let bindings = Binder::new().bind_program(statements)?;
    TypeSolver::new(&bindings).solve_program(statements)?;
    warnings.sort_by_key(|d| (d.span.start.line, d.span.start.column));
    Ok(CheckResult { bindings, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ion_common::span::SourceFile;

    fn parse(source: &str) -> Vec<Statement> {
        let file = SourceFile::new("test.ion", source);
        ion_parser::parse(file, source).expect("fixture must parse").0
    }

    #[test]
    fn a_well_formed_program_checks_clean() {
        let statements = parse("let x = 1\nlet y = x + 1\nprint(\"ok\")");
        let result = check(&statements);
        assert!(result.is_ok());
    }

    #[test]
    fn an_undeclared_name_is_a_fatal_diagnostic() {
        let statements = parse("print(missing)");
        let err = check(&statements).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn a_bare_equals_condition_is_a_collected_warning() {
        let statements = parse("let x = 1\nif x = 1 { print(\"y\") }");
        let result = check(&statements).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn checking_binds_and_types_variable_declarations() {
        let statements = parse("let x = 1");
        let result = check(&statements).unwrap();
        let Statement::VariableDeclaration(decl) = &statements[0] else { unreachable!() };
        let ty = result.bindings.symbol(decl.id).unwrap().ty().unwrap();
        assert!(ty.is_same(&ty::Type::number()));
    }
}
