//! End-to-end coverage of diagnostic codes, severities and exit codes raised by the
//! resolve/bind passes against real source text.

use ion_common::span::SourceFile;
use ion_common::DiagnosticKind;
use ion_parser::Statement;
use ion_sema::check;

fn parse(source: &str) -> Vec<Statement> {
    let file = SourceFile::new("test.ion", source);
    ion_parser::parse(file, source).expect("fixture must parse").0
}

#[test]
fn undeclared_name_reports_variable_not_found() {
    let statements = parse("print(ghost)");
    let err = check(&statements).unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::VariableNotFound { ref name } if name == "ghost"));
    assert_eq!(err.exit_code(), 12);
}

#[test]
fn duplicate_variable_in_the_same_scope_reports_duplicate_variable() {
    let statements = parse("let x = 1\nlet x = 2");
    let err = check(&statements).unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::DuplicateVariable { ref name } if name == "x"));
}

#[test]
fn return_outside_a_function_reports_invalid_return() {
    let statements = parse("return 1");
    let err = check(&statements).unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::InvalidReturn));
    assert_eq!(err.exit_code(), 16);
}

#[test]
fn break_outside_a_loop_reports_invalid_break() {
    let statements = parse("break");
    let err = check(&statements).unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::InvalidBreak));
}

#[test]
fn await_outside_an_async_function_reports_invalid_await() {
    let statements = parse("await ready()");
    let err = check(&statements).unwrap_err();
    assert!(matches!(err.kind, DiagnosticKind::InvalidAwait));
}

#[test]
fn a_rendered_diagnostic_includes_the_offending_line() {
    let statements = parse("let x = 1\nprint(ghost)");
    let err = check(&statements).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("ION0012"));
    assert!(rendered.contains("print(ghost)"));
}

#[test]
fn ambiguous_equals_is_a_warning_and_does_not_block_checking() {
    let statements = parse("let x = 1\nif x = 1 { print(\"y\") }");
    let result = check(&statements).unwrap();
    assert!(matches!(result.warnings[0].kind, DiagnosticKind::AmbiguousEquals));
    assert_eq!(result.warnings[0].exit_code(), 101);
}

#[test]
fn an_internal_invariant_violation_would_always_exit_255() {
    let err = ion_common::Diagnostic::new(
        DiagnosticKind::Internal("unreachable state".to_string()),
        dummy_span(),
    );
    assert_eq!(err.exit_code(), 255);
}

fn dummy_span() -> ion_common::span::FileSpan {
    let file = SourceFile::new("test.ion", "x");
    let statements = ion_parser::parse(file, "x").unwrap().0;
    statements[0].span().clone()
}
