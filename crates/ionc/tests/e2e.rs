//! End-to-end coverage of the `ionc compile` command: writes a fixture file, invokes
//! the built binary, and asserts on its exit code, stdout and stderr.

use std::process::Command;

fn ionc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ionc"))
}

fn write_fixture(dir: &tempfile::TempDir, source: &str) -> std::path::PathBuf {
    let path = dir.path().join("main.ion");
    std::fs::write(&path, source).expect("failed to write fixture");
    path
}

#[test]
fn a_well_formed_program_checks_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "let x = 1 + 2\nprint(\"ok\")");
    let output = ionc().arg(&path).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn reading_a_missing_file_exits_255() {
    let output = ionc().arg("/nonexistent/path/main.ion").output().unwrap();
    assert_eq!(output.status.code(), Some(255));
}

#[test]
fn an_undeclared_variable_reports_its_diagnostic_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "print(ghost)");
    let output = ionc().arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ION0012"));
    assert!(stderr.contains("ghost"));
}

#[test]
fn return_outside_a_function_fails_with_the_matching_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "return 1");
    let output = ionc().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(16));
}

#[test]
fn ambiguous_equals_warns_but_still_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "let x = 1\nif x = 1 { print(\"y\") }");
    let output = ionc().arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ION0101"));
}

#[test]
fn dump_ast_prints_statement_debug_output_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "let x = 1");
    let output = ionc().args(["--dump-ast"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("VariableDeclaration"));
}

#[test]
fn verbose_flag_raises_the_log_level_without_changing_the_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "let x = 1");
    let output = ionc().args(["-vv"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("resolving, binding and solving types"));
}
