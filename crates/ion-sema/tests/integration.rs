//! End-to-end coverage of the resolve -> bind -> solve pipeline.

use ion_common::span::SourceFile;
use ion_parser::ast::expr::Expression;
use ion_parser::Statement;
use ion_sema::{check, ty::Type};

fn parse(source: &str) -> Vec<Statement> {
    let file = SourceFile::new("test.ion", source);
    ion_parser::parse(file, source).expect("fixture must parse").0
}

#[test]
fn recursive_functions_type_check() {
    let statements = parse("fn fact(n: number): number { return n }\nfact(5)");
    assert!(check(&statements).is_ok());
}

#[test]
fn forward_reference_inside_a_function_body_is_legal() {
    let statements = parse("fn a(): void { b() }\nfn b(): void { }");
    assert!(check(&statements).is_ok());
}

#[test]
fn interface_and_instance_round_trip() {
    let statements = parse(
        "interface Shape { area(): number }\n\
         instance Circle: Shape { radius: 1 }",
    );
    assert!(check(&statements).is_ok());
}

#[test]
fn blocks_introduce_their_own_scope() {
    let statements = parse("{ let x = 1 }\nlet x = 2");
    assert!(check(&statements).is_ok());
}

#[test]
fn a_variable_read_before_definition_in_its_own_initializer_is_rejected() {
    let statements = parse("let x = x");
    let err = check(&statements).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn shadowing_across_nested_scopes_resolves_to_the_innermost_declaration() {
    let statements = parse("let x = 1\n{ let x = \"inner\"\nprint(x) }");
    let result = check(&statements).unwrap();
    let Statement::Block(block) = &statements[1] else { unreachable!() };
    let Statement::VariableDeclaration(inner_x) = &block.statements[0] else { unreachable!() };
    let Statement::ExpressionStatement(print_stmt) = &block.statements[1] else { unreachable!() };
    let Expression::Invocation(invocation) = &print_stmt.expression else { unreachable!() };
    let Expression::Identifier(arg) = &invocation.arguments[0] else { unreachable!() };
    let declared = result.bindings.symbol(inner_x.id).unwrap();
    let used = result.bindings.symbol(arg.id).unwrap();
    assert!(std::rc::Rc::ptr_eq(declared, used));
}

#[test]
fn array_literal_element_types_widen_independently_of_the_array_s_own_constness() {
    let statements = parse("let const xs = [1, 2]");
    let result = check(&statements).unwrap();
    let Statement::VariableDeclaration(decl) = &statements[0] else { unreachable!() };
    let ty = result.bindings.symbol(decl.id).unwrap().ty().unwrap();
    assert!(ty.is_same(&Type::Array(Box::new(Type::number()))));
}

#[test]
fn a_function_call_to_an_undeclared_name_is_fatal() {
    let statements = parse("undeclared_function()");
    let err = check(&statements).unwrap_err();
    assert!(err.is_fatal());
}
