use ion_common::span::SourceFile;
use ion_parser::ast::expr::*;
use ion_parser::ast::item::*;
use ion_parser::ast::ty::*;
use ion_parser::{parse, Statement};

fn parse_ok(source: &str) -> Vec<Statement> {
    let file = SourceFile::new("test.ion", source);
    let (statements, diagnostics) = parse(file, source).expect("fixture source must parse");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    statements
}

fn single_expression(source: &str) -> Expression {
    match parse_ok(source).into_iter().next().expect("one statement") {
        Statement::ExpressionStatement(s) => s.expression,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ── Precedence ──────────────────────────────────────────────────────────

#[test]
fn multiplicative_binds_tighter_than_additive() {
    let expr = single_expression("1 + 2 * 3");
    let Expression::BinaryOp(top) = expr else { panic!("expected BinaryOp") };
    assert_eq!(top.operator, BinaryOperator::Add);
    assert!(matches!(*top.right, Expression::BinaryOp(ref b) if b.operator == BinaryOperator::Mul));
}

#[test]
fn exponent_is_left_associative() {
    // 2 ^ 3 ^ 2 => (2 ^ 3) ^ 2
    let expr = single_expression("2 ^ 3 ^ 2");
    let Expression::BinaryOp(top) = expr else { panic!("expected BinaryOp") };
    assert_eq!(top.operator, BinaryOperator::Exp);
    assert!(matches!(*top.left, Expression::BinaryOp(ref b) if b.operator == BinaryOperator::Exp));
}

#[test]
fn ternary_is_right_associative_and_binds_looser_than_comparison() {
    let expr = single_expression("a > b ? c : d");
    let Expression::TernaryOp(t) = expr else { panic!("expected TernaryOp") };
    assert!(matches!(*t.condition, Expression::BinaryOp(ref b) if b.operator == BinaryOperator::Gt));
}

#[test]
fn null_coalesce_binds_looser_than_or() {
    let expr = single_expression("a || b ?? c");
    let Expression::BinaryOp(top) = expr else { panic!("expected BinaryOp") };
    assert_eq!(top.operator, BinaryOperator::NullCoalesce);
}

#[test]
fn range_is_not_left_recursive_through_comparisons() {
    let expr = single_expression("1..10");
    assert!(matches!(expr, Expression::RangeLiteral(ref r) if !r.inclusive));
}

#[test]
fn inclusive_range() {
    let expr = single_expression("1..=10");
    assert!(matches!(expr, Expression::RangeLiteral(ref r) if r.inclusive));
}

// ── Assignment ──────────────────────────────────────────────────────────

#[test]
fn compound_assignment_produces_operator() {
    let expr = single_expression("x += 1");
    let Expression::AssignmentOp(a) = expr else { panic!("expected AssignmentOp") };
    assert_eq!(a.compound_operator, Some(BinaryOperator::Add));
}

#[test]
fn assignment_to_non_target_is_rejected() {
    let file = SourceFile::new("test.ion", "1 + 1 = 2");
    assert!(parse(file, "1 + 1 = 2").is_err());
}

#[test]
fn assignment_is_right_associative() {
    let expr = single_expression("a = b = 1");
    let Expression::AssignmentOp(outer) = expr else { panic!("expected AssignmentOp") };
    assert!(matches!(*outer.value, Expression::AssignmentOp(_)));
}

// ── Generic-argument disambiguation ─────────────────────────────────────

#[test]
fn less_than_between_identifiers_is_comparison_not_generics() {
    let expr = single_expression("a < b");
    assert!(matches!(expr, Expression::BinaryOp(ref b) if b.operator == BinaryOperator::Lt));
}

#[test]
fn generic_invocation_parses_type_arguments() {
    let expr = single_expression("identity<number>(1)");
    let Expression::Invocation(inv) = expr else { panic!("expected Invocation") };
    assert_eq!(inv.type_arguments.len(), 1);
    assert!(matches!(inv.type_arguments[0], TypeRef::PrimitiveTypeRef(_)));
}

#[test]
fn nested_generic_invocation_splits_compound_right_angle() {
    let expr = single_expression("wrap<box<number>>(1)");
    let Expression::Invocation(inv) = expr else { panic!("expected Invocation") };
    assert_eq!(inv.type_arguments.len(), 1);
    let TypeRef::TypeNameRef(inner) = &inv.type_arguments[0] else { panic!("expected TypeNameRef") };
    assert_eq!(inner.name, "box");
}

#[test]
fn double_nested_generic_splits_triple_right_angle() {
    let expr = single_expression("a<b<c<number>>>(1)");
    assert!(matches!(expr, Expression::Invocation(_)));
}

// ── Postfix chains ──────────────────────────────────────────────────────

#[test]
fn postfix_chain_applies_left_to_right() {
    let expr = single_expression("a.b(c)[d]");
    let Expression::ElementAccess(outer) = expr else { panic!("expected ElementAccess") };
    assert!(matches!(*outer.target, Expression::Invocation(_)));
}

#[test]
fn optional_member_access() {
    let expr = single_expression("a?.b");
    assert!(matches!(expr, Expression::OptionalMemberAccess(_)));
}

// ── Literals ─────────────────────────────────────────────────────────────

#[test]
fn numeric_unit_suffix_converts_to_seconds() {
    let expr = single_expression("500ms");
    let Expression::PrimitiveLiteral(lit) = expr else { panic!("expected PrimitiveLiteral") };
    assert!(matches!(lit.value, PrimitiveValue::Number(n) if (n - 0.5).abs() < f64::EPSILON));
}

#[test]
fn string_without_interpolation_collapses_to_literal() {
    let expr = single_expression(r#""hello""#);
    assert!(matches!(expr, Expression::PrimitiveLiteral(_)));
}

#[test]
fn interpolated_string_keeps_parts_and_interpolations() {
    let expr = single_expression(r#""count is #{1 + 1}""#);
    let Expression::InterpolatedString(s) = expr else { panic!("expected InterpolatedString") };
    assert_eq!(s.parts.len(), 2);
    assert_eq!(s.interpolations.len(), 1);
}

#[test]
fn escape_sequences_decoded() {
    let expr = single_expression(r#""a\nb""#);
    let Expression::PrimitiveLiteral(lit) = expr else { panic!("expected PrimitiveLiteral") };
    assert!(matches!(lit.value, PrimitiveValue::String(ref s) if s == "a\nb"));
}

#[test]
fn rgb_and_hsv_literals() {
    assert!(matches!(single_expression("rgb(1, 2, 3)"), Expression::RgbLiteral(_)));
    assert!(matches!(single_expression("hsv(1, 2, 3)"), Expression::HsvLiteral(_)));
}

#[test]
fn vector_literal() {
    let expr = single_expression("{1, 2, 3}");
    assert!(matches!(expr, Expression::VectorLiteral(ref v) if v.components.len() == 3));
}

#[test]
fn tuple_vs_parenthesized() {
    assert!(matches!(single_expression("(1, 2)"), Expression::TupleLiteral(_)));
    assert!(matches!(single_expression("(1)"), Expression::Parenthesized(_)));
}

// ── typeof / nameof / await ──────────────────────────────────────────────

#[test]
fn nameof_rejects_non_reference_target() {
    let file = SourceFile::new("test.ion", "nameof 1 + 1");
    assert!(parse(file, "nameof 1 + 1").is_err());
}

#[test]
fn nameof_accepts_member_access() {
    assert!(matches!(single_expression("nameof a.b"), Expression::NameOf(_)));
}

#[test]
fn typeof_and_await() {
    assert!(matches!(single_expression("typeof x"), Expression::TypeOf(_)));
    assert!(matches!(single_expression("await x"), Expression::Await(_)));
}

// ── Types ─────────────────────────────────────────────────────────────────

fn declared_type(source: &str) -> TypeRef {
    match parse_ok(source).into_iter().next().expect("one statement") {
        Statement::TypeDeclaration(t) => t.value,
        other => panic!("expected type declaration, got {other:?}"),
    }
}

#[test]
fn primitive_type_names_are_reclassified_from_identifiers() {
    assert!(matches!(declared_type("type T = number"), TypeRef::PrimitiveTypeRef(ref p) if p.kind == PrimitiveTypeKind::Number));
}

#[test]
fn nullable_wraps_inner_type() {
    assert!(matches!(declared_type("type T = string?"), TypeRef::NullableTypeRef(_)));
}

#[test]
fn array_suffix_wraps_element_type() {
    assert!(matches!(declared_type("type T = number[]"), TypeRef::ArrayTypeRef(_)));
}

#[test]
fn union_and_intersection_types() {
    assert!(matches!(declared_type("type T = number | string"), TypeRef::UnionTypeRef(_)));
    assert!(matches!(declared_type("type T = Foo & Bar"), TypeRef::IntersectionTypeRef(_)));
}

#[test]
fn parenthesized_tuple_type_is_not_mistaken_for_function_type() {
    assert!(matches!(declared_type("type T = (number, string)"), TypeRef::TupleTypeRef(_)));
}

#[test]
fn function_type_requires_long_arrow() {
    let ty = declared_type("type T = (number, string) --> bool");
    let TypeRef::FunctionTypeRef(f) = ty else { panic!("expected FunctionTypeRef") };
    assert_eq!(f.parameters.len(), 2);
}

#[test]
fn generic_type_name_carries_type_arguments() {
    let ty = declared_type("type T = Box<number>");
    let TypeRef::TypeNameRef(n) = ty else { panic!("expected TypeNameRef") };
    assert_eq!(n.type_arguments.len(), 1);
}

#[test]
fn type_parameter_with_bound_and_default() {
    let statements = parse_ok("type Container<T: number = 0> = T[]");
    let Statement::TypeDeclaration(decl) = &statements[0] else { panic!("expected TypeDeclaration") };
    assert_eq!(decl.type_parameters.len(), 1);
    assert!(decl.type_parameters[0].bound.is_some());
    assert!(decl.type_parameters[0].default.is_some());
}

// ── Statements ───────────────────────────────────────────────────────────

#[test]
fn variable_declaration_with_annotation_and_initializer() {
    let statements = parse_ok("let x: number = 1");
    let Statement::VariableDeclaration(v) = &statements[0] else { panic!("expected VariableDeclaration") };
    assert!(!v.is_const);
    assert!(v.colon_type.is_some());
    assert!(v.initializer.is_some());
}

#[test]
fn const_variable_declaration() {
    let statements = parse_ok("let const x = 1");
    assert!(matches!(&statements[0], Statement::VariableDeclaration(v) if v.is_const));
}

#[test]
fn if_else_chain() {
    let statements = parse_ok("if a { 1 } else if b { 2 } else { 3 }");
    let Statement::If(outer) = &statements[0] else { panic!("expected If") };
    assert!(matches!(outer.else_branch.as_deref(), Some(Statement::If(_))));
}

#[test]
fn ambiguous_equals_in_condition_is_a_warning_not_an_error() {
    let file = SourceFile::new("test.ion", "if x = 1 { }");
    let (_, diagnostics) = parse(file, "if x = 1 { }").expect("parses with a warning");
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn repeat_while_runs_condition_after_body() {
    let statements = parse_ok("repeat { x += 1 } while x < 10");
    assert!(matches!(&statements[0], Statement::Repeat(_)));
}

#[test]
fn for_loop_over_names() {
    let statements = parse_ok("for key, value : items { }");
    let Statement::For(f) = &statements[0] else { panic!("expected For") };
    assert_eq!(f.names, vec!["key".to_string(), "value".to_string()]);
}

#[test]
fn every_with_optional_while_clause() {
    let with_condition = parse_ok("every 1h while active { tick() }");
    assert!(matches!(&with_condition[0], Statement::Every(e) if e.condition.is_some()));

    let without_condition = parse_ok("every 1h { tick() }");
    assert!(matches!(&without_condition[0], Statement::Every(e) if e.condition.is_none()));
}

#[test]
fn match_with_comma_separated_comparands_and_else() {
    let statements = parse_ok(
        r#"match x {
            1, 2 --> "low",
            else --> "other"
        }"#,
    );
    let Statement::Match(m) = &statements[0] else { panic!("expected Match") };
    assert_eq!(m.cases.len(), 1);
    assert_eq!(m.cases[0].comparands.len(), 2);
    assert!(m.else_case.is_some());
}

#[test]
fn import_wildcard_and_named() {
    let wildcard = parse_ok(r#"import * from utils"#);
    assert!(matches!(&wildcard[0], Statement::Import(i) if i.is_wildcard));

    let named = parse_ok(r#"import a, b from utils"#);
    let Statement::Import(i) = &named[0] else { panic!("expected Import") };
    assert_eq!(i.names, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(i.module_name, "utils");
}

// ── Return newline-sensitivity ────────────────────────────────────────────

#[test]
fn return_with_value_on_same_line() {
    let statements = parse_ok("fn f() { return 1 }");
    let Statement::FunctionDeclaration(f) = &statements[0] else { panic!("expected FunctionDeclaration") };
    let Statement::Block(body) = f.body.as_ref() else { panic!("expected Block") };
    assert!(matches!(&body.statements[0], Statement::Return(r) if r.expression.is_some()));
}

#[test]
fn return_omits_expression_before_semicolon() {
    let statements = parse_ok("fn f() { return; 1 }");
    let Statement::FunctionDeclaration(f) = &statements[0] else { panic!("expected FunctionDeclaration") };
    let Statement::Block(body) = f.body.as_ref() else { panic!("expected Block") };
    assert!(matches!(&body.statements[0], Statement::Return(r) if r.expression.is_none()));
}

#[test]
fn return_omits_expression_across_a_line_break() {
    let statements = parse_ok("fn f() {\n  return\n  1\n}");
    let Statement::FunctionDeclaration(f) = &statements[0] else { panic!("expected FunctionDeclaration") };
    let Statement::Block(body) = f.body.as_ref() else { panic!("expected Block") };
    assert!(matches!(&body.statements[0], Statement::Return(r) if r.expression.is_none()));
}

// ── Unreachable-code warning ───────────────────────────────────────────────

#[test]
fn statement_after_return_is_flagged_unreachable() {
    let file = SourceFile::new("test.ion", "fn f() { return 1; 2; }");
    let (_, diagnostics) = parse(file, "fn f() { return 1; 2; }").expect("parses with a warning");
    assert_eq!(diagnostics.len(), 1);
}

// ── Function declarations ──────────────────────────────────────────────────

#[test]
fn arrow_body_is_wrapped_as_implicit_return() {
    let statements = parse_ok("fn square(x: number): number --> x * x");
    let Statement::FunctionDeclaration(f) = &statements[0] else { panic!("expected FunctionDeclaration") };
    let Statement::Block(body) = f.body.as_ref() else { panic!("expected Block") };
    assert_eq!(body.statements.len(), 1);
    assert!(matches!(&body.statements[0], Statement::Return(r) if r.expression.is_some()));
}

#[test]
fn async_fn_requires_the_fn_keyword_immediately_after() {
    let statements = parse_ok("async fn f() { }");
    assert!(matches!(&statements[0], Statement::FunctionDeclaration(f) if f.is_async));
}

#[test]
fn decorator_before_function_is_attached() {
    let statements = parse_ok("@memoize fn f() { }");
    let Statement::FunctionDeclaration(f) = &statements[0] else { panic!("expected FunctionDeclaration") };
    assert_eq!(f.decorators.len(), 1);
    assert_eq!(f.decorators[0].name, "memoize");
}

#[test]
fn decorator_before_non_function_is_rejected() {
    let file = SourceFile::new("test.ion", "@memoize let x = 1");
    assert!(parse(file, "@memoize let x = 1").is_err());
}

#[test]
fn export_wraps_a_declaration() {
    let statements = parse_ok("export let x = 1");
    assert!(matches!(&statements[0], Statement::Export(e) if e.declaration.is_declaration()));
}

#[test]
fn export_without_a_declaration_is_rejected() {
    let file = SourceFile::new("test.ion", "export 1 + 1");
    assert!(parse(file, "export 1 + 1").is_err());
}

// ── Enum / interface / event declarations ──────────────────────────────────

#[test]
fn enum_members_may_carry_explicit_values() {
    let statements = parse_ok("enum Color { Red = 1, Green, Blue }");
    let Statement::EnumDeclaration(e) = &statements[0] else { panic!("expected EnumDeclaration") };
    assert_eq!(e.members.len(), 3);
    assert!(e.members[0].value.is_some());
    assert!(e.members[1].value.is_none());
}

#[test]
fn interface_mixes_fields_and_methods() {
    let statements = parse_ok(
        r#"interface Shape {
            const name: string;
            fn area(): number;
        }"#,
    );
    let Statement::InterfaceDeclaration(i) = &statements[0] else { panic!("expected InterfaceDeclaration") };
    assert_eq!(i.members.len(), 2);
    assert!(matches!(i.members[0], InterfaceMember::Field(ref f) if f.is_const));
    assert!(matches!(i.members[1], InterfaceMember::Method(_)));
}

#[test]
fn event_declaration_parameter_types_are_optional() {
    let bare = parse_ok("event Ping");
    assert!(matches!(&bare[0], Statement::EventDeclaration(e) if e.parameter_types.is_empty()));

    let with_params = parse_ok("event Message(string, number)");
    assert!(matches!(&with_params[0], Statement::EventDeclaration(e) if e.parameter_types.len() == 2));
}

// ── Instance constructors ───────────────────────────────────────────────────

#[test]
fn instance_constructor_with_property_name_and_tag_declarators() {
    let statements = parse_ok(
        r#"instance Widget: Button {
            "main button"
            #primary
            width: 10
            @label: "Go"
        }"#,
    );
    let Statement::InstanceConstructor(inst) = &statements[0] else { panic!("expected InstanceConstructor") };
    assert_eq!(inst.declarators.len(), 4);
    assert!(matches!(inst.declarators[0], InstanceDeclarator::Name(_)));
    assert!(matches!(inst.declarators[1], InstanceDeclarator::Tag(_)));
    assert!(matches!(inst.declarators[2], InstanceDeclarator::Property(_)));
    assert!(matches!(inst.declarators[3], InstanceDeclarator::Attribute(_)));
}

#[test]
fn instance_constructor_clone_clause() {
    let statements = parse_ok("instance Widget: Button clone template { }");
    assert!(matches!(&statements[0], Statement::InstanceConstructor(i) if i.clone_target.is_some()));
}

#[test]
fn instance_constructor_parent_arrow() {
    let statements = parse_ok("instance Widget: Button { } --> root");
    assert!(matches!(&statements[0], Statement::InstanceConstructor(i) if i.parent.is_some()));
}

// ── Blocks / semicolons ─────────────────────────────────────────────────────

#[test]
fn semicolons_are_a_silent_statement_separator() {
    let statements = parse_ok("let x = 1; let y = 2;;; let z = 3");
    assert_eq!(statements.len(), 3);
}
