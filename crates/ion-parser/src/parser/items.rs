//! Statement and declaration grammar (§4.2.2).

use ion_common::token::SyntaxKind;
use ion_common::{Diagnostic, DiagnosticKind};

use crate::ast::item::*;
use crate::ast::ty::TypeRef;

use super::expressions::{decode_escapes, parse_condition, parse_expression};
use super::types::{parse_type_parameter_list, parse_type_ref};
use super::Parser;

pub(crate) fn parse_statement(p: &mut Parser) -> Result<Statement, Diagnostic> {
    match p.current_kind() {
        Some(SyntaxKind::LBrace) => parse_block(p),
        Some(SyntaxKind::If) => parse_if(p),
        Some(SyntaxKind::While) => parse_while(p),
        Some(SyntaxKind::Repeat) => parse_repeat(p),
        Some(SyntaxKind::For) => parse_for(p),
        Some(SyntaxKind::After) => parse_after(p),
        Some(SyntaxKind::Every) => parse_every(p),
        Some(SyntaxKind::Match) => parse_match(p),
        Some(SyntaxKind::Import) => parse_import(p),
        Some(SyntaxKind::Return) => parse_return(p),
        Some(SyntaxKind::Break) => parse_break(p),
        Some(SyntaxKind::Continue) => parse_continue(p),
        _ => parse_declaration(p),
    }
    .inspect(|_| p.eat_semicolons())
}

pub(crate) fn parse_block(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.expect(SyntaxKind::LBrace)?;
    let mut statements = Vec::new();
    while !p.at(SyntaxKind::RBrace) {
        statements.push(parse_statement(p)?);
    }
    p.expect(SyntaxKind::RBrace)?;
    warn_unreachable_code(&statements, &mut p.warnings);
    let span = p.span_from(&start);
    Ok(Statement::Block(Block { id: p.ids.next(), statements, span }))
}

/// Flags any statement following a `Return` in the same list (§4.2.5).
pub(crate) fn warn_unreachable_code(statements: &[Statement], warnings: &mut Vec<Diagnostic>) {
    let Some(return_index) = statements.iter().position(Statement::is_return) else { return };
    if let Some(unreachable) = statements.get(return_index + 1) {
        warnings.push(Diagnostic::new(DiagnosticKind::UnreachableCode, unreachable.span().clone()));
    }
}

fn parse_if(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let condition = parse_condition(p)?;
    let then_branch = Box::new(parse_statement(p)?);
    let else_branch = if p.eat(SyntaxKind::Else) { Some(Box::new(parse_statement(p)?)) } else { None };
    let span = p.span_from(&start);
    Ok(Statement::If(If { id: p.ids.next(), condition, then_branch, else_branch, span }))
}

fn parse_while(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let condition = parse_condition(p)?;
    let body = Box::new(parse_statement(p)?);
    let span = p.span_from(&start);
    Ok(Statement::While(While { id: p.ids.next(), condition, body, span }))
}

/// `repeat <body> while <condition>` — body runs at least once.
fn parse_repeat(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let body = Box::new(parse_statement(p)?);
    p.expect(SyntaxKind::While)?;
    let condition = parse_condition(p)?;
    let span = p.span_from(&start);
    Ok(Statement::Repeat(Repeat { id: p.ids.next(), body, condition, span }))
}

fn parse_name_list(p: &mut Parser) -> Result<Vec<String>, Diagnostic> {
    let mut names = Vec::new();
    loop {
        if p.eat(SyntaxKind::Star) {
            names.push("*".to_string());
        } else {
            names.push(p.expect(SyntaxKind::Identifier)?.get_text().to_string());
        }
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    Ok(names)
}

fn parse_for(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let names = parse_name_list(p)?;
    p.expect(SyntaxKind::Colon)?;
    let iterable = parse_expression(p)?;
    let body = Box::new(parse_statement(p)?);
    let span = p.span_from(&start);
    Ok(Statement::For(For { id: p.ids.next(), names, iterable, body, span }))
}

fn parse_after(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let time_expression = parse_expression(p)?;
    let body = Box::new(parse_statement(p)?);
    let span = p.span_from(&start);
    Ok(Statement::After(After { id: p.ids.next(), time_expression, body, span }))
}

fn parse_every(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let time_expression = parse_expression(p)?;
    let condition = if p.eat(SyntaxKind::While) { Some(parse_condition(p)?) } else { None };
    let body = Box::new(parse_statement(p)?);
    let span = p.span_from(&start);
    Ok(Statement::Every(Every { id: p.ids.next(), time_expression, condition, body, span }))
}

/// `--> <block|expression-statement>`, the body shared by match cases.
fn parse_case_body(p: &mut Parser) -> Result<Box<Statement>, Diagnostic> {
    p.expect(SyntaxKind::LongArrow)?;
    if p.at(SyntaxKind::LBrace) {
        Ok(Box::new(parse_block(p)?))
    } else {
        let start = p.current_span().start.clone();
        let expression = parse_expression(p)?;
        let span = p.span_from(&start);
        Ok(Box::new(Statement::ExpressionStatement(ExpressionStatement { id: p.ids.next(), expression, span })))
    }
}

enum Case {
    Match(MatchCase),
    Else(MatchElseCase),
}

fn parse_match_case(p: &mut Parser) -> Result<Case, Diagnostic> {
    let start = p.current_span().start.clone();
    if p.eat(SyntaxKind::Else) {
        let name = if p.at(SyntaxKind::Identifier) { Some(p.advance().expect("at() checked").get_text().to_string()) } else { None };
        let body = parse_case_body(p)?;
        let span = p.span_from(&start);
        return Ok(Case::Else(MatchElseCase { id: p.ids.next(), name, body, span }));
    }

    let mut comparands = vec![parse_expression(p)?];
    while p.eat(SyntaxKind::Comma) {
        comparands.push(parse_expression(p)?);
    }
    let body = parse_case_body(p)?;
    let span = p.span_from(&start);
    Ok(Case::Match(MatchCase { id: p.ids.next(), comparands, body, span }))
}

fn parse_match(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let subject = parse_expression(p)?;
    p.expect(SyntaxKind::LBrace)?;

    let mut cases = Vec::new();
    let mut else_case = None;
    if !p.at(SyntaxKind::RBrace) {
        loop {
            match parse_match_case(p)? {
                Case::Match(case) => cases.push(case),
                Case::Else(case) => else_case = Some(case),
            }
            if !p.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }
    p.expect(SyntaxKind::RBrace)?;
    let span = p.span_from(&start);
    Ok(Statement::Match(Match { id: p.ids.next(), subject, cases, else_case, span }))
}

fn parse_import(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();

    let names = parse_name_list(p)?;
    let is_wildcard = names.len() == 1 && names[0] == "*";
    p.expect(SyntaxKind::From)?;
    let module_name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let span = p.span_from(&start);
    Ok(Statement::Import(Import { id: p.ids.next(), names, is_wildcard, module_name, span }))
}

/// Expression omitted when the next token sits on a new source line (no explicit
/// newline token exists, so this compares line numbers directly) or is a `;`.
fn parse_return(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    let keyword_line = start.line;
    p.advance();

    let omit = p.is_eof()
        || p.at(SyntaxKind::Semicolon)
        || p.current_span().start.line != keyword_line;

    let expression = if omit { None } else { Some(parse_expression(p)?) };
    let span = p.span_from(&start);
    Ok(Statement::Return(Return { id: p.ids.next(), expression, span }))
}

fn parse_break(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let span = p.span_from(&start);
    Ok(Statement::Break(Break { id: p.ids.next(), span }))
}

fn parse_continue(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    p.advance();
    let span = p.span_from(&start);
    Ok(Statement::Continue(Continue { id: p.ids.next(), span }))
}

fn parse_optional_type_parameters(p: &mut Parser) -> Result<Vec<crate::ast::ty::TypeParameterRef>, Diagnostic> {
    if p.at(SyntaxKind::LAngle) { parse_type_parameter_list(p) } else { Ok(Vec::new()) }
}

fn parse_variable_declaration(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let is_const = p.eat(SyntaxKind::Const);
    let name_token = p.expect(SyntaxKind::Identifier)?;
    let name = name_token.get_text().to_string();
    let colon_type = if p.eat(SyntaxKind::Colon) { Some(parse_type_ref(p)?) } else { None };
    let initializer = if p.eat(SyntaxKind::Equals) { Some(parse_expression(p)?) } else { None };
    let span = p.span_from(start);
    Ok(Statement::VariableDeclaration(VariableDeclaration {
        id: p.ids.next(),
        is_const,
        name,
        name_token,
        colon_type,
        initializer,
        span,
    }))
}

fn parse_type_declaration(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let type_parameters = parse_optional_type_parameters(p)?;
    p.expect(SyntaxKind::Equals)?;
    let value = parse_type_ref(p)?;
    let span = p.span_from(start);
    Ok(Statement::TypeDeclaration(TypeDeclaration { id: p.ids.next(), name, type_parameters, value, span }))
}

fn parse_optional_parenthesized_type_list(p: &mut Parser) -> Result<Vec<TypeRef>, Diagnostic> {
    if !p.eat(SyntaxKind::LParen) {
        return Ok(Vec::new());
    }
    let mut types = Vec::new();
    while !p.at(SyntaxKind::RParen) {
        types.push(parse_type_ref(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::RParen)?;
    Ok(types)
}

fn parse_event_declaration(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let type_parameters = parse_optional_type_parameters(p)?;
    let parameter_types = parse_optional_parenthesized_type_list(p)?;
    let span = p.span_from(start);
    Ok(Statement::EventDeclaration(EventDeclaration { id: p.ids.next(), name, type_parameters, parameter_types, span }))
}

fn parse_enum_member(p: &mut Parser) -> Result<EnumMember, Diagnostic> {
    let start = p.current_span().start.clone();
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let value = if p.eat(SyntaxKind::Equals) { Some(parse_expression(p)?) } else { None };
    let span = p.span_from(&start);
    Ok(EnumMember { id: p.ids.next(), name, value, span })
}

fn parse_enum_declaration(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    p.expect(SyntaxKind::LBrace)?;
    let mut members = Vec::new();
    while !p.at(SyntaxKind::RBrace) {
        members.push(parse_enum_member(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::RBrace)?;
    let span = p.span_from(start);
    Ok(Statement::EnumDeclaration(EnumDeclaration { id: p.ids.next(), name, members, span }))
}

fn parse_interface_member(p: &mut Parser) -> Result<InterfaceMember, Diagnostic> {
    let start = p.current_span().start.clone();
    if p.eat(SyntaxKind::Fn) {
        let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
        let type_parameters = parse_optional_type_parameters(p)?;
        p.expect(SyntaxKind::LParen)?;
        let mut parameter_types = Vec::new();
        while !p.at(SyntaxKind::RParen) {
            parameter_types.push(parse_type_ref(p)?);
            if !p.eat(SyntaxKind::Comma) {
                break;
            }
        }
        p.expect(SyntaxKind::RParen)?;
        p.expect(SyntaxKind::Colon)?;
        let return_type = parse_type_ref(p)?;
        p.eat_semicolons();
        let span = p.span_from(&start);
        return Ok(InterfaceMember::Method(InterfaceMethod {
            id: p.ids.next(),
            name,
            type_parameters,
            parameter_types,
            return_type,
            span,
        }));
    }

    let is_const = p.eat(SyntaxKind::Const);
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    p.expect(SyntaxKind::Colon)?;
    let field_type = parse_type_ref(p)?;
    p.eat_semicolons();
    let span = p.span_from(&start);
    Ok(InterfaceMember::Field(InterfaceField { id: p.ids.next(), is_const, name, field_type, span }))
}

fn parse_interface_declaration(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let type_parameters = parse_optional_type_parameters(p)?;
    p.expect(SyntaxKind::LBrace)?;
    let mut members = Vec::new();
    while !p.at(SyntaxKind::RBrace) {
        members.push(parse_interface_member(p)?);
    }
    p.expect(SyntaxKind::RBrace)?;
    let span = p.span_from(start);
    Ok(Statement::InterfaceDeclaration(InterfaceDeclaration { id: p.ids.next(), name, type_parameters, members, span }))
}

fn parse_parameter(p: &mut Parser) -> Result<Parameter, Diagnostic> {
    let start = p.current_span().start.clone();
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let colon_type = if p.eat(SyntaxKind::Colon) { Some(parse_type_ref(p)?) } else { None };
    let default_value = if p.eat(SyntaxKind::Equals) { Some(parse_expression(p)?) } else { None };
    let span = p.span_from(&start);
    Ok(Parameter { id: p.ids.next(), name, colon_type, default_value, span })
}

fn parse_parameter_list(p: &mut Parser) -> Result<Vec<Parameter>, Diagnostic> {
    p.expect(SyntaxKind::LParen)?;
    let mut params = Vec::new();
    while !p.at(SyntaxKind::RParen) {
        params.push(parse_parameter(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::RParen)?;
    Ok(params)
}

/// `--> expr` (implicit return) or a `{ ... }` block.
fn parse_function_body(p: &mut Parser) -> Result<Box<Statement>, Diagnostic> {
    if p.eat(SyntaxKind::LongArrow) {
        let start = p.current_span().start.clone();
        let expression = parse_expression(p)?;
        let span = p.span_from(&start);
        let ret = Statement::Return(Return { id: p.ids.next(), expression: Some(expression), span: span.clone() });
        return Ok(Box::new(Statement::Block(Block { id: p.ids.next(), statements: vec![ret], span })));
    }
    if p.at(SyntaxKind::LBrace) {
        return Ok(Box::new(parse_block(p)?));
    }
    let found = p.peek().map(|t| t.get_text().to_string()).unwrap_or_else(|| "end of input".to_string());
    Err(Diagnostic::new(
        DiagnosticKind::ExpectedDifferentSyntax { expected: "function body".to_string(), found },
        p.current_span(),
    ))
}

fn parse_decorator(p: &mut Parser) -> Result<Decorator, Diagnostic> {
    let start = p.current_span().start.clone();
    p.expect(SyntaxKind::At)?;
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let mut arguments = Vec::new();
    if p.eat(SyntaxKind::LParen) {
        while !p.at(SyntaxKind::RParen) {
            arguments.push(parse_expression(p)?);
            if !p.eat(SyntaxKind::Comma) {
                break;
            }
        }
        p.expect(SyntaxKind::RParen)?;
    }
    let span = p.span_from(&start);
    Ok(Decorator { id: p.ids.next(), name, arguments, span })
}

fn parse_function_declaration(p: &mut Parser, start: &ion_common::span::FileLocation, decorators: Vec<Decorator>, is_async: bool) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    let type_parameters = parse_optional_type_parameters(p)?;
    let parameters = if p.at(SyntaxKind::LParen) { parse_parameter_list(p)? } else { Vec::new() };
    let return_type = if p.eat(SyntaxKind::Colon) { Some(parse_type_ref(p)?) } else { None };
    let body = parse_function_body(p)?;
    let span = p.span_from(start);
    Ok(Statement::FunctionDeclaration(FunctionDeclaration {
        id: p.ids.next(),
        decorators,
        is_async,
        name,
        type_parameters,
        parameters,
        return_type,
        body,
        span,
    }))
}

fn parse_instance_declarator(p: &mut Parser) -> Result<InstanceDeclarator, Diagnostic> {
    let start = p.current_span().start.clone();

    if p.at(SyntaxKind::InterpolatedStringPart) {
        let tok = p.advance().expect("at() checked");
        let span = p.span_from(&start);
        return Ok(InstanceDeclarator::Name(InstanceNameDeclarator { id: p.ids.next(), name: decode_escapes(tok.get_text()), span }));
    }

    if p.eat(SyntaxKind::Hashtag) {
        let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
        let span = p.span_from(&start);
        return Ok(InstanceDeclarator::Tag(InstanceTagDeclarator { id: p.ids.next(), name, span }));
    }

    let is_attribute = p.eat(SyntaxKind::At);
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    p.expect(SyntaxKind::Colon)?;
    let value = parse_expression(p)?;
    let span = p.span_from(&start);
    Ok(if is_attribute {
        InstanceDeclarator::Attribute(InstanceAttributeDeclarator { id: p.ids.next(), name, value, span })
    } else {
        InstanceDeclarator::Property(InstancePropertyDeclarator { id: p.ids.next(), name, value, span })
    })
}

fn parse_instance_constructor(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<Statement, Diagnostic> {
    let name = p.expect(SyntaxKind::Identifier)?.get_text().to_string();
    p.expect(SyntaxKind::Colon)?;
    let colon_type = parse_type_ref(p)?;

    let clone_target = if p.eat(SyntaxKind::Clone) { Some(parse_expression(p)?) } else { None };

    let mut declarators = Vec::new();
    if p.eat(SyntaxKind::LBrace) {
        while !p.at(SyntaxKind::RBrace) {
            declarators.push(parse_instance_declarator(p)?);
        }
        p.expect(SyntaxKind::RBrace)?;
    }

    let parent = if p.eat(SyntaxKind::LongArrow) { Some(parse_expression(p)?) } else { None };

    let span = p.span_from(start);
    Ok(Statement::InstanceConstructor(InstanceConstructor {
        id: p.ids.next(),
        name,
        colon_type,
        clone_target,
        declarators,
        parent,
        span,
    }))
}

fn parse_expression_statement(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();
    let expression = parse_expression(p)?;
    let span = p.span_from(&start);
    Ok(Statement::ExpressionStatement(ExpressionStatement { id: p.ids.next(), expression, span }))
}

/// Decorators, `export`, `async`, and every declaration form share one entry point so
/// the `export`/decorator-target checks can see the parsed declaration (§4.2.2).
fn parse_declaration(p: &mut Parser) -> Result<Statement, Diagnostic> {
    let start = p.current_span().start.clone();

    let mut decorators = Vec::new();
    while p.at(SyntaxKind::At) {
        decorators.push(parse_decorator(p)?);
    }

    let is_export = p.eat(SyntaxKind::Export);
    let is_async = p.at(SyntaxKind::Async) && p.peek_kind(1) == Some(SyntaxKind::Fn);
    if is_async {
        p.advance();
    }
    let is_function = is_async || p.at(SyntaxKind::Fn);

    let declared = if p.eat(SyntaxKind::Let) {
        Some(parse_variable_declaration(p, &start)?)
    } else if p.eat(SyntaxKind::Fn) {
        Some(parse_function_declaration(p, &start, std::mem::take(&mut decorators), is_async)?)
    } else if p.eat(SyntaxKind::Event) {
        Some(parse_event_declaration(p, &start)?)
    } else if p.eat(SyntaxKind::Type) {
        Some(parse_type_declaration(p, &start)?)
    } else if p.eat(SyntaxKind::Enum) {
        Some(parse_enum_declaration(p, &start)?)
    } else if p.eat(SyntaxKind::Interface) {
        Some(parse_interface_declaration(p, &start)?)
    } else if p.eat(SyntaxKind::Instance) {
        Some(parse_instance_constructor(p, &start)?)
    } else {
        None
    };

    if !is_function && !decorators.is_empty() {
        let span = declared.as_ref().map(|s| s.span().clone()).unwrap_or_else(|| p.current_span());
        return Err(Diagnostic::new(DiagnosticKind::InvalidDecoratorTarget, span));
    }

    if is_export {
        let Some(declaration) = declared else {
            let inner = parse_expression_statement(p)?;
            return Err(Diagnostic::new(DiagnosticKind::InvalidExport, inner.span().clone()));
        };
        let span = p.span_from(&start);
        return Ok(Statement::Export(Export { id: p.ids.next(), declaration: Box::new(declaration), span }));
    }

    match declared {
        Some(statement) => Ok(statement),
        None => parse_expression_statement(p),
    }
}
