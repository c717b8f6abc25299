//! Type-reference grammar (syntactic types as written in source).
//!
//! Precedence (outer to inner): nullable `?` wraps function types; a leading `<` or `(`
//! is first tried as a function type (type-parameters? parameter list `-->` return); then
//! array suffix `[]`; then `&` intersection; then `|` union; then the singular forms
//! (primitive/literal name, generic type name, parenthesized tuple).

use ion_common::token::{SyntaxKind, Token};
use ion_common::{Diagnostic, DiagnosticKind};

use crate::ast::expr::PrimitiveValue;
use crate::ast::ty::*;

use super::Parser;

pub(crate) fn parse_type_ref(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    parse_nullable_type(p)
}

fn parse_nullable_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();
    let inner = parse_function_type(p)?;
    if !p.eat(SyntaxKind::Question) {
        return Ok(inner);
    }
    let span = p.span_from(&start);
    Ok(TypeRef::NullableTypeRef(NullableTypeRef { id: p.ids.next(), inner: Box::new(inner), span }))
}

fn parse_function_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();

    if p.at(SyntaxKind::LAngle) {
        let type_parameters = parse_type_parameter_list(p)?;
        return parse_function_tail(p, &start, type_parameters);
    }

    if p.at(SyntaxKind::LParen) && is_function_params_ahead(p) {
        return parse_function_tail(p, &start, Vec::new());
    }

    parse_array_type(p)
}

fn parse_function_tail(p: &mut Parser, start: &ion_common::span::FileLocation, _type_parameters: Vec<TypeParameterRef>) -> Result<TypeRef, Diagnostic> {
    p.expect(SyntaxKind::LParen)?;
    let mut parameters = Vec::new();
    while !p.at(SyntaxKind::RParen) {
        parameters.push(parse_type_ref(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::RParen)?;
    p.expect(SyntaxKind::LongArrow)?;
    let return_type = parse_type_ref(p)?;
    let span = p.span_from(start);
    Ok(TypeRef::FunctionTypeRef(FunctionTypeRef {
        id: p.ids.next(),
        parameters,
        return_type: Box::new(return_type),
        span,
    }))
}

/// Bounded lookahead: does the `(` at the cursor close with `-->` immediately after,
/// as a function type's parameter list would? Otherwise it's a parenthesized tuple.
fn is_function_params_ahead(p: &Parser) -> bool {
    let mut depth = 0i32;
    let mut n = 0usize;
    loop {
        match p.peek_kind(n) {
            Some(SyntaxKind::LParen) => depth += 1,
            Some(SyntaxKind::RParen) => {
                depth -= 1;
                if depth == 0 {
                    return p.peek_kind(n + 1) == Some(SyntaxKind::LongArrow);
                }
            }
            None => return false,
            _ => {}
        }
        n += 1;
        if n > 256 {
            return false;
        }
    }
}

fn parse_array_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();
    let mut element = parse_intersection_type(p)?;
    while p.eat(SyntaxKind::LBracket) {
        p.expect(SyntaxKind::RBracket)?;
        let span = p.span_from(&start);
        element = TypeRef::ArrayTypeRef(ArrayTypeRef { id: p.ids.next(), element: Box::new(element), span });
    }
    Ok(element)
}

fn parse_intersection_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();
    let mut members = vec![parse_union_type(p)?];
    while p.eat(SyntaxKind::Ampersand) {
        members.push(parse_union_type(p)?);
    }
    if members.len() == 1 {
        return Ok(members.remove(0));
    }
    let span = p.span_from(&start);
    Ok(TypeRef::IntersectionTypeRef(IntersectionTypeRef { id: p.ids.next(), members, span }))
}

fn parse_union_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();
    let mut members = vec![parse_singular_type(p)?];
    while p.eat(SyntaxKind::Pipe) {
        members.push(parse_singular_type(p)?);
    }
    if members.len() == 1 {
        return Ok(members.remove(0));
    }
    let span = p.span_from(&start);
    Ok(TypeRef::UnionTypeRef(UnionTypeRef { id: p.ids.next(), members, span }))
}

const PRIMITIVE_TYPE_NAMES: &[(&str, PrimitiveTypeKind)] = &[
    ("number", PrimitiveTypeKind::Number),
    ("string", PrimitiveTypeKind::String),
    ("bool", PrimitiveTypeKind::Bool),
    ("void", PrimitiveTypeKind::Void),
];

fn parse_singular_type(p: &mut Parser) -> Result<TypeRef, Diagnostic> {
    let start = p.current_span().start.clone();
    let Some(tok) = p.peek().cloned() else {
        return Err(Diagnostic::new(DiagnosticKind::UnexpectedEof, p.current_span()));
    };

    match tok.kind {
        SyntaxKind::Identifier => {
            p.advance();
            if let Some((_, kind)) = PRIMITIVE_TYPE_NAMES.iter().find(|(name, _)| *name == tok.get_text()) {
                let span = p.span_from(&start);
                return Ok(TypeRef::PrimitiveTypeRef(PrimitiveTypeRef { id: p.ids.next(), kind: *kind, span }));
            }
            let type_arguments = if p.at(SyntaxKind::LAngle) {
                parse_type_argument_list(p)?
            } else {
                Vec::new()
            };
            let span = p.span_from(&start);
            Ok(TypeRef::TypeNameRef(TypeNameRef { id: p.ids.next(), name: tok.get_text().to_string(), type_arguments, span }))
        }
        SyntaxKind::NumberLiteral => {
            p.advance();
            let span = p.span_from(&start);
            Ok(TypeRef::LiteralTypeRef(LiteralTypeRef {
                id: p.ids.next(),
                value: PrimitiveValue::Number(tok.get_text().parse().unwrap_or(0.0)),
                span,
            }))
        }
        SyntaxKind::InterpolatedStringPart => {
            p.advance();
            let span = p.span_from(&start);
            Ok(TypeRef::LiteralTypeRef(LiteralTypeRef {
                id: p.ids.next(),
                value: PrimitiveValue::String(tok.get_text().to_string()),
                span,
            }))
        }
        SyntaxKind::True | SyntaxKind::False => {
            p.advance();
            let span = p.span_from(&start);
            Ok(TypeRef::LiteralTypeRef(LiteralTypeRef { id: p.ids.next(), value: PrimitiveValue::Bool(tok.kind == SyntaxKind::True), span }))
        }
        SyntaxKind::Null => {
            p.advance();
            let span = p.span_from(&start);
            Ok(TypeRef::LiteralTypeRef(LiteralTypeRef { id: p.ids.next(), value: PrimitiveValue::Null, span }))
        }
        SyntaxKind::LParen => parse_tuple_type(p, &start),
        _ => Err(Diagnostic::new(
            DiagnosticKind::ExpectedDifferentSyntax { expected: "type".to_string(), found: tok.get_text().to_string() },
            tok.span,
        )),
    }
}

fn parse_tuple_type(p: &mut Parser, start: &ion_common::span::FileLocation) -> Result<TypeRef, Diagnostic> {
    p.advance();
    let mut elements = Vec::new();
    loop {
        elements.push(parse_type_ref(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    p.expect(SyntaxKind::RParen)?;
    let span = p.span_from(start);
    Ok(TypeRef::TupleTypeRef(TupleTypeRef { id: p.ids.next(), elements, span }))
}

fn parse_type_argument_list(p: &mut Parser) -> Result<Vec<TypeRef>, Diagnostic> {
    p.expect(SyntaxKind::LAngle)?;
    let mut args = Vec::new();
    loop {
        args.push(parse_type_ref(p)?);
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    close_angle(p)?;
    Ok(args)
}

/// `<T, U: Bound = Default, ...>` — the declared-parameter-list counterpart of
/// [`parse_type_argument_list`].
pub(crate) fn parse_type_parameter_list(p: &mut Parser) -> Result<Vec<TypeParameterRef>, Diagnostic> {
    p.expect(SyntaxKind::LAngle)?;
    let mut params = Vec::new();
    loop {
        let start = p.current_span().start.clone();
        let name_tok = p.expect(SyntaxKind::Identifier)?;
        let bound = if p.eat(SyntaxKind::Colon) { Some(Box::new(parse_type_ref(p)?)) } else { None };
        let default = if p.eat(SyntaxKind::Equals) { Some(Box::new(parse_type_ref(p)?)) } else { None };
        let span = p.span_from(&start);
        params.push(TypeParameterRef { id: p.ids.next(), name: name_tok.get_text().to_string(), bound, default, span });
        if !p.eat(SyntaxKind::Comma) {
            break;
        }
    }
    close_angle(p)?;
    Ok(params)
}

fn close_angle(p: &mut Parser) -> Result<(), Diagnostic> {
    match p.current_kind() {
        Some(SyntaxKind::RAngle) => {
            p.advance();
            Ok(())
        }
        Some(SyntaxKind::RArrowRArrow) => {
            split_and_push(p, SyntaxKind::RAngle, 1);
            Ok(())
        }
        Some(SyntaxKind::RArrowRArrowRArrow) => {
            split_and_push(p, SyntaxKind::RAngle, 2);
            Ok(())
        }
        _ => Err(p.expect(SyntaxKind::RAngle).unwrap_err()),
    }
}

fn split_and_push(p: &mut Parser, single: SyntaxKind, remaining: usize) {
    let tok = p.advance().expect("caller checked current_kind");
    for _ in 0..remaining {
        p.push_synthetic(Token::synthesized(single, tok.span.clone(), single.to_str()));
    }
}
