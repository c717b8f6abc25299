//! Type solver (§4.6): computes a `Type` for every node form the rules below cover,
//! writing it onto that node's bound symbol.
//!
//! Runs after the binder. Forms outside this list are left untyped by this pass; the
//! type-totality guarantee is scoped to the forms the rules actually enumerate.

use ion_common::{Diagnostic, DiagnosticKind};

use ion_parser::ast::expr::{BinaryOp, BinaryOperator, Expression, PrimitiveValue};
use ion_parser::ast::item::*;
use ion_parser::{NodeId, Statement};

use crate::binder::Bindings;
use crate::builtins;
use crate::ty::Type;

pub struct TypeSolver<'a> {
    bindings: &'a Bindings,
}

impl<'a> TypeSolver<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        TypeSolver { bindings }
    }

    pub fn solve_program(&self, statements: &[Statement]) -> Result<(), Diagnostic> {
        self.solve_each_statement(statements)
    }

    fn solve_each_statement(&self, statements: &[Statement]) -> Result<(), Diagnostic> {
        for statement in statements {
            self.solve_statement(statement)?;
        }
        Ok(())
    }

    fn solve_statement(&self, statement: &Statement) -> Result<(), Diagnostic> {
        match statement {
            Statement::ExpressionStatement(s) => {
                self.solve_expression(&s.expression)?;
                if let Some(ty) = self.expression_type(&s.expression) {
                    self.set_type(s.id, ty);
                }
                Ok(())
            }
            Statement::VariableDeclaration(s) => self.solve_variable_declaration(s),
            Statement::Block(s) => self.solve_each_statement(&s.statements),
            Statement::If(s) => {
                self.solve_expression(&s.condition)?;
                self.solve_statement(&s.then_branch)?;
                match &s.else_branch {
                    Some(else_branch) => self.solve_statement(else_branch),
                    None => Ok(()),
                }
            }
            Statement::While(s) => {
                self.solve_expression(&s.condition)?;
                self.solve_statement(&s.body)
            }
            Statement::Repeat(s) => {
                self.solve_statement(&s.body)?;
                self.solve_expression(&s.condition)
            }
            Statement::For(s) => {
                self.solve_expression(&s.iterable)?;
                self.solve_statement(&s.body)
            }
            Statement::After(s) => {
                self.solve_expression(&s.time_expression)?;
                self.solve_statement(&s.body)
            }
            Statement::Every(s) => {
                self.solve_expression(&s.time_expression)?;
                if let Some(condition) = &s.condition {
                    self.solve_expression(condition)?;
                }
                self.solve_statement(&s.body)
            }
            Statement::Match(s) => self.solve_match(s),
            Statement::FunctionDeclaration(s) => self.solve_function(s),
            Statement::InstanceConstructor(s) => self.solve_instance(s),
            Statement::EnumDeclaration(s) => {
                for member in &s.members {
                    if let Some(value) = &member.value {
                        self.solve_expression(value)?;
                    }
                }
                Ok(())
            }
            Statement::Export(s) => self.solve_statement(&s.declaration),
            Statement::Return(s) => match &s.expression {
                Some(expression) => self.solve_expression(expression),
                None => Ok(()),
            },
            Statement::TypeDeclaration(_)
            | Statement::InterfaceDeclaration(_)
            | Statement::EventDeclaration(_)
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Import(_) => Ok(()),
        }
    }

    fn solve_function(&self, decl: &FunctionDeclaration) -> Result<(), Diagnostic> {
        for parameter in &decl.parameters {
            if let Some(default) = &parameter.default_value {
                self.solve_expression(default)?;
            }
        }
        self.solve_statement(&decl.body)
    }

    fn solve_match(&self, stmt: &Match) -> Result<(), Diagnostic> {
        self.solve_expression(&stmt.subject)?;
        for case in &stmt.cases {
            for comparand in &case.comparands {
                self.solve_expression(comparand)?;
            }
            self.solve_statement(&case.body)?;
        }
        if let Some(else_case) = &stmt.else_case {
            self.solve_statement(&else_case.body)?;
        }
        Ok(())
    }

    fn solve_instance(&self, decl: &InstanceConstructor) -> Result<(), Diagnostic> {
        if let Some(clone_target) = &decl.clone_target {
            self.solve_expression(clone_target)?;
        }
        for declarator in &decl.declarators {
            match declarator {
                InstanceDeclarator::Property(p) => self.solve_expression(&p.value)?,
                InstanceDeclarator::Attribute(a) => self.solve_expression(&a.value)?,
                InstanceDeclarator::Name(_) | InstanceDeclarator::Tag(_) => {}
            }
        }
        if let Some(parent) = &decl.parent {
            self.solve_expression(parent)?;
        }
        Ok(())
    }

    /// §4.6's `VariableDeclaration` rule: an explicit `colon_type` wins outright;
    /// otherwise fall back to the initializer's type, widening it unless the
    /// declaration is `const` and the initializer is literal-like.
    fn solve_variable_declaration(&self, decl: &VariableDeclaration) -> Result<(), Diagnostic> {
        if let Some(initializer) = &decl.initializer {
            self.solve_expression(initializer)?;
        }

        let ty = if let Some(type_ref) = &decl.colon_type {
            Type::from_type_ref(type_ref)
        } else {
            match &decl.initializer {
                Some(Expression::PrimitiveLiteral(p)) if matches!(p.value, PrimitiveValue::Null) => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::NoVariableTypeOrInitializer { name: decl.name.clone() },
                        decl.span.clone(),
                    ));
                }
                Some(initializer) => {
                    let initializer_ty = self
                        .expression_type(initializer)
                        .ok_or_else(|| internal_decl_error(decl, "initializer"))?;
                    if decl.is_const { initializer_ty } else { initializer_ty.widen() }
                }
                None => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::NoVariableTypeOrInitializer { name: decl.name.clone() },
                        decl.span.clone(),
                    ));
                }
            }
        };
        self.set_type(decl.id, ty);
        Ok(())
    }

    fn solve_expression(&self, expression: &Expression) -> Result<(), Diagnostic> {
        match expression {
            Expression::PrimitiveLiteral(_) | Expression::Identifier(_) => {}
            Expression::ArrayLiteral(e) => self.solve_each_expression(&e.elements)?,
            Expression::TupleLiteral(e) => self.solve_each_expression(&e.elements)?,
            Expression::VectorLiteral(e) => self.solve_each_expression(&e.components)?,
            Expression::RangeLiteral(e) => {
                self.solve_expression(&e.start)?;
                self.solve_expression(&e.end)?;
            }
            Expression::RgbLiteral(e) => {
                self.solve_expression(&e.r)?;
                self.solve_expression(&e.g)?;
                self.solve_expression(&e.b)?;
            }
            Expression::HsvLiteral(e) => {
                self.solve_expression(&e.h)?;
                self.solve_expression(&e.s)?;
                self.solve_expression(&e.v)?;
            }
            Expression::InterpolatedString(e) => self.solve_each_expression(&e.interpolations)?,
            Expression::Parenthesized(e) => self.solve_expression(&e.inner)?,
            Expression::BinaryOp(e) => {
                self.solve_expression(&e.left)?;
                self.solve_expression(&e.right)?;
            }
            Expression::UnaryOp(e) => self.solve_expression(&e.operand)?,
            Expression::PostfixUnaryOp(e) => self.solve_expression(&e.operand)?,
            Expression::AssignmentOp(e) => {
                self.solve_expression(&e.target)?;
                self.solve_expression(&e.value)?;
            }
            Expression::TernaryOp(e) => {
                self.solve_expression(&e.condition)?;
                self.solve_expression(&e.then_branch)?;
                self.solve_expression(&e.else_branch)?;
            }
            Expression::Invocation(e) => {
                self.solve_expression(&e.callee)?;
                self.solve_each_expression(&e.arguments)?;
            }
            Expression::TypeOf(e) => self.solve_expression(&e.operand)?,
            Expression::NameOf(e) => self.solve_expression(&e.target)?,
            Expression::Await(e) => self.solve_expression(&e.operand)?,
            Expression::MemberAccess(e) => self.solve_expression(&e.target)?,
            Expression::OptionalMemberAccess(e) => self.solve_expression(&e.target)?,
            Expression::ElementAccess(e) => {
                self.solve_expression(&e.target)?;
                self.solve_expression(&e.index)?;
            }
        }

        if let Expression::Identifier(e) = expression {
            let symbol = self.bindings.symbol(e.id).ok_or_else(|| {
                Diagnostic::new(
                    DiagnosticKind::Internal(format!("identifier '{}' reached the solver unbound", e.name)),
                    e.span.clone(),
                )
            })?;
            // An identifier's type lives on its declaring symbol, which this same pass
            // already typed when it visited the declaration — except for intrinsics,
            // which declare nowhere, so backfill those lazily on first use.
            if symbol.ty().is_none() {
                if let Some(name) = &symbol.name {
                    if let Some(ty) = builtins::intrinsic_type(name) {
                        symbol.set_ty(ty);
                    }
                }
            }
            return Ok(());
        }

        if let Some(ty) = self.compute_type(expression)? {
            self.set_type(expression.id(), ty);
        }
        Ok(())
    }

    fn solve_each_expression(&self, expressions: &[Expression]) -> Result<(), Diagnostic> {
        for expression in expressions {
            self.solve_expression(expression)?;
        }
        Ok(())
    }

    /// The non-`Identifier` forms §4.6 assigns a direct rule to.
    fn compute_type(&self, expression: &Expression) -> Result<Option<Type>, Diagnostic> {
        Ok(match expression {
            Expression::PrimitiveLiteral(p) => Some(match &p.value {
                PrimitiveValue::Null => Type::void(),
                other => Type::Literal(other.clone()),
            }),
            Expression::ArrayLiteral(e) => {
                let mut element_types: Vec<Type> = Vec::new();
                for element in &e.elements {
                    let ty = self
                        .expression_type(element)
                        .ok_or_else(|| internal_expr_error(&e.span, "array element"))?
                        .widen();
                    if !element_types.iter().any(|existing| existing.is_same(&ty)) {
                        element_types.push(ty);
                    }
                }
                let element = match element_types.len() {
                    0 => Type::void(),
                    1 => element_types.remove(0),
                    _ => Type::Union(element_types),
                };
                Some(Type::Array(Box::new(element)))
            }
            Expression::TupleLiteral(e) => {
                let mut elements = Vec::new();
                for element in &e.elements {
                    elements.push(
                        self.expression_type(element)
                            .ok_or_else(|| internal_expr_error(&e.span, "tuple element"))?,
                    );
                }
                Some(Type::Tuple(elements))
            }
            Expression::BinaryOp(e) => Some(self.binary_op_type(e)?),
            _ => None,
        })
    }

    /// Arithmetic/comparison operators aren't named in the handled-forms list, but a
    /// `let x = 1 + 2` declaration still needs its initializer typed to resolve its own
    /// type, so binary operators get a minimal result-type rule here too.
    fn binary_op_type(&self, e: &BinaryOp) -> Result<Type, Diagnostic> {
        let left = self
            .expression_type(&e.left)
            .ok_or_else(|| internal_expr_error(&e.span, "binary operand"))?
            .widen();
        let right = self
            .expression_type(&e.right)
            .ok_or_else(|| internal_expr_error(&e.span, "binary operand"))?
            .widen();

        Ok(match e.operator {
            BinaryOperator::Add if left.is_same(&Type::string()) || right.is_same(&Type::string()) => Type::string(),
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::IntDiv
            | BinaryOperator::Mod
            | BinaryOperator::Exp
            | BinaryOperator::BitAnd
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::Shl
            | BinaryOperator::Shr
            | BinaryOperator::UShr => Type::number(),
            BinaryOperator::And
            | BinaryOperator::Or
            | BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => Type::bool_(),
            BinaryOperator::NullCoalesce => left,
        })
    }

    fn expression_type(&self, expression: &Expression) -> Option<Type> {
        self.bindings.symbol(expression.id()).and_then(|symbol| symbol.ty())
    }

    fn set_type(&self, id: NodeId, ty: Type) {
        if let Some(symbol) = self.bindings.symbol(id) {
            symbol.set_ty(ty);
        }
    }
}

fn internal_decl_error(decl: &VariableDeclaration, what: &str) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::Internal(format!("{what} of '{}' was not typed before use", decl.name)),
        decl.span.clone(),
    )
}

fn internal_expr_error(span: &ion_common::span::FileSpan, what: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Internal(format!("{what} was not typed before use")), span.clone())
}
