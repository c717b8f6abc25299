//! Lexical resolution and statement-context validity (§4.4).
//!
//! Scope state per frame is a map `name -> defined` (`false` = declared but still
//! initializing, `true` = fully defined), so `let x = x` is caught: the initializer is
//! visited while `x` is declared-but-undefined. A parallel context stack enforces that
//! `break`/`continue`/`return`/`await` only appear where they are legal.

use ion_common::span::FileSpan;
use ion_common::{Diagnostic, DiagnosticKind};
use rustc_hash::FxHashMap;

use ion_parser::ast::expr::Expression;
use ion_parser::ast::item::*;
use ion_parser::Statement;

use crate::builtins::INTRINSIC_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Global,
    Block,
    Loop,
    Function,
    AsyncFunction,
}

pub struct Resolver {
    scopes: Vec<FxHashMap<String, bool>>,
    contexts: Vec<Context>,
    warnings: Vec<Diagnostic>,
}

impl Resolver {
    pub fn new() -> Self {
        let mut global = FxHashMap::default();
        for name in INTRINSIC_NAMES {
            global.insert((*name).to_string(), true);
        }
        Resolver { scopes: vec![global], contexts: vec![Context::Global], warnings: Vec::new() }
    }

    /// Runs the resolver over a whole program, returning the collected warnings on
    /// success or the first fatal diagnostic.
    pub fn resolve_program(mut self, statements: &[Statement]) -> Result<Vec<Diagnostic>, Diagnostic> {
        for statement in statements {
            self.resolve_statement(statement)?;
        }
        Ok(self.warnings)
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, span: &FileSpan) -> Result<(), Diagnostic> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(name) {
            return Err(Diagnostic::new(DiagnosticKind::DuplicateVariable { name: name.to_string() }, span.clone()));
        }
        scope.insert(name.to_string(), false);
        Ok(())
    }

    fn define(&mut self, name: &str) {
        if let Some(defined) = self.scopes.last_mut().expect("scope stack is never empty").get_mut(name) {
            *defined = true;
        }
    }

    fn declare_define(&mut self, name: &str, span: &FileSpan) -> Result<(), Diagnostic> {
        self.declare(name, span)?;
        self.define(name);
        Ok(())
    }

    fn resolve_name(&self, name: &str, span: &FileSpan) -> Result<(), Diagnostic> {
        for scope in self.scopes.iter().rev() {
            if let Some(&defined) = scope.get(name) {
                return if defined {
                    Ok(())
                } else {
                    Err(Diagnostic::new(DiagnosticKind::VariableReadInOwnInitializer { name: name.to_string() }, span.clone()))
                };
            }
        }
        Err(Diagnostic::new(DiagnosticKind::VariableNotFound { name: name.to_string() }, span.clone()))
    }

    /// `break`/`continue` are legal under the nearest `Loop` frame, but a nested
    /// function boundary in between blocks it (you cannot break an outer loop from
    /// inside a function literal defined within it).
    fn in_loop(&self) -> bool {
        for context in self.contexts.iter().rev() {
            match context {
                Context::Loop => return true,
                Context::Function | Context::AsyncFunction => return false,
                _ => {}
            }
        }
        false
    }

    fn in_function(&self) -> bool {
        self.contexts.iter().any(|c| matches!(c, Context::Function | Context::AsyncFunction))
    }

    /// `await` is legal under the nearest `AsyncFunction` frame, blocked by an
    /// intervening plain `Function` boundary.
    fn in_async_function(&self) -> bool {
        for context in self.contexts.iter().rev() {
            match context {
                Context::AsyncFunction => return true,
                Context::Function => return false,
                _ => {}
            }
        }
        false
    }

    fn with_context<T>(&mut self, context: Context, f: impl FnOnce(&mut Self) -> Result<T, Diagnostic>) -> Result<T, Diagnostic> {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    fn check_duplicate_member(seen: &mut FxHashMap<String, ()>, name: &str, span: &FileSpan) -> Result<(), Diagnostic> {
        if seen.insert(name.to_string(), ()).is_some() {
            return Err(Diagnostic::new(DiagnosticKind::DuplicateMember { name: name.to_string() }, span.clone()));
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Statement) -> Result<(), Diagnostic> {
        match statement {
            Statement::ExpressionStatement(s) => self.resolve_expression(&s.expression),
            Statement::Block(s) => {
                self.push_scope();
                let result = self.with_context(Context::Block, |this| {
                    for inner in &s.statements {
                        this.resolve_statement(inner)?;
                    }
                    Ok(())
                });
                self.pop_scope();
                result
            }
            Statement::VariableDeclaration(s) => self.resolve_variable_declaration(s),
            Statement::TypeDeclaration(s) => {
                self.declare(&s.name, &s.span)?;
                self.define(&s.name);
                Ok(())
            }
            Statement::EventDeclaration(s) => self.declare_define(&s.name, &s.span),
            Statement::InterfaceDeclaration(s) => self.resolve_interface(s),
            Statement::EnumDeclaration(s) => self.resolve_enum(s),
            Statement::FunctionDeclaration(s) => self.resolve_function(s),
            Statement::InstanceConstructor(s) => self.resolve_instance(s),
            Statement::Break(s) => {
                if !self.in_loop() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidBreak, s.span.clone()));
                }
                Ok(())
            }
            Statement::Continue(s) => {
                if !self.in_loop() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidContinue, s.span.clone()));
                }
                Ok(())
            }
            Statement::Return(s) => {
                if !self.in_function() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidReturn, s.span.clone()));
                }
                if let Some(expression) = &s.expression {
                    self.resolve_expression(expression)?;
                }
                Ok(())
            }
            Statement::If(s) => {
                self.resolve_condition(&s.condition)?;
                self.resolve_statement(&s.then_branch)?;
                if let Some(else_branch) = &s.else_branch {
                    self.resolve_statement(else_branch)?;
                }
                Ok(())
            }
            Statement::While(s) => {
                self.resolve_condition(&s.condition)?;
                self.with_context(Context::Loop, |this| this.resolve_statement(&s.body))
            }
            Statement::Repeat(s) => {
                self.with_context(Context::Loop, |this| this.resolve_statement(&s.body))?;
                self.resolve_condition(&s.condition)
            }
            Statement::For(s) => {
                self.resolve_expression(&s.iterable)?;
                self.push_scope();
                let result = self.with_context(Context::Loop, |this| {
                    for name in &s.names {
                        if name != "*" {
                            this.declare_define(name, &s.span)?;
                        }
                    }
                    this.resolve_statement(&s.body)
                });
                self.pop_scope();
                result
            }
            Statement::After(s) => {
                self.resolve_expression(&s.time_expression)?;
                self.resolve_statement(&s.body)
            }
            Statement::Every(s) => {
                self.resolve_expression(&s.time_expression)?;
                if let Some(condition) = &s.condition {
                    self.resolve_condition(condition)?;
                }
                self.resolve_statement(&s.body)
            }
            Statement::Match(s) => self.resolve_match(s),
            Statement::Import(s) => {
                if !s.is_wildcard {
                    for name in &s.names {
                        self.declare_define(name, &s.span)?;
                    }
                }
                Ok(())
            }
            Statement::Export(s) => {
                if !s.declaration.is_declaration() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidExport, s.span.clone()));
                }
                self.resolve_statement(&s.declaration)
            }
        }
    }

    /// `let`/`const`: the name is declared (but not yet defined) before visiting the
    /// initializer, so `let x = x` resolves its inner `x` while still undefined.
    fn resolve_variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<(), Diagnostic> {
        self.declare(&decl.name, &decl.span)?;
        if let Some(initializer) = &decl.initializer {
            self.resolve_expression(initializer)?;
        }
        self.define(&decl.name);
        Ok(())
    }

    fn resolve_function(&mut self, decl: &FunctionDeclaration) -> Result<(), Diagnostic> {
        self.declare_define(&decl.name, &decl.span)?;
        self.push_scope();
        let context = if decl.is_async { Context::AsyncFunction } else { Context::Function };
        let result = self.with_context(context, |this| {
            for parameter in &decl.parameters {
                this.declare_define(&parameter.name, &parameter.span)?;
                if let Some(default) = &parameter.default_value {
                    this.resolve_expression(default)?;
                }
            }
            this.resolve_statement(&decl.body)
        });
        self.pop_scope();
        result
    }

    fn resolve_interface(&mut self, decl: &InterfaceDeclaration) -> Result<(), Diagnostic> {
        self.declare_define(&decl.name, &decl.span)?;
        let mut seen = FxHashMap::default();
        for member in &decl.members {
            let (name, span) = match member {
                InterfaceMember::Field(f) => (&f.name, &f.span),
                InterfaceMember::Method(m) => (&m.name, &m.span),
            };
            Self::check_duplicate_member(&mut seen, name, span)?;
        }
        Ok(())
    }

    fn resolve_enum(&mut self, decl: &EnumDeclaration) -> Result<(), Diagnostic> {
        self.declare_define(&decl.name, &decl.span)?;
        for member in &decl.members {
            if let Some(value) = &member.value {
                self.resolve_expression(value)?;
            }
        }
        Ok(())
    }

    fn resolve_instance(&mut self, decl: &InstanceConstructor) -> Result<(), Diagnostic> {
        self.declare_define(&decl.name, &decl.span)?;
        if let Some(clone_target) = &decl.clone_target {
            self.resolve_expression(clone_target)?;
        }

        let mut properties = FxHashMap::default();
        let mut names = FxHashMap::default();
        let mut attributes = FxHashMap::default();
        let mut tags = FxHashMap::default();
        for declarator in &decl.declarators {
            match declarator {
                InstanceDeclarator::Property(p) => {
                    Self::check_duplicate_member(&mut properties, &p.name, &p.span)?;
                    self.resolve_expression(&p.value)?;
                }
                InstanceDeclarator::Name(n) => {
                    Self::check_duplicate_member(&mut names, "Name", &n.span)?;
                }
                InstanceDeclarator::Attribute(a) => {
                    Self::check_duplicate_member(&mut attributes, &a.name, &a.span)?;
                    self.resolve_expression(&a.value)?;
                }
                InstanceDeclarator::Tag(t) => {
                    Self::check_duplicate_member(&mut tags, &t.name, &t.span)?;
                }
            }
        }

        if let Some(parent) = &decl.parent {
            self.resolve_expression(parent)?;
        }
        Ok(())
    }

    fn resolve_match(&mut self, stmt: &Match) -> Result<(), Diagnostic> {
        self.resolve_expression(&stmt.subject)?;
        for case in &stmt.cases {
            for comparand in &case.comparands {
                self.resolve_expression(comparand)?;
            }
            self.resolve_statement(&case.body)?;
        }
        if let Some(else_case) = &stmt.else_case {
            self.push_scope();
            let result = (|| {
                if let Some(name) = &else_case.name {
                    self.declare_define(name, &else_case.span)?;
                }
                self.resolve_statement(&else_case.body)
            })();
            self.pop_scope();
            result?;
        }
        Ok(())
    }

    /// `if`/`while`/`repeat`/`every` conditions: a bare `=` is almost always a typo for
    /// `==`, so it earns a non-fatal `AmbiguousEquals` (§8 S5) instead of blocking.
    fn resolve_condition(&mut self, condition: &Expression) -> Result<(), Diagnostic> {
        if let Expression::AssignmentOp(assignment) = condition {
            if assignment.compound_operator.is_none() {
                self.warnings.push(Diagnostic::new(DiagnosticKind::AmbiguousEquals, condition.span().clone()));
            }
        }
        self.resolve_expression(condition)
    }

    fn resolve_expression(&mut self, expression: &Expression) -> Result<(), Diagnostic> {
        match expression {
            Expression::PrimitiveLiteral(_) => Ok(()),
            Expression::ArrayLiteral(e) => self.resolve_each(&e.elements),
            Expression::TupleLiteral(e) => self.resolve_each(&e.elements),
            Expression::VectorLiteral(e) => self.resolve_each(&e.components),
            Expression::RangeLiteral(e) => {
                self.resolve_expression(&e.start)?;
                self.resolve_expression(&e.end)
            }
            Expression::RgbLiteral(e) => {
                self.resolve_expression(&e.r)?;
                self.resolve_expression(&e.g)?;
                self.resolve_expression(&e.b)
            }
            Expression::HsvLiteral(e) => {
                self.resolve_expression(&e.h)?;
                self.resolve_expression(&e.s)?;
                self.resolve_expression(&e.v)
            }
            Expression::InterpolatedString(e) => self.resolve_each(&e.interpolations),
            Expression::Identifier(e) => self.resolve_name(&e.name, &e.span),
            Expression::Parenthesized(e) => self.resolve_expression(&e.inner),
            Expression::BinaryOp(e) => {
                self.resolve_expression(&e.left)?;
                self.resolve_expression(&e.right)
            }
            Expression::UnaryOp(e) => self.resolve_expression(&e.operand),
            Expression::PostfixUnaryOp(e) => self.resolve_expression(&e.operand),
            Expression::AssignmentOp(e) => {
                if !e.target.is_assignment_target() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidAssignment, e.span.clone()));
                }
                self.resolve_expression(&e.target)?;
                self.resolve_expression(&e.value)
            }
            Expression::TernaryOp(e) => {
                self.resolve_expression(&e.condition)?;
                self.resolve_expression(&e.then_branch)?;
                self.resolve_expression(&e.else_branch)
            }
            Expression::Invocation(e) => {
                self.resolve_expression(&e.callee)?;
                self.resolve_each(&e.arguments)
            }
            Expression::TypeOf(e) => self.resolve_expression(&e.operand),
            Expression::NameOf(e) => {
                if !e.target.is_name_of_target() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidNameOf, e.span.clone()));
                }
                Ok(())
            }
            Expression::Await(e) => {
                if !self.in_async_function() {
                    return Err(Diagnostic::new(DiagnosticKind::InvalidAwait, e.span.clone()));
                }
                self.resolve_expression(&e.operand)
            }
            Expression::MemberAccess(e) => self.resolve_expression(&e.target),
            Expression::OptionalMemberAccess(e) => self.resolve_expression(&e.target),
            Expression::ElementAccess(e) => {
                self.resolve_expression(&e.target)?;
                self.resolve_expression(&e.index)
            }
        }
    }

    fn resolve_each(&mut self, expressions: &[Expression]) -> Result<(), Diagnostic> {
        for expression in expressions {
            self.resolve_expression(expression)?;
        }
        Ok(())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
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
    fn read_in_own_initializer_is_rejected() {
        let statements = parse("let x = x");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::VariableReadInOwnInitializer { .. }));
    }

    #[test]
    fn undeclared_variable_is_rejected() {
        let statements = parse("y + 1");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::VariableNotFound { .. }));
    }

    #[test]
    fn return_outside_function_is_fatal() {
        let statements = parse("return 1");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::InvalidReturn));
    }

    #[test]
    fn break_inside_while_is_legal() {
        let statements = parse("while true { break }");
        assert!(Resolver::new().resolve_program(&statements).is_ok());
    }

    #[test]
    fn break_cannot_cross_a_function_boundary() {
        let statements = parse("while true { fn f() { break } }");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::InvalidBreak));
    }

    #[test]
    fn ambiguous_equals_is_a_warning_not_fatal() {
        let statements = parse("while x = 1 { break }");
        let warnings = Resolver::new().resolve_program(&statements).unwrap();
        assert!(warnings.iter().any(|d| matches!(d.kind, DiagnosticKind::AmbiguousEquals)));
    }

    #[test]
    fn duplicate_variable_in_same_scope_is_rejected() {
        let statements = parse("{ let x = 1 let x = 2 }");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::DuplicateVariable { .. }));
    }

    #[test]
    fn recursive_function_sees_itself() {
        let statements = parse("fn f(): void { return f() }");
        assert!(Resolver::new().resolve_program(&statements).is_ok());
    }

    #[test]
    fn await_requires_async_function() {
        let statements = parse("fn f() { return await g() }");
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::InvalidAwait));
    }

    #[test]
    fn await_inside_async_function_is_legal() {
        let statements = parse("async fn f() { return await g() }");
        // g is unresolved, so this should fail on VariableNotFound, not InvalidAwait.
        let err = Resolver::new().resolve_program(&statements).unwrap_err();
        assert!(matches!(err.kind, DiagnosticKind::VariableNotFound { .. }));
    }

    #[test]
    fn print_intrinsic_is_predeclared() {
        let statements = parse("print(\"hi\")");
        assert!(Resolver::new().resolve_program(&statements).is_ok());
    }
}
