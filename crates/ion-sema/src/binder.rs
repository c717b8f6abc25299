//! Attaches symbols to declarations and identifier/type-name uses (§4.5).
//!
//! Runs after the resolver has already validated scope legality, so every lookup here
//! is expected to succeed — a lookup failure at this point is an internal invariant
//! violation, not a user-facing diagnostic (§7's `compiler_error` path), never a
//! `panic!`.

use rustc_hash::FxHashMap;

use ion_common::span::FileSpan;
use ion_common::{Diagnostic, DiagnosticKind};
use ion_parser::ast::expr::Expression;
use ion_parser::ast::item::*;
use ion_parser::{NodeId, Statement};

use crate::symbol::{Symbol, SymbolHandle};
use crate::ty::Type;

/// Side table produced by binding: every declaration and use's attached symbol, keyed
/// by `NodeId`. Expressions with no declaring target (literals, arithmetic results)
/// still get an entry — a fresh anonymous symbol to carry their computed type later.
#[derive(Default)]
pub struct Bindings {
    pub symbols: FxHashMap<NodeId, SymbolHandle>,
}

impl Bindings {
    pub fn symbol(&self, id: NodeId) -> Option<&SymbolHandle> {
        self.symbols.get(&id)
    }
}

pub struct Binder {
    scopes: Vec<FxHashMap<String, SymbolHandle>>,
    bindings: Bindings,
}

impl Binder {
    pub fn new() -> Self {
        Binder { scopes: vec![FxHashMap::default()], bindings: Bindings::default() }
    }

    pub fn bind_program(mut self, statements: &[Statement]) -> Result<Bindings, Diagnostic> {
        for statement in statements {
            self.bind_statement(statement)?;
        }
        Ok(self.bindings)
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, symbol: SymbolHandle) {
        self.scopes.last_mut().expect("scope stack is never empty").insert(name.to_string(), symbol);
    }

    fn lookup(&self, name: &str) -> Option<SymbolHandle> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    fn record(&mut self, id: NodeId, symbol: SymbolHandle) {
        self.bindings.symbols.insert(id, symbol);
    }

    fn use_name(&mut self, id: NodeId, name: &str, span: &FileSpan) -> Result<(), Diagnostic> {
        let symbol = self.lookup(name).ok_or_else(|| {
            Diagnostic::new(DiagnosticKind::Internal(format!("unresolved name '{name}' reached the binder")), span.clone())
        })?;
        self.record(id, symbol);
        Ok(())
    }

    fn declare_and_record(&mut self, name: &str, id: NodeId) -> SymbolHandle {
        let symbol = Symbol::declaration(name, id);
        self.declare(name, symbol.clone());
        self.record(id, symbol.clone());
        symbol
    }

    fn bind_statement(&mut self, statement: &Statement) -> Result<(), Diagnostic> {
        match statement {
            Statement::ExpressionStatement(s) => {
                self.record(s.id, Symbol::anonymous());
                self.bind_expression(&s.expression)
            }
            Statement::Block(s) => {
                self.push_scope();
                let result = self.bind_each_statement(&s.statements);
                self.pop_scope();
                result
            }
            Statement::VariableDeclaration(s) => {
                self.declare_and_record(&s.name, s.id);
                if let Some(initializer) = &s.initializer {
                    self.bind_expression(initializer)?;
                }
                Ok(())
            }
            Statement::TypeDeclaration(s) => {
                let symbol = Symbol::type_declaration(&s.name, s.id);
                symbol.set_ty(Type::from_type_ref(&s.value));
                self.declare(&s.name, symbol.clone());
                self.record(s.id, symbol);
                Ok(())
            }
            Statement::EventDeclaration(s) => {
                self.declare_and_record(&s.name, s.id);
                Ok(())
            }
            Statement::InterfaceDeclaration(s) => self.bind_interface(s),
            Statement::EnumDeclaration(s) => self.bind_enum(s),
            Statement::FunctionDeclaration(s) => self.bind_function(s),
            Statement::InstanceConstructor(s) => self.bind_instance(s),
            Statement::Break(_) | Statement::Continue(_) => Ok(()),
            Statement::Return(s) => match &s.expression {
                Some(expression) => self.bind_expression(expression),
                None => Ok(()),
            },
            Statement::If(s) => {
                self.bind_expression(&s.condition)?;
                self.bind_statement(&s.then_branch)?;
                match &s.else_branch {
                    Some(else_branch) => self.bind_statement(else_branch),
                    None => Ok(()),
                }
            }
            Statement::While(s) => {
                self.bind_expression(&s.condition)?;
                self.bind_statement(&s.body)
            }
            Statement::Repeat(s) => {
                self.bind_statement(&s.body)?;
                self.bind_expression(&s.condition)
            }
            Statement::For(s) => {
                self.bind_expression(&s.iterable)?;
                self.push_scope();
                for name in &s.names {
                    if name != "*" {
                        self.declare_and_record(name, s.id);
                    }
                }
                let result = self.bind_statement(&s.body);
                self.pop_scope();
                result
            }
            Statement::After(s) => {
                self.bind_expression(&s.time_expression)?;
                self.bind_statement(&s.body)
            }
            Statement::Every(s) => {
                self.bind_expression(&s.time_expression)?;
                if let Some(condition) = &s.condition {
                    self.bind_expression(condition)?;
                }
                self.bind_statement(&s.body)
            }
            Statement::Match(s) => self.bind_match(s),
            Statement::Import(s) => {
                for name in &s.names {
                    self.declare(name, Symbol::declaration(name, s.id));
                }
                Ok(())
            }
            Statement::Export(s) => self.bind_statement(&s.declaration),
        }
    }

    fn bind_each_statement(&mut self, statements: &[Statement]) -> Result<(), Diagnostic> {
        for statement in statements {
            self.bind_statement(statement)?;
        }
        Ok(())
    }

    fn bind_function(&mut self, decl: &FunctionDeclaration) -> Result<(), Diagnostic> {
        self.declare_and_record(&decl.name, decl.id);
        self.push_scope();
        let result = (|| {
            for parameter in &decl.parameters {
                self.declare_and_record(&parameter.name, parameter.id);
                if let Some(default) = &parameter.default_value {
                    self.bind_expression(default)?;
                }
            }
            self.bind_statement(&decl.body)
        })();
        self.pop_scope();
        result
    }

    /// Constructs the `InterfaceType` from the declaration's fields/methods and stores
    /// it directly on the `TypeDeclarationSymbol` (§4.5) — no later pass recomputes it.
    fn bind_interface(&mut self, decl: &InterfaceDeclaration) -> Result<(), Diagnostic> {
        let mut members = FxHashMap::default();
        for member in &decl.members {
            match member {
                InterfaceMember::Field(f) => {
                    members.insert(f.name.clone(), Type::from_type_ref(&f.field_type));
                }
                InterfaceMember::Method(m) => {
                    let parameters = m.parameter_types.iter().map(Type::from_type_ref).collect();
                    let return_type = Box::new(Type::from_type_ref(&m.return_type));
                    members.insert(m.name.clone(), Type::Function { type_parameters: Vec::new(), parameters, return_type });
                }
            }
        }
        let symbol = Symbol::type_declaration(&decl.name, decl.id);
        symbol.set_ty(Type::Interface { name: decl.name.clone(), members });
        self.declare(&decl.name, symbol.clone());
        self.record(decl.id, symbol);
        Ok(())
    }

    fn bind_enum(&mut self, decl: &EnumDeclaration) -> Result<(), Diagnostic> {
        self.declare_and_record(&decl.name, decl.id);
        for member in &decl.members {
            self.record(member.id, Symbol::anonymous());
            if let Some(value) = &member.value {
                self.bind_expression(value)?;
            }
        }
        Ok(())
    }

    fn bind_instance(&mut self, decl: &InstanceConstructor) -> Result<(), Diagnostic> {
        self.declare_and_record(&decl.name, decl.id);
        if let Some(clone_target) = &decl.clone_target {
            self.bind_expression(clone_target)?;
        }
        for declarator in &decl.declarators {
            match declarator {
                InstanceDeclarator::Property(p) => {
                    self.record(p.id, Symbol::anonymous());
                    self.bind_expression(&p.value)?;
                }
                InstanceDeclarator::Name(n) => self.record(n.id, Symbol::anonymous()),
                InstanceDeclarator::Attribute(a) => {
                    self.record(a.id, Symbol::anonymous());
                    self.bind_expression(&a.value)?;
                }
                InstanceDeclarator::Tag(t) => self.record(t.id, Symbol::anonymous()),
            }
        }
        if let Some(parent) = &decl.parent {
            self.bind_expression(parent)?;
        }
        Ok(())
    }

    fn bind_match(&mut self, stmt: &Match) -> Result<(), Diagnostic> {
        self.bind_expression(&stmt.subject)?;
        for case in &stmt.cases {
            for comparand in &case.comparands {
                self.bind_expression(comparand)?;
            }
            self.bind_statement(&case.body)?;
        }
        if let Some(else_case) = &stmt.else_case {
            self.push_scope();
            let result = (|| {
                if let Some(name) = &else_case.name {
                    self.declare_and_record(name, else_case.id);
                }
                self.bind_statement(&else_case.body)
            })();
            self.pop_scope();
            result?;
        }
        Ok(())
    }

    fn bind_expression(&mut self, expression: &Expression) -> Result<(), Diagnostic> {
        if let Expression::Identifier(identifier) = expression {
            return self.use_name(identifier.id, &identifier.name, &identifier.span);
        }
        self.record(expression.id(), Symbol::anonymous());
        match expression {
            Expression::PrimitiveLiteral(_) | Expression::Identifier(_) => Ok(()),
            Expression::ArrayLiteral(e) => self.bind_each_expression(&e.elements),
            Expression::TupleLiteral(e) => self.bind_each_expression(&e.elements),
            Expression::VectorLiteral(e) => self.bind_each_expression(&e.components),
            Expression::RangeLiteral(e) => {
                self.bind_expression(&e.start)?;
                self.bind_expression(&e.end)
            }
            Expression::RgbLiteral(e) => {
                self.bind_expression(&e.r)?;
                self.bind_expression(&e.g)?;
                self.bind_expression(&e.b)
            }
            Expression::HsvLiteral(e) => {
                self.bind_expression(&e.h)?;
                self.bind_expression(&e.s)?;
                self.bind_expression(&e.v)
            }
            Expression::InterpolatedString(e) => self.bind_each_expression(&e.interpolations),
            Expression::Parenthesized(e) => self.bind_expression(&e.inner),
            Expression::BinaryOp(e) => {
                self.bind_expression(&e.left)?;
                self.bind_expression(&e.right)
            }
            Expression::UnaryOp(e) => self.bind_expression(&e.operand),
            Expression::PostfixUnaryOp(e) => self.bind_expression(&e.operand),
            Expression::AssignmentOp(e) => {
                self.bind_expression(&e.target)?;
                self.bind_expression(&e.value)
            }
            Expression::TernaryOp(e) => {
                self.bind_expression(&e.condition)?;
                self.bind_expression(&e.then_branch)?;
                self.bind_expression(&e.else_branch)
            }
            Expression::Invocation(e) => {
                self.bind_expression(&e.callee)?;
                self.bind_each_expression(&e.arguments)
            }
            Expression::TypeOf(e) => self.bind_expression(&e.operand),
            Expression::NameOf(e) => self.bind_expression(&e.target),
            Expression::Await(e) => self.bind_expression(&e.operand),
            Expression::MemberAccess(e) => self.bind_expression(&e.target),
            Expression::OptionalMemberAccess(e) => self.bind_expression(&e.target),
            Expression::ElementAccess(e) => {
                self.bind_expression(&e.target)?;
                self.bind_expression(&e.index)
            }
        }
    }

    fn bind_each_expression(&mut self, expressions: &[Expression]) -> Result<(), Diagnostic> {
        for expression in expressions {
            self.bind_expression(expression)?;
        }
        Ok(())
    }
}

impl Default for Binder {
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
    fn variable_declaration_gets_a_symbol() {
        let statements = parse("let x = 1");
        let bindings = Binder::new().bind_program(&statements).unwrap();
        let Statement::VariableDeclaration(decl) = &statements[0] else { unreachable!() };
        assert!(bindings.symbol(decl.id).is_some());
    }

    #[test]
    fn identifier_use_shares_the_declaration_symbol() {
        let statements = parse("let x = 1\nlet y = x");
        let bindings = Binder::new().bind_program(&statements).unwrap();
        let Statement::VariableDeclaration(decl_x) = &statements[0] else { unreachable!() };
        let Statement::VariableDeclaration(decl_y) = &statements[1] else { unreachable!() };
        let Some(ion_parser::ast::expr::Expression::Identifier(use_x)) = decl_y.initializer.as_ref() else {
            unreachable!()
        };
        let declared = bindings.symbol(decl_x.id).unwrap();
        let used = bindings.symbol(use_x.id).unwrap();
        assert!(std::rc::Rc::ptr_eq(declared, used));
    }

    #[test]
    fn type_declaration_lowers_its_value_eagerly() {
        let statements = parse("type Id = number");
        let bindings = Binder::new().bind_program(&statements).unwrap();
        let Statement::TypeDeclaration(decl) = &statements[0] else { unreachable!() };
        let symbol = bindings.symbol(decl.id).unwrap();
        assert!(symbol.ty().unwrap().is_same(&Type::number()));
    }

    #[test]
    fn interface_builds_an_interface_type_from_its_members() {
        let statements = parse("interface Shape { area(): number }");
        let bindings = Binder::new().bind_program(&statements).unwrap();
        let Statement::InterfaceDeclaration(decl) = &statements[0] else { unreachable!() };
        let symbol = bindings.symbol(decl.id).unwrap();
        match symbol.ty().unwrap() {
            Type::Interface { name, members } => {
                assert_eq!(name, "Shape");
                assert!(members.contains_key("area"));
            }
            other => panic!("expected an interface type, got {other:?}"),
        }
    }
}
