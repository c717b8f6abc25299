//! Statement and declaration nodes.

use ion_common::span::FileSpan;
use ion_common::token::Token;

use super::expr::Expression;
use super::ty::{TypeParameterRef, TypeRef};
use super::NodeId;

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub id: NodeId,
    pub expression: Expression,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub id: NodeId,
    pub is_const: bool,
    pub name: String,
    pub name_token: Token,
    pub colon_type: Option<TypeRef>,
    pub initializer: Option<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub id: NodeId,
    pub name: String,
    pub type_parameters: Vec<TypeParameterRef>,
    pub value: TypeRef,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: NodeId,
    pub name: String,
    pub colon_type: Option<TypeRef>,
    pub default_value: Option<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct EventDeclaration {
    pub id: NodeId,
    pub name: String,
    pub type_parameters: Vec<TypeParameterRef>,
    pub parameter_types: Vec<TypeRef>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct InterfaceField {
    pub id: NodeId,
    pub is_const: bool,
    pub name: String,
    pub field_type: TypeRef,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct InterfaceMethod {
    pub id: NodeId,
    pub name: String,
    pub type_parameters: Vec<TypeParameterRef>,
    pub parameter_types: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub enum InterfaceMember {
    Field(InterfaceField),
    Method(InterfaceMethod),
}

#[derive(Debug, Clone)]
pub struct InterfaceDeclaration {
    pub id: NodeId,
    pub name: String,
    pub type_parameters: Vec<TypeParameterRef>,
    pub members: Vec<InterfaceMember>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub id: NodeId,
    pub name: String,
    pub value: Option<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct EnumDeclaration {
    pub id: NodeId,
    pub name: String,
    pub members: Vec<EnumMember>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Decorator {
    pub id: NodeId,
    pub name: String,
    pub arguments: Vec<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub id: NodeId,
    pub decorators: Vec<Decorator>,
    pub is_async: bool,
    pub name: String,
    pub type_parameters: Vec<TypeParameterRef>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

/// `name: value` inside an `instance` body, e.g. `width: 10`.
#[derive(Debug, Clone)]
pub struct InstancePropertyDeclarator {
    pub id: NodeId,
    pub name: String,
    pub value: Expression,
    pub span: FileSpan,
}

/// The bare `name` declarator inside an `instance` body (contributes the synthetic
/// `Name` key to duplicate-member tracking).
#[derive(Debug, Clone)]
pub struct InstanceNameDeclarator {
    pub id: NodeId,
    pub name: String,
    pub span: FileSpan,
}

/// `@attr: value` inside an `instance` body.
#[derive(Debug, Clone)]
pub struct InstanceAttributeDeclarator {
    pub id: NodeId,
    pub name: String,
    pub value: Expression,
    pub span: FileSpan,
}

/// `#tag` inside an `instance` body.
#[derive(Debug, Clone)]
pub struct InstanceTagDeclarator {
    pub id: NodeId,
    pub name: String,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub enum InstanceDeclarator {
    Property(InstancePropertyDeclarator),
    Name(InstanceNameDeclarator),
    Attribute(InstanceAttributeDeclarator),
    Tag(InstanceTagDeclarator),
}

/// `instance Name : Type [clone target] { declarators } [-> parent]`.
#[derive(Debug, Clone)]
pub struct InstanceConstructor {
    pub id: NodeId,
    pub name: String,
    pub colon_type: TypeRef,
    /// Present when the constructor seeds its state by deep-copying another value.
    pub clone_target: Option<Expression>,
    pub declarators: Vec<InstanceDeclarator>,
    pub parent: Option<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Break {
    pub id: NodeId,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Continue {
    pub id: NodeId,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub id: NodeId,
    pub expression: Option<Expression>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct If {
    pub id: NodeId,
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct While {
    pub id: NodeId,
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

/// `repeat <body> while <condition>` — condition tested after the body, at least once.
#[derive(Debug, Clone)]
pub struct Repeat {
    pub id: NodeId,
    pub body: Box<Statement>,
    pub condition: Expression,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct For {
    pub id: NodeId,
    pub names: Vec<String>,
    pub iterable: Expression,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct After {
    pub id: NodeId,
    pub time_expression: Expression,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Every {
    pub id: NodeId,
    pub time_expression: Expression,
    pub condition: Option<Expression>,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct MatchCase {
    pub id: NodeId,
    pub comparands: Vec<Expression>,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct MatchElseCase {
    pub id: NodeId,
    pub name: Option<String>,
    pub body: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Match {
    pub id: NodeId,
    pub subject: Expression,
    pub cases: Vec<MatchCase>,
    pub else_case: Option<MatchElseCase>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub id: NodeId,
    pub names: Vec<String>,
    /// `true` for `import * from "module"`.
    pub is_wildcard: bool,
    pub module_name: String,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub struct Export {
    pub id: NodeId,
    pub declaration: Box<Statement>,
    pub span: FileSpan,
}

#[derive(Debug, Clone)]
pub enum Statement {
    ExpressionStatement(ExpressionStatement),
    Block(Block),
    VariableDeclaration(VariableDeclaration),
    TypeDeclaration(TypeDeclaration),
    EventDeclaration(EventDeclaration),
    InterfaceDeclaration(InterfaceDeclaration),
    EnumDeclaration(EnumDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    InstanceConstructor(InstanceConstructor),
    Break(Break),
    Continue(Continue),
    Return(Return),
    If(If),
    While(While),
    Repeat(Repeat),
    For(For),
    After(After),
    Every(Every),
    Match(Match),
    Import(Import),
    Export(Export),
}

impl Statement {
    pub fn id(&self) -> NodeId {
        match self {
            Statement::ExpressionStatement(n) => n.id,
            Statement::Block(n) => n.id,
            Statement::VariableDeclaration(n) => n.id,
            Statement::TypeDeclaration(n) => n.id,
            Statement::EventDeclaration(n) => n.id,
            Statement::InterfaceDeclaration(n) => n.id,
            Statement::EnumDeclaration(n) => n.id,
            Statement::FunctionDeclaration(n) => n.id,
            Statement::InstanceConstructor(n) => n.id,
            Statement::Break(n) => n.id,
            Statement::Continue(n) => n.id,
            Statement::Return(n) => n.id,
            Statement::If(n) => n.id,
            Statement::While(n) => n.id,
            Statement::Repeat(n) => n.id,
            Statement::For(n) => n.id,
            Statement::After(n) => n.id,
            Statement::Every(n) => n.id,
            Statement::Match(n) => n.id,
            Statement::Import(n) => n.id,
            Statement::Export(n) => n.id,
        }
    }

    pub fn span(&self) -> &FileSpan {
        match self {
            Statement::ExpressionStatement(n) => &n.span,
            Statement::Block(n) => &n.span,
            Statement::VariableDeclaration(n) => &n.span,
            Statement::TypeDeclaration(n) => &n.span,
            Statement::EventDeclaration(n) => &n.span,
            Statement::InterfaceDeclaration(n) => &n.span,
            Statement::EnumDeclaration(n) => &n.span,
            Statement::FunctionDeclaration(n) => &n.span,
            Statement::InstanceConstructor(n) => &n.span,
            Statement::Break(n) => &n.span,
            Statement::Continue(n) => &n.span,
            Statement::Return(n) => &n.span,
            Statement::If(n) => &n.span,
            Statement::While(n) => &n.span,
            Statement::Repeat(n) => &n.span,
            Statement::For(n) => &n.span,
            Statement::After(n) => &n.span,
            Statement::Every(n) => &n.span,
            Statement::Match(n) => &n.span,
            Statement::Import(n) => &n.span,
            Statement::Export(n) => &n.span,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Statement::Block(_))
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Statement::Return(_))
    }

    /// True for the declaration forms `export` may legally prefix.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Statement::VariableDeclaration(_)
                | Statement::TypeDeclaration(_)
                | Statement::EventDeclaration(_)
                | Statement::InterfaceDeclaration(_)
                | Statement::EnumDeclaration(_)
                | Statement::FunctionDeclaration(_)
                | Statement::InstanceConstructor(_)
        )
    }
}
