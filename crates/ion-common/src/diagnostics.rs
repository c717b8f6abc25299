use std::fmt;

use crate::span::FileSpan;

/// Severity of a diagnostic. Only `Error` is fatal (see [`Diagnostic::is_fatal`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Debug,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

/// The closed taxonomy of diagnostic kinds the pipeline can emit, each with a stable
/// numeric code used as the `ION####` code in rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    UnexpectedCharacter { character: char },
    MalformedNumber { lexeme: String },
    UnterminatedString,
    UnexpectedSyntax { found: String },
    UnexpectedEof,
    ExpectedDifferentSyntax { expected: String, found: String },
    InvalidAssignment,
    InvalidExport,
    InvalidNameOf,
    InvalidDecoratorTarget,
    DuplicateVariable { name: String },
    VariableNotFound { name: String },
    VariableReadInOwnInitializer { name: String },
    InvalidBreak,
    InvalidContinue,
    InvalidReturn,
    InvalidAwait,
    DuplicateMember { name: String },
    NoVariableTypeOrInitializer { name: String },
    UnreachableCode,
    AmbiguousEquals,
    /// A violated internal invariant (the `compiler_error`/`COMPILER_ASSERT` path).
    /// Always fatal, always exits with code 255, never a taxonomy member a source
    /// program can trigger.
    Internal(String),
}

impl DiagnosticKind {
    pub fn code(&self) -> i32 {
        use DiagnosticKind::*;
        match self {
            UnexpectedCharacter { .. } => 1,
            MalformedNumber { .. } => 2,
            UnterminatedString => 3,
            UnexpectedSyntax { .. } => 4,
            UnexpectedEof => 5,
            ExpectedDifferentSyntax { .. } => 6,
            InvalidAssignment => 7,
            InvalidExport => 8,
            InvalidNameOf => 9,
            InvalidDecoratorTarget => 10,
            DuplicateVariable { .. } => 11,
            VariableNotFound { .. } => 12,
            VariableReadInOwnInitializer { .. } => 13,
            InvalidBreak => 14,
            InvalidContinue => 15,
            InvalidReturn => 16,
            InvalidAwait => 18,
            DuplicateMember { .. } => 19,
            NoVariableTypeOrInitializer { .. } => 20,
            UnreachableCode => 100,
            AmbiguousEquals => 101,
            Internal(_) => -1,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnreachableCode | DiagnosticKind::AmbiguousEquals => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The human-readable message shown for this diagnostic.
    pub fn message(&self) -> String {
        use DiagnosticKind::*;
        match self {
            UnexpectedCharacter { character } => format!("Unexpected character '{character}'."),
            MalformedNumber { lexeme } => format!("Malformed number '{lexeme}'."),
            UnterminatedString => "Unterminated string literal.".to_string(),
            UnexpectedSyntax { found } => format!("Unexpected '{found}'."),
            UnexpectedEof => "Unexpected end of file.".to_string(),
            ExpectedDifferentSyntax { expected, found } => {
                format!("Expected '{expected}', got '{found}'.")
            }
            InvalidAssignment => "Invalid assignment target.".to_string(),
            InvalidExport => "'export' may only precede a declaration.".to_string(),
            InvalidNameOf => "'nameof' target must be an identifier or member access.".to_string(),
            InvalidDecoratorTarget => "A decorator may only precede a function.".to_string(),
            DuplicateVariable { name } => {
                format!("Name '{name}' is already declared in this scope.")
            }
            VariableNotFound { name } => format!("Cannot find name '{name}'."),
            VariableReadInOwnInitializer { name } => {
                format!("Cannot use '{name}' before it is defined.")
            }
            InvalidBreak => "'break' may only appear inside a loop.".to_string(),
            InvalidContinue => "'continue' may only appear inside a loop.".to_string(),
            InvalidReturn => "'return' may only appear inside a function.".to_string(),
            InvalidAwait => "'await' may only appear inside an async function.".to_string(),
            DuplicateMember { name } => format!("Member '{name}' is already declared."),
            NoVariableTypeOrInitializer { name } => {
                format!("Variable '{name}' needs a type annotation or an initializer.")
            }
            UnreachableCode => "Unreachable code detected.".to_string(),
            AmbiguousEquals => "Did you mean to use '==' instead of '='?".to_string(),
            Internal(message) => message.clone(),
        }
    }
}

/// A single diagnostic, anchored to a span, ready to render.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: FileSpan,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: FileSpan) -> Self {
        Self { kind, span }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.severity() == Severity::Error
    }

    /// Exit code a fatal diagnostic maps to at the process boundary.
    pub fn exit_code(&self) -> i32 {
        match &self.kind {
            DiagnosticKind::Internal(_) => 255,
            other => other.code(),
        }
    }
}

impl fmt::Display for Diagnostic {
    /// Renders the stable, machine-parseable format:
    /// `<file>:<line>:<col> - <severity> ION####: <message>\n\n  <line-number>    <source-line>\n<gutter><underline>\n`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = &self.span.start;
        let severity = self.kind.severity();
        let code = self.kind.code();

        writeln!(
            f,
            "{}:{}:{} - {} ION{:04}: {}",
            start.file.path,
            start.line,
            start.column,
            severity.label(),
            code.unsigned_abs(),
            self.kind.message()
        )?;
        writeln!(f)?;

        let line_number = start.line.to_string();
        let line_text = self.span.get_line();
        writeln!(f, "  {line_number}    {line_text}")?;

        let gutter = " ".repeat(line_number.len() + 5);
        let underline_start = start.column as usize;
        let underline_len = (self.span.end.column as i64 - start.column as i64).max(1) as usize;
        writeln!(
            f,
            "{gutter}{}{}",
            " ".repeat(underline_start),
            "~".repeat(underline_len)
        )
    }
}

impl std::error::Error for Diagnostic {}
