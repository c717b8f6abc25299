//! Shared data types for the ion compiler front end: source locations, tokens, and
//! diagnostics. Every other crate in the workspace depends on this one.

pub mod diagnostics;
pub mod span;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use span::{FileLocation, FileSpan, SourceFile};
pub use token::{SyntaxKind, Token};
