//! Token-stream cursor shared by the statement and expression parsers.
//!
//! The cursor consumes from an auxiliary **token stack** before the underlying stream —
//! the destination for tokens synthesized by splitting a compound `>>`/`>>>` during
//! generic-argument disambiguation (§4.2.3).

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod types;

use ion_common::span::FileSpan;
use ion_common::token::{SyntaxKind, Token};
use ion_common::Diagnostic;

use crate::ast::NodeIdGen;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Synthesized tokens pushed back during generic-argument splitting, consumed
    /// before `tokens[pos]`.
    stack: Vec<Token>,
    pub(crate) ids: NodeIdGen,
    /// Non-fatal diagnostics accumulated during parsing (`AmbiguousEquals`,
    /// `UnreachableCode`).
    pub(crate) warnings: Vec<Diagnostic>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            stack: Vec::new(),
            ids: NodeIdGen::default(),
            warnings: Vec::new(),
        }
    }

    fn raw_peek(&self, n: usize) -> Option<&Token> {
        if !self.stack.is_empty() {
            if n < self.stack.len() {
                return self.stack.get(self.stack.len() - 1 - n);
            }
            let remaining = n - self.stack.len();
            return self.tokens.get(self.pos + remaining);
        }
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.raw_peek(0)
    }

    pub(crate) fn peek_kind(&self, n: usize) -> Option<SyntaxKind> {
        self.raw_peek(n).map(|t| t.kind)
    }

    pub(crate) fn current_kind(&self) -> Option<SyntaxKind> {
        self.peek_kind(0)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        if let Some(tok) = self.stack.pop() {
            return Some(tok);
        }
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Push a synthesized token back onto the stack, to be consumed before the
    /// underlying stream (used when splitting a compound right-angle token).
    pub(crate) fn push_synthetic(&mut self, token: Token) {
        self.stack.push(token);
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Result<Token, Diagnostic> {
        if self.at(kind) {
            Ok(self.advance().expect("at() true implies a token exists"))
        } else {
            let found = self
                .peek()
                .map(|t| t.get_text().to_string())
                .unwrap_or_else(|| "end of input".to_string());
            Err(Diagnostic::new(
                ion_common::DiagnosticKind::ExpectedDifferentSyntax {
                    expected: kind.to_str().to_string(),
                    found,
                },
                self.current_span(),
            ))
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    pub(crate) fn current_span(&self) -> FileSpan {
        match self.peek() {
            Some(t) => t.span.clone(),
            None => {
                let last = self.tokens.last().expect("at least one token in a non-empty file");
                FileSpan::new(last.span.end.clone(), last.span.end.clone())
            }
        }
    }

    pub(crate) fn span_from(&self, start: &ion_common::span::FileLocation) -> FileSpan {
        let end = match self.tokens.get(self.pos.saturating_sub(1)) {
            Some(t) => t.span.end.clone(),
            None => start.clone(),
        };
        FileSpan::new(start.clone(), end)
    }

    /// Any run of semicolons is a silent statement separator (§4.2.2).
    pub(crate) fn eat_semicolons(&mut self) {
        while self.eat(SyntaxKind::Semicolon) {}
    }
}

/// Parse a whole token stream (produced by `ion_lexer::Lexer::tokenize`) into the
/// top-level statement list of a source file, plus any non-fatal diagnostics
/// (`AmbiguousEquals`, `UnreachableCode`) collected along the way.
pub fn parse(tokens: Vec<Token>) -> Result<(Vec<crate::ast::Statement>, Vec<Diagnostic>), Diagnostic> {
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();

    parser.eat_semicolons();
    while !parser.is_eof() {
        statements.push(items::parse_statement(&mut parser)?);
        parser.eat_semicolons();
    }

    items::warn_unreachable_code(&statements, &mut parser.warnings);
    Ok((statements, parser.warnings))
}
