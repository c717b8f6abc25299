//! Lexer for the ion language: source text -> token stream.
//!
//! Implements the longest-match policy over multi-character operator families and the
//! interpolated-string sub-grammar described by the front end's design.

mod cursor;

use std::sync::Arc;

use cursor::Cursor;
use ion_common::diagnostics::DiagnosticKind;
use ion_common::span::{FileLocation, FileSpan, SourceFile};
use ion_common::token::{SyntaxKind, Token};
use ion_common::Diagnostic;

/// What the lexer is currently scanning. Interpolated strings push/pop this stack the
/// way the reference lexer toggles between string-content mode and expression mode on
/// `#{` / `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Scanning the literal characters of a string body. `quote` is `'` or `"`;
    /// only `"` strings interpolate.
    StringBody { quote: char, interpolates: bool },
    /// Scanning expression tokens inside a `#{ ... }` interpolation. `brace_depth`
    /// tracks nested `{`/`}` so the matching `}` (not one from a nested block) pops
    /// back to `StringBody`.
    Interpolation { brace_depth: u32 },
}

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    file: Arc<SourceFile>,
    mode_stack: Vec<Mode>,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(file: Arc<SourceFile>, source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file,
            mode_stack: vec![Mode::Normal],
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole file. On the first lexical error, returns that diagnostic
    /// rather than continuing (errors in this pass are always fatal).
    #[tracing::instrument(level = "debug", skip(file, source), fields(path = %file.path))]
    pub fn tokenize(file: Arc<SourceFile>, source: &'src str) -> Result<Vec<Token>, Diagnostic> {
        let mut lexer = Lexer::new(file, source);
        lexer.run()?;
        tracing::debug!(token_count = lexer.tokens.len(), "lexed source file");
        Ok(lexer.tokens)
    }

    fn loc(&self, pos: u32) -> FileLocation {
        FileLocation::new(self.file.clone(), pos)
    }

    fn span(&self, start: u32, end: u32) -> FileSpan {
        FileSpan::new(self.loc(start), self.loc(end))
    }

    fn push(&mut self, kind: SyntaxKind, start: u32) {
        let span = self.span(start, self.cursor.pos());
        self.tokens.push(Token::new(kind, span));
    }

    fn mode(&self) -> Mode {
        *self.mode_stack.last().expect("mode stack never empty")
    }

    fn run(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.mode() {
                Mode::Normal | Mode::Interpolation { .. } => {
                    self.skip_trivia();
                    if self.cursor.is_eof() {
                        if matches!(self.mode(), Mode::Interpolation { .. }) {
                            return Err(self.error_here(DiagnosticKind::UnexpectedEof));
                        }
                        return Ok(());
                    }
                    self.lex_normal()?;
                }
                Mode::StringBody { quote, interpolates } => {
                    self.lex_string_body(quote, interpolates)?;
                }
            }
        }
    }

    fn error_here(&self, kind: DiagnosticKind) -> Diagnostic {
        let pos = self.cursor.pos();
        Diagnostic::new(kind, self.span(pos, pos))
    }

    fn skip_trivia(&mut self) {
        self.cursor
            .eat_while(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');
    }

    fn lex_normal(&mut self) -> Result<(), Diagnostic> {
        let start = self.cursor.pos();
        let c = self.cursor.peek().expect("checked not eof");

        match c {
            '(' => self.single(SyntaxKind::LParen, start),
            ')' => self.single(SyntaxKind::RParen, start),
            '[' => self.single(SyntaxKind::LBracket, start),
            ']' => self.single(SyntaxKind::RBracket, start),
            '{' => {
                if let Mode::Interpolation { brace_depth } = self.mode() {
                    *self.mode_stack.last_mut().unwrap() = Mode::Interpolation {
                        brace_depth: brace_depth + 1,
                    };
                }
                self.single(SyntaxKind::LBrace, start)
            }
            '}' => {
                if let Mode::Interpolation { brace_depth } = self.mode() {
                    if brace_depth == 0 {
                        self.cursor.advance();
                        self.push(SyntaxKind::InterpolationEnd, start);
                        self.mode_stack.pop();
                        return Ok(());
                    }
                    *self.mode_stack.last_mut().unwrap() = Mode::Interpolation {
                        brace_depth: brace_depth - 1,
                    };
                }
                self.single(SyntaxKind::RBrace, start)
            }
            ',' => self.single(SyntaxKind::Comma, start),
            ';' => self.single(SyntaxKind::Semicolon, start),
            '@' => self.single(SyntaxKind::At, start),
            '#' => self.single(SyntaxKind::Hashtag, start),
            '?' => self.operator(
                start,
                &[("??=", SyntaxKind::QuestionQuestionEquals), ("??", SyntaxKind::QuestionQuestion)],
                SyntaxKind::Question,
            ),
            '.' => self.operator(start, &[("..", SyntaxKind::DotDot)], SyntaxKind::Dot),
            ':' => self.operator(start, &[("::", SyntaxKind::ColonColon)], SyntaxKind::Colon),
            '+' => self.operator(
                start,
                &[("+=", SyntaxKind::PlusEquals), ("++", SyntaxKind::PlusPlus)],
                SyntaxKind::Plus,
            ),
            '-' => self.operator(
                start,
                &[("-->", SyntaxKind::LongArrow), ("->", SyntaxKind::RArrow), ("--", SyntaxKind::MinusMinus), ("-=", SyntaxKind::MinusEquals)],
                SyntaxKind::Minus,
            ),
            '*' => self.operator(start, &[("*=", SyntaxKind::StarEquals)], SyntaxKind::Star),
            '/' => self.operator(
                start,
                &[("//=", SyntaxKind::SlashSlashEquals), ("//", SyntaxKind::SlashSlash), ("/=", SyntaxKind::SlashEquals)],
                SyntaxKind::Slash,
            ),
            '%' => self.operator(start, &[("%=", SyntaxKind::PercentEquals)], SyntaxKind::Percent),
            '^' => self.operator(start, &[("^=", SyntaxKind::CaretEquals)], SyntaxKind::Caret),
            '~' => self.operator(start, &[("~=", SyntaxKind::TildeEquals)], SyntaxKind::Tilde),
            '!' => self.operator(start, &[("!=", SyntaxKind::BangEquals)], SyntaxKind::Bang),
            '=' => self.operator(start, &[("==", SyntaxKind::EqualsEquals)], SyntaxKind::Equals),
            '&' => self.operator(
                start,
                &[
                    ("&&=", SyntaxKind::AmpersandAmpersandEquals),
                    ("&&", SyntaxKind::AmpersandAmpersand),
                    ("&=", SyntaxKind::AmpersandEquals),
                ],
                SyntaxKind::Ampersand,
            ),
            '|' => self.operator(
                start,
                &[
                    ("||=", SyntaxKind::PipePipeEquals),
                    ("||", SyntaxKind::PipePipe),
                    ("|=", SyntaxKind::PipeEquals),
                ],
                SyntaxKind::Pipe,
            ),
            '<' => self.operator(
                start,
                &[
                    ("<<=", SyntaxKind::LArrowLArrowEquals),
                    ("<<", SyntaxKind::LArrowLArrow),
                    ("<=", SyntaxKind::LAngleEquals),
                ],
                SyntaxKind::LAngle,
            ),
            '>' => self.operator(
                start,
                &[
                    (">>>=", SyntaxKind::RArrowRArrowRArrowEquals),
                    (">>>", SyntaxKind::RArrowRArrowRArrow),
                    (">>=", SyntaxKind::RArrowRArrowEquals),
                    (">>", SyntaxKind::RArrowRArrow),
                    (">=", SyntaxKind::RAngleEquals),
                ],
                SyntaxKind::RAngle,
            ),
            '"' | '\'' => {
                self.cursor.advance();
                self.mode_stack.push(Mode::StringBody {
                    quote: c,
                    interpolates: c == '"',
                });
                Ok(())
            }
            '0'..='9' => self.lex_number(start),
            c if is_ident_start(c) => self.lex_ident(start),
            other => Err(self.error_here(DiagnosticKind::UnexpectedCharacter { character: other })),
        }
    }

    fn single(&mut self, kind: SyntaxKind, start: u32) -> Result<(), Diagnostic> {
        self.cursor.advance();
        self.push(kind, start);
        Ok(())
    }

    /// Longest-match dispatch: `candidates` must be given longest-continuation-first;
    /// the first one whose literal text matches what follows `start` wins, else
    /// `fallback` (the bare first character) is emitted.
    fn operator(
        &mut self,
        start: u32,
        candidates: &[(&str, SyntaxKind)],
        fallback: SyntaxKind,
    ) -> Result<(), Diagnostic> {
        for (text, kind) in candidates {
            if self.cursor.matches_ahead(text) {
                for _ in 0..text.chars().count() {
                    self.cursor.advance();
                }
                self.push(*kind, start);
                return Ok(());
            }
        }
        self.cursor.advance();
        self.push(fallback, start);
        Ok(())
    }

    fn lex_ident(&mut self, start: u32) -> Result<(), Diagnostic> {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = SyntaxKind::keyword_from_str(text).unwrap_or(SyntaxKind::Identifier);
        self.push(kind, start);
        Ok(())
    }

    /// `0x…` / `0o…` / `0b…` prefixes, decimal literals, and an optional unit suffix
    /// (`ms`, `m`, `hz`, `h`, `d`, `%`). Interpretation of the suffix (the semantic
    /// conversion) is left to the node that later reads the literal's text; the lexer
    /// only validates that at most one decimal point appears.
    fn lex_number(&mut self, start: u32) -> Result<(), Diagnostic> {
        self.cursor.advance();
        let first = self.cursor.slice(start, self.cursor.pos());

        if first == "0" {
            match self.cursor.peek() {
                Some('x' | 'X') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
                    self.push(SyntaxKind::NumberLiteral, start);
                    return Ok(());
                }
                Some('o' | 'O') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| matches!(c, '0'..='7' | '_'));
                    self.push(SyntaxKind::NumberLiteral, start);
                    return Ok(());
                }
                Some('b' | 'B') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c == '0' || c == '1' || c == '_');
                    self.push(SyntaxKind::NumberLiteral, start);
                    return Ok(());
                }
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        let mut saw_dot = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            saw_dot = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }

        if saw_dot && self.cursor.peek() == Some('.') {
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '.' || c == '_');
            let lexeme = self.cursor.slice(start, self.cursor.pos()).to_string();
            return Err(self.error_here(DiagnosticKind::MalformedNumber { lexeme }));
        }

        // Optional unit suffix: ms, hz, h, d, m, or %.
        if self.cursor.matches_ahead("ms") {
            self.cursor.advance();
            self.cursor.advance();
        } else if self.cursor.matches_ahead("hz") {
            self.cursor.advance();
            self.cursor.advance();
        } else if matches!(self.cursor.peek(), Some('h' | 'd' | 'm')) && !is_ident_continue(self.cursor.peek_next().unwrap_or(' ')) {
            self.cursor.advance();
        } else if self.cursor.peek() == Some('%') {
            self.cursor.advance();
        }

        self.push(SyntaxKind::NumberLiteral, start);
        Ok(())
    }

    /// Standard escapes: `\n \r \t \b \f \v \a \e \\ \" \' \#`.
    fn is_valid_escape(c: char) -> bool {
        matches!(c, 'n' | 'r' | 't' | 'b' | 'f' | 'v' | 'a' | 'e' | '\\' | '"' | '\'' | '#')
    }

    fn lex_string_body(&mut self, quote: char, interpolates: bool) -> Result<(), Diagnostic> {
        let start = self.cursor.pos();

        loop {
            match self.cursor.peek() {
                None => return Err(self.error_here(DiagnosticKind::UnterminatedString)),
                Some('\n') => return Err(self.error_here(DiagnosticKind::UnterminatedString)),
                Some('\\') => {
                    let escape_start = self.cursor.pos();
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some(c) if Self::is_valid_escape(c) => {
                            self.cursor.advance();
                        }
                        Some(other) => {
                            return Err(Diagnostic::new(
                                DiagnosticKind::UnexpectedCharacter { character: other },
                                self.span(escape_start, self.cursor.pos()),
                            ))
                        }
                        None => return Err(self.error_here(DiagnosticKind::UnterminatedString)),
                    }
                }
                Some('#') if interpolates && self.cursor.peek_next() == Some('{') => {
                    let part_end = self.cursor.pos();
                    if part_end > start {
                        self.push(SyntaxKind::InterpolatedStringPart, start);
                    }
                    let interp_start = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    self.push(SyntaxKind::InterpolationStart, interp_start);
                    self.mode_stack.push(Mode::Interpolation { brace_depth: 0 });
                    return Ok(());
                }
                Some(c) if c == quote => {
                    self.push(SyntaxKind::InterpolatedStringPart, start);
                    self.cursor.advance();
                    self.mode_stack.pop();
                    return Ok(());
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<SyntaxKind> {
        let file = SourceFile::new("test.ion", src);
        Lexer::tokenize(file, src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn simple_declaration() {
        assert_eq!(
            lex("let x = 1 + 2"),
            vec![
                SyntaxKind::Let,
                SyntaxKind::Identifier,
                SyntaxKind::Equals,
                SyntaxKind::NumberLiteral,
                SyntaxKind::Plus,
                SyntaxKind::NumberLiteral,
            ]
        );
    }

    #[test]
    fn operator_longest_match() {
        assert_eq!(lex(">>>="), vec![SyntaxKind::RArrowRArrowRArrowEquals]);
        assert_eq!(lex(">>>"), vec![SyntaxKind::RArrowRArrowRArrow]);
        assert_eq!(lex(">>="), vec![SyntaxKind::RArrowRArrowEquals]);
        assert_eq!(lex(">>"), vec![SyntaxKind::RArrowRArrow]);
        assert_eq!(lex(">="), vec![SyntaxKind::RAngleEquals]);
        assert_eq!(lex(">"), vec![SyntaxKind::RAngle]);
    }

    #[test]
    fn exponent_and_xor_do_not_collide() {
        assert_eq!(lex("^"), vec![SyntaxKind::Caret]);
        assert_eq!(lex("~"), vec![SyntaxKind::Tilde]);
    }

    #[test]
    fn simple_string() {
        assert_eq!(
            lex("\"hello\""),
            vec![SyntaxKind::InterpolatedStringPart]
        );
    }

    #[test]
    fn interpolated_string() {
        assert_eq!(
            lex("\"hello #{name} world\""),
            vec![
                SyntaxKind::InterpolatedStringPart,
                SyntaxKind::InterpolationStart,
                SyntaxKind::Identifier,
                SyntaxKind::InterpolationEnd,
                SyntaxKind::InterpolatedStringPart,
            ]
        );
    }

    #[test]
    fn single_quoted_string_does_not_interpolate() {
        assert_eq!(lex("'a #{b} c'"), vec![SyntaxKind::InterpolatedStringPart]);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let file = SourceFile::new("test.ion", "\"abc");
        assert!(Lexer::tokenize(file, "\"abc").is_err());
    }

    #[test]
    fn malformed_number_two_dots() {
        let file = SourceFile::new("test.ion", "1.2.3");
        assert!(Lexer::tokenize(file, "1.2.3").is_err());
    }

    #[test]
    fn hex_octal_binary_prefixes() {
        assert_eq!(lex("0xFF"), vec![SyntaxKind::NumberLiteral]);
        assert_eq!(lex("0o17"), vec![SyntaxKind::NumberLiteral]);
        assert_eq!(lex("0b101"), vec![SyntaxKind::NumberLiteral]);
    }

    #[test]
    fn number_unit_suffix() {
        assert_eq!(lex("500ms"), vec![SyntaxKind::NumberLiteral]);
        assert_eq!(lex("3h"), vec![SyntaxKind::NumberLiteral]);
        assert_eq!(lex("50%"), vec![SyntaxKind::NumberLiteral]);
    }
}
