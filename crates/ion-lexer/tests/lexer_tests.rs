use insta::assert_yaml_snapshot;
use ion_common::span::SourceFile;
use ion_lexer::Lexer;
use serde::Serialize;

/// A human-readable representation of a token for snapshot testing.
#[derive(Serialize)]
struct TokenSnapshot {
    kind: String,
    text: String,
    line: u32,
    column: u32,
}

fn tokenize_snapshot(source: &str) -> Vec<TokenSnapshot> {
    let file = SourceFile::new("snapshot.ion", source);
    Lexer::tokenize(file, source)
        .expect("fixture source must lex cleanly")
        .into_iter()
        .map(|tok| TokenSnapshot {
            kind: format!("{:?}", tok.kind),
            text: tok.get_text().to_string(),
            line: tok.span.start.line,
            column: tok.span.start.column,
        })
        .collect()
}

#[test]
fn keywords() {
    let tokens = tokenize_snapshot(
        "let const fn return break continue if else while repeat for instance clone \
         event enum typeof nameof type interface async await after every match \
         import export from true false null rgb hsv",
    );
    assert_yaml_snapshot!(tokens);
}

#[test]
fn operator_table_longest_match() {
    let tokens = tokenize_snapshot(
        "+ += ++ - -= -- -> --> * *= / /= // //= % %= ^ ^= & && &= &&= | || |= ||= \
         ~ ~= ! != = == < <= << <<= > >= >> >>= >>> >>>= ? ?? ??= . .. : :: ; , @ #",
    );
    assert_yaml_snapshot!(tokens);
}

#[test]
fn identifiers_and_numbers() {
    let tokens = tokenize_snapshot("count _private camelCase 42 0xFF 0o17 0b101 3.14 500ms 2h 50%");
    assert_yaml_snapshot!(tokens);
}

#[test]
fn simple_string_has_no_interpolation_tokens() {
    let tokens = tokenize_snapshot(r#""hello world""#);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn interpolated_string_splits_into_parts() {
    let tokens = tokenize_snapshot(r#""count is #{count + 1} items""#);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn nested_braces_inside_interpolation() {
    let tokens = tokenize_snapshot(r#""value #{ { 1 } } end""#);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn single_quoted_string_is_literal() {
    let tokens = tokenize_snapshot(r#"'no #{interpolation} here'"#);
    assert_yaml_snapshot!(tokens);
}

#[test]
fn no_eof_token_is_emitted() {
    let file = SourceFile::new("snapshot.ion", "let x = 1");
    let tokens = Lexer::tokenize(file, "let x = 1").unwrap();
    assert!(tokens.iter().all(|t| t.get_text() != "eof"));
    assert_eq!(tokens.len(), 4);
}

#[test]
fn newlines_are_not_tokens() {
    let file = SourceFile::new("snapshot.ion", "let x = 1\n\nlet y = 2\n");
    let tokens = Lexer::tokenize(file, "let x = 1\n\nlet y = 2\n").unwrap();
    assert_eq!(tokens.len(), 8);
}

#[test]
fn spans_accurate() {
    let tokens = tokenize_snapshot("let x = 42");
    assert_yaml_snapshot!(tokens);
}

#[test]
fn unexpected_character_is_fatal() {
    let file = SourceFile::new("snapshot.ion", "let x = `");
    let result = Lexer::tokenize(file, "let x = `");
    assert!(result.is_err());
}

#[test]
fn unterminated_string_is_fatal() {
    let file = SourceFile::new("snapshot.ion", "\"unterminated");
    let result = Lexer::tokenize(file, "\"unterminated");
    assert!(result.is_err());
}

#[test]
fn malformed_number_is_fatal() {
    let file = SourceFile::new("snapshot.ion", "1.2.3");
    let result = Lexer::tokenize(file, "1.2.3");
    assert!(result.is_err());
}
