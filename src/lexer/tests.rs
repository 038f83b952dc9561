//! Unit tests for the lexer module.

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.lang".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("fn return if else while for in struct enum true false"),
        vec![
            TokenKind::Fn,
            TokenKind::Return,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::In,
            TokenKind::Struct,
            TokenKind::Enum,
            TokenKind::True,
            TokenKind::False,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers_and_primitives() {
    let tokens = tokenize("foo s32 bool8 u64x type _under".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].kind, TokenKind::Primitive);
    assert_eq!(tokens[1].value, "s32");
    assert_eq!(tokens[2].kind, TokenKind::Primitive);
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "u64x");
    assert_eq!(tokens[4].kind, TokenKind::Primitive);
    assert_eq!(tokens[5].kind, TokenKind::Identifier);
}

#[test]
fn test_abstract_types_are_not_keywords() {
    assert_eq!(
        kinds("intlike numberlike"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_tokenize_numbers_and_ranges() {
    let tokens = tokenize("42 3.14 0..10".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].kind, TokenKind::DotDot);
    assert_eq!(tokens[4].value, "10");
}

#[test]
fn test_tokenize_declaration_operators() {
    assert_eq!(
        kinds("a :: b := c : d = e;"),
        vec![
            TokenKind::Identifier,
            TokenKind::ColonColon,
            TokenKind::Identifier,
            TokenKind::ColonEquals,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("== != ! < <= > >= || && & -> + - * / += -= *= /= . [ ]"),
        vec![
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Not,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Or,
            TokenKind::And,
            TokenKind::Ampersand,
            TokenKind::Arrow,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::Dot,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_strings_with_escapes() {
    let tokens = tokenize(r#""hello\n" "say \"hi\"""#.to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello\n");
    assert_eq!(tokens[1].value, "say \"hi\"");
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("x // the rest is ignored\ny"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_token_positions() {
    let tokens = tokenize("ab := 1;".to_string(), None).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 2);
    assert_eq!(tokens[1].span.start.0, 3);
    assert_eq!(tokens[2].span.start.0, 6);
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("x := 1 @ 2;".to_string(), None).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 7);
}
