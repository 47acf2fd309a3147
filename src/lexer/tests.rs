#[cfg(test)]
use super::*;

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input, None);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token().expect("Failed to get token");
        if tok == Token::Eof {
            break;
        }
        out.push(tok);
    }
    out
}

#[test]
fn test_full_setting_example() {
    let input = r#"
# server settings
general :
{
  port = 8080;
  access_allow = true;
  users = [ "alice", "bob" ];
};
"#;

    let expected_tokens = vec![
        Token::Name("general".into()),
        Token::Colon,
        Token::LBrace,
        Token::Name("port".into()),
        Token::Equals,
        Token::Integer(8080, Format::Default),
        Token::Semicolon,
        Token::Name("access_allow".into()),
        Token::Equals,
        Token::Bool(true),
        Token::Semicolon,
        Token::Name("users".into()),
        Token::Equals,
        Token::LBracket,
        Token::String("alice".into()),
        Token::Comma,
        Token::String("bob".into()),
        Token::RBracket,
        Token::Semicolon,
        Token::RBrace,
        Token::Semicolon,
    ];

    assert_eq!(tokens(input), expected_tokens);
}

#[test]
fn test_comment_styles() {
    let input = "a = 1; // trailing\n/* block\n spanning */ b = 2; # hash\n";
    assert_eq!(
        tokens(input),
        vec![
            Token::Name("a".into()),
            Token::Equals,
            Token::Integer(1, Format::Default),
            Token::Semicolon,
            Token::Name("b".into()),
            Token::Equals,
            Token::Integer(2, Format::Default),
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let mut lexer = Lexer::new("a = 1;\n/* never closed", Some("app.cfg"));
    for _ in 0..4 {
        lexer.next_token().unwrap();
    }
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err, ArborError::parse(Some("app.cfg"), 2, "unterminated block comment"));
}

#[test]
fn test_integer_forms() {
    assert_eq!(
        tokens("1 -42 0x1F 0xFFFFFFFF 100L 0x10L 5000000000"),
        vec![
            Token::Integer(1, Format::Default),
            Token::Integer(-42, Format::Default),
            Token::Integer(31, Format::Hex),
            Token::Integer(-1, Format::Hex),
            Token::Integer64(100, Format::Default),
            Token::Integer64(16, Format::Hex),
            Token::Integer64(5_000_000_000, Format::Default),
        ]
    );
}

#[test]
fn test_float_forms() {
    assert_eq!(
        tokens("1.5 .25 -2.5e-3 1e3 7."),
        vec![
            Token::Float(1.5),
            Token::Float(0.25),
            Token::Float(-0.0025),
            Token::Float(1000.0),
            Token::Float(7.0),
        ]
    );
}

#[test]
fn test_invalid_number() {
    let mut lexer = Lexer::new("12abc", None);
    assert!(matches!(lexer.next_token(), Err(ArborError::ParseFailure { .. })));
}

#[test]
fn test_overflowing_float_is_rejected() {
    let mut lexer = Lexer::new("ratio = 1e999;", None);
    assert_eq!(lexer.next_token().unwrap(), Token::Name("ratio".into()));
    assert_eq!(lexer.next_token().unwrap(), Token::Equals);
    assert!(matches!(lexer.next_token(), Err(ArborError::ParseFailure { line: 1, .. })));
}

#[test]
fn test_bool_case_insensitive_and_names() {
    assert_eq!(
        tokens("TRUE False foo-bar *wild qux_123"),
        vec![
            Token::Bool(true),
            Token::Bool(false),
            Token::Name("foo-bar".into()),
            Token::Name("*wild".into()),
            Token::Name("qux_123".into()),
        ]
    );
}

#[test]
fn test_string_escapes() {
    let input = r#""line\n\ttab \"q\" \\ \x41""#;
    assert_eq!(tokens(input), vec![Token::String("line\n\ttab \"q\" \\ A".into())]);
}

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new("name = \"open", None);
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert!(err.to_string().contains("unterminated string"));
}

#[test]
fn test_include_directive_and_token_lines() {
    let mut lexer = Lexer::new("\n\n@include \"extra.cfg\"\n", None);
    assert_eq!(lexer.next_token(), Ok(Token::Include));
    assert_eq!(lexer.token_line(), 3);
    assert_eq!(lexer.next_token(), Ok(Token::String("extra.cfg".into())));

    let mut bad = Lexer::new("@import", None);
    assert!(bad.next_token().is_err());
}

#[test]
fn test_unexpected_character() {
    let mut lexer = Lexer::new("a = $", None);
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert!(err.to_string().contains("unexpected character '$'"));
}
