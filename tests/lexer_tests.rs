// tests/lexer_tests.rs

use bizspec::ast::{Position, Token, TokenKind};
use bizspec::lexer::{Lexer, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn lexemes(input: &str) -> Vec<String> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.lexeme)
        .collect()
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        (",", TokenKind::Comma),
        (".", TokenKind::Dot),
        ("=", TokenKind::Eq),
        (">", TokenKind::Gt),
        ("<", TokenKind::Lt),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.lexeme, input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("==", TokenKind::EqEq),
        ("!=", TokenKind::NotEq),
        ("<=", TokenKind::LtEq),
        (">=", TokenKind::GtEq),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    assert_eq!(
        kinds("< =="),
        vec![TokenKind::Lt, TokenKind::EqEq, TokenKind::Eof]
    );
    assert_eq!(
        kinds("= ="),
        vec![TokenKind::Eq, TokenKind::Eq, TokenKind::Eof]
    );
    assert_eq!(
        kinds(">=="),
        vec![TokenKind::GtEq, TokenKind::Eq, TokenKind::Eof]
    );
}

#[test]
fn test_lone_bang_is_invalid() {
    let result = tokenize("a ! b");
    let err = result.unwrap_err();
    assert_eq!(err.position, Position::new(1, 3));
    assert!(err.to_string().contains("'='"));
}

#[test]
fn test_two_char_token_column_is_its_start() {
    let tokens = tokenize("a >= 1").unwrap();
    assert_eq!(tokens[1].position, Position::new(1, 3));
    assert_eq!(tokens[2].position, Position::new(1, 6));
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords_are_case_insensitive() {
    let tokens = tokenize("Rule TEST wHeN Undefined").unwrap();
    let got: Vec<(TokenKind, &str)> = tokens
        .iter()
        .map(|t| (t.kind, t.lexeme.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (TokenKind::Rule, "Rule"),
            (TokenKind::Test, "TEST"),
            (TokenKind::When, "wHeN"),
            (TokenKind::Undefined, "Undefined"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn test_keywords_vs_identifiers() {
    assert_eq!(
        kinds("rules tester _when and_or"),
        vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_unicode_identifiers() {
    let tokens = tokenize("envío_año").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].lexeme, "envío_año");
}

// ============================================================================
// Rule Line
// ============================================================================

#[test]
fn test_rule_line() {
    let tokens = tokenize(r#"rule "X" when a >= 1 then b = 2"#).unwrap();
    let got: Vec<(TokenKind, &str)> = tokens
        .iter()
        .map(|t| (t.kind, t.lexeme.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (TokenKind::Rule, "rule"),
            (TokenKind::String, "X"),
            (TokenKind::When, "when"),
            (TokenKind::Identifier, "a"),
            (TokenKind::GtEq, ">="),
            (TokenKind::Number, "1"),
            (TokenKind::Then, "then"),
            (TokenKind::Identifier, "b"),
            (TokenKind::Eq, "="),
            (TokenKind::Number, "2"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn test_always_ends_with_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("   \t\r"), vec![TokenKind::Eof]);
    assert_eq!(kinds("# only a comment"), vec![TokenKind::Eof]);
}

// ============================================================================
// Newlines and Comments
// ============================================================================

#[test]
fn test_newlines_are_tokens() {
    assert_eq!(
        kinds("a\nb\r\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = tokenize("a\n  bb\n   c").unwrap();
    let positions: Vec<Position> = tokens
        .iter()
        .filter(|t| t.is(TokenKind::Identifier))
        .map(|t| t.position)
        .collect();
    assert_eq!(
        positions,
        vec![Position::new(1, 1), Position::new(2, 3), Position::new(3, 4)]
    );
}

#[test]
fn test_hash_comment() {
    assert_eq!(
        kinds("a # comment == \"x\nb"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_slash_slash_comment() {
    assert_eq!(
        kinds("// header\nx = 1 // trailing"),
        vec![
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Eq,
            TokenKind::Number,
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(lexemes("42 3.14 0.5"), vec!["42", "3.14", "0.5", ""]);
}

#[test]
fn test_dot_needs_digit_after_it() {
    assert_eq!(
        kinds("3."),
        vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
    );
    assert_eq!(lexemes("1.2.3"), vec!["1.2", ".", "3", ""]);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r#""a\"b\\c\nd\te\rf""#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme, "a\"b\\c\nd\te\rf");
}

#[test]
fn test_unknown_escape_passes_through() {
    let tokens = tokenize(r#""\q\$""#).unwrap();
    assert_eq!(tokens[0].lexeme, "q$");
}

#[test]
fn test_string_position_is_opening_quote() {
    let tokens = tokenize(r#"x == "USA""#).unwrap();
    assert_eq!(tokens[2].position, Position::new(1, 6));
}

#[test]
fn test_unterminated_string_at_newline() {
    let err = tokenize("x = \"abc\ny").unwrap_err();
    assert_eq!(err.position, Position::new(1, 5));
    assert!(err.message.contains("Unterminated"));
}

#[test]
fn test_unterminated_string_at_eof() {
    assert!(tokenize("\"abc").is_err());
    assert!(tokenize("\"abc\\").is_err());
}

#[test]
fn test_source_text_round_trips_strings() {
    let tokens = tokenize(r#""say \"hi\"\n""#).unwrap();
    let text = tokens[0].source_text();
    let again = tokenize(&text).unwrap();
    assert_eq!(again[0].lexeme, tokens[0].lexeme);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unrecognized_character() {
    let err = tokenize("total > 5 $").unwrap_err();
    assert_eq!(err.position, Position::new(1, 11));
    assert_eq!(err.to_string(), "[L1 C11] Unrecognized character '$'");
}

#[test]
fn test_token_display() {
    let token = Token::new(TokenKind::Identifier, "total", Position::new(2, 4));
    assert_eq!(token.to_string(), "IDENT('total')@2:4");
}
