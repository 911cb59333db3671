use std::fmt;

use tracing::trace;

use crate::ast::{Position, Token, TokenKind};

/// A character sequence the lexer cannot turn into a token.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    fn new(position: Position, message: impl Into<String>) -> Self {
        LexError {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[L{} C{}] {}",
            self.position.line, self.position.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Turns source text into tokens, one `next_token` call at a time.
///
/// Newlines are significant and come out as `Newline` tokens; `#` and `//`
/// start comments that run to the end of the line.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' | '\t' | '\r' => self.advance(),
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skips blanks and comments; the terminating newline is left in place.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            match (self.current_char(), self.peek_char(1)) {
                (Some('#'), _) | (Some('/'), Some('/')) => self.skip_line(),
                _ => break,
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\n' => break,
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        // Covers `\"` and `\\`; unknown escapes pass the character through
                        Some(ch) => result.push(ch),
                        None => {
                            return Err(LexError::new(
                                self.here(),
                                "Dangling escape at end of input",
                            ));
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new(start, "Unterminated string literal"))
    }

    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
    }

    fn single(&mut self, kind: TokenKind, lexeme: &str, start: Position) -> Token {
        self.advance();
        Token::new(kind, lexeme, start)
    }

    /// Picks the two-character form when `second` follows, the one-character form otherwise.
    fn one_or_two(
        &mut self,
        second: char,
        double: (TokenKind, &str),
        single: (TokenKind, &str),
        start: Position,
    ) -> Token {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            Token::new(double.0, double.1, start)
        } else {
            self.advance();
            Token::new(single.0, single.1, start)
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.here();

        let token = match self.current_char() {
            None => Token::new(TokenKind::Eof, "", start),
            Some('\n') => self.single(TokenKind::Newline, "\n", start),
            Some('{') => self.single(TokenKind::LBrace, "{", start),
            Some('}') => self.single(TokenKind::RBrace, "}", start),
            Some('(') => self.single(TokenKind::LParen, "(", start),
            Some(')') => self.single(TokenKind::RParen, ")", start),
            Some(',') => self.single(TokenKind::Comma, ",", start),
            Some('.') => self.single(TokenKind::Dot, ".", start),
            Some('+') => self.single(TokenKind::Plus, "+", start),
            Some('-') => self.single(TokenKind::Minus, "-", start),
            Some('*') => self.single(TokenKind::Star, "*", start),
            Some('/') => self.single(TokenKind::Slash, "/", start),
            Some('=') => self.one_or_two(
                '=',
                (TokenKind::EqEq, "=="),
                (TokenKind::Eq, "="),
                start,
            ),
            Some('>') => self.one_or_two(
                '=',
                (TokenKind::GtEq, ">="),
                (TokenKind::Gt, ">"),
                start,
            ),
            Some('<') => self.one_or_two(
                '=',
                (TokenKind::LtEq, "<="),
                (TokenKind::Lt, "<"),
                start,
            ),
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::NotEq, "!=", start)
                } else {
                    return Err(LexError::new(start, "Expected '=' after '!'"));
                }
            }
            Some('"') => {
                let contents = self.read_string()?;
                Token::new(TokenKind::String, contents, start)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                let kind =
                    TokenKind::keyword(&ident.to_lowercase()).unwrap_or(TokenKind::Identifier);
                Token::new(kind, ident, start)
            }
            Some(ch) if ch.is_ascii_digit() => {
                let number = self.read_number();
                Token::new(TokenKind::Number, number, start)
            }
            Some(ch) => {
                return Err(LexError::new(
                    start,
                    format!("Unrecognized character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    /// Lexes the remaining input; the result always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        trace!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }
}

/// Tokenizes a complete source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("rule test when then given expect and or not true false null undefined"),
        vec![
            TokenKind::Rule,
            TokenKind::Test,
            TokenKind::When,
            TokenKind::Then,
            TokenKind::Given,
            TokenKind::Expect,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Undefined,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_keep_casing() {
    let tokens = tokenize("RULE When").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Rule);
    assert_eq!(tokens[0].lexeme, "RULE");
    assert_eq!(tokens[1].kind, TokenKind::When);
    assert_eq!(tokens[1].lexeme, "When");
}

#[test]
fn test_trailing_dot_is_not_decimal() {
    let tokens = tokenize("1.x").unwrap();
    assert_eq!(tokens[0].lexeme, "1");
    assert_eq!(tokens[1].kind, TokenKind::Dot);
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_slash_vs_comment() {
    assert_eq!(
        kinds("a / b // trailing"),
        vec![
            TokenKind::Identifier,
            TokenKind::Slash,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}
