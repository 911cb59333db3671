use std::fmt;

/// A 1-based line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// The position of the first character of a source text.
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Symbols
    /// Left brace, opens a test block
    LBrace,
    /// Right brace, closes a test block
    RBrace,
    /// Left parenthesis for grouping
    LParen,
    /// Right parenthesis
    RParen,
    /// Comma separating `given` assignments
    Comma,
    /// Dot separating path segments
    Dot,

    // Operators
    /// Assignment (`=`), only meaningful after `then` and inside `given`
    Eq,
    /// Equality operator (`==`)
    EqEq,
    /// Inequality operator (`!=`)
    NotEq,
    /// Greater than or equal (`>=`)
    GtEq,
    /// Less than or equal (`<=`)
    LtEq,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Addition
    Plus,
    /// Subtraction or unary negation
    Minus,
    /// Multiplication
    Star,
    /// Division
    Slash,

    // Literals and names
    /// Integer or decimal literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// Double-quoted string literal. The lexeme holds the unescaped contents.
    String,

    /// Field name or path segment
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or underscores.
    Identifier,

    // Keywords (matched case-insensitively)
    Rule,
    Test,
    When,
    Then,
    Given,
    Expect,
    /// Logical AND (word, not symbol)
    And,
    /// Logical OR (word, not symbol)
    Or,
    /// Logical negation (word, not symbol)
    Not,
    True,
    False,
    Null,
    /// Synonym for `null`
    Undefined,

    // Structure
    /// Line break, the statement separator
    Newline,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Maps a lowercased identifier onto its keyword kind, if it is one.
    pub fn keyword(lowercase: &str) -> Option<TokenKind> {
        let kind = match lowercase {
            "rule" => TokenKind::Rule,
            "test" => TokenKind::Test,
            "when" => TokenKind::When,
            "then" => TokenKind::Then,
            "given" => TokenKind::Given,
            "expect" => TokenKind::Expect,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => return None,
        };
        Some(kind)
    }

    /// The upper-case display name used in token tables and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Eq => "EQ",
            TokenKind::EqEq => "EQEQ",
            TokenKind::NotEq => "NE",
            TokenKind::GtEq => "GE",
            TokenKind::LtEq => "LE",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Identifier => "IDENT",
            TokenKind::Rule => "RULE",
            TokenKind::Test => "TEST",
            TokenKind::When => "WHEN",
            TokenKind::Then => "THEN",
            TokenKind::Given => "GIVEN",
            TokenKind::Expect => "EXPECT",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::Undefined => "UNDEFINED",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token: its kind, the text it was read from and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Original text of the token. For strings this is the unescaped contents
    /// without the surrounding quotes; keywords keep their source casing.
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Source-like spelling of the token, re-quoting and re-escaping strings
    /// so the result lexes back to the same token.
    pub fn source_text(&self) -> String {
        match self.kind {
            TokenKind::String => {
                let mut quoted = String::with_capacity(self.lexeme.len() + 2);
                quoted.push('"');
                for ch in self.lexeme.chars() {
                    match ch {
                        '"' => quoted.push_str("\\\""),
                        '\\' => quoted.push_str("\\\\"),
                        '\n' => quoted.push_str("\\n"),
                        '\t' => quoted.push_str("\\t"),
                        '\r' => quoted.push_str("\\r"),
                        c => quoted.push(c),
                    }
                }
                quoted.push('"');
                quoted
            }
            _ => self.lexeme.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "{}@{}", self.kind, self.position),
            _ => write!(f, "{}('{}')@{}", self.kind, self.lexeme, self.position),
        }
    }
}
