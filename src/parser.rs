use std::fmt;

use crate::{
    ast::{BinOp, Expr, Node, NodeKind, Position, Token, TokenKind, UnaryOp},
    environment::FieldPath,
    value::{Number, Value},
};

/// A grammar violation: what was expected and the token found instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub expected: String,
    pub found: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[L{} C{}] expected {}, found {}",
            self.position.line, self.position.column, self.expected, self.found
        )?;
        match self.found {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            _ => write!(f, " '{}'", self.lexeme),
        }
    }
}

impl std::error::Error for ParseError {}

/// Recursive-descent parser over a token sequence.
///
/// [`Parser::parse_program`] reads the structural grammar (rules and test
/// blocks) and keeps expression bodies as text; [`Parser::parse`] reads a
/// standalone expression. A sequence without a trailing `Eof` gets one.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let end = tokens
                .last()
                .map(|t| {
                    let width = t.source_text().chars().count().max(1);
                    Position::new(t.position.line, t.position.column + width)
                })
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", end));
        }
        Parser { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        // The trailing Eof is never consumed past
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is(TokenKind::Eof) {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    pub fn consume_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError {
            expected: expected.to_string(),
            found: token.kind,
            lexeme: token.lexeme.clone(),
            position: token.position,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if !self.check(kind) {
            return Err(self.error(expected));
        }
        Ok(self.advance())
    }

    fn skip_newlines(&mut self) {
        while self.consume_if(TokenKind::Newline) {}
    }

    /// Fails unless all tokens have been consumed.
    pub fn expect_end(&mut self, expected: &str) -> Result<(), ParseError> {
        self.expect(TokenKind::Eof, expected).map(|_| ())
    }
}

// Structural grammar
impl Parser {
    /// ```text
    /// Program := (NEWLINE* (Rule | Test))* EOF
    /// ```
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let mut program = Node::new(NodeKind::Program, "", self.current().position);

        loop {
            self.skip_newlines();
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Rule => program.push(self.parse_rule()?),
                TokenKind::Test => program.push(self.parse_test()?),
                _ => return Err(self.error("'rule' or 'test'")),
            }
        }

        self.expect(TokenKind::Eof, "end of input")?;
        Ok(program)
    }

    /// ```text
    /// Rule := "rule" STRING "when" <span> "then" PATH "=" <span> NEWLINE?
    /// ```
    fn parse_rule(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Rule, "'rule'")?.position;
        let name = self.expect(TokenKind::String, "rule name string")?;
        let when = self.expect(TokenKind::When, "'when'")?;
        let (condition, condition_at) = self.read_span(|kind| kind == TokenKind::Then);
        let then = self.expect(TokenKind::Then, "'then'")?;
        let target = self.parse_target()?;
        let assign = self.expect(TokenKind::Eq, "'='")?;
        let (value, value_at) = self.read_span(|_| false);
        self.consume_if(TokenKind::Newline);

        let set = Node::new(NodeKind::Set, "", then.position)
            .with_child(target)
            .with_child(Node::new(
                NodeKind::Value,
                value,
                value_at.unwrap_or(assign.position),
            ));

        Ok(Node::new(NodeKind::Rule, name.lexeme, start)
            .with_child(Node::new(
                NodeKind::When,
                condition,
                condition_at.unwrap_or(when.position),
            ))
            .with_child(set))
    }

    /// Rule target: `IDENT ("." IDENT)*`.
    fn parse_target(&mut self) -> Result<Node, ParseError> {
        let first = self.expect(TokenKind::Identifier, "target field name")?;
        let mut path = first.lexeme;
        while self.consume_if(TokenKind::Dot) {
            let segment = self.expect(TokenKind::Identifier, "field name after '.'")?;
            path.push('.');
            path.push_str(&segment.lexeme);
        }
        Ok(Node::new(NodeKind::Target, path, first.position))
    }

    /// ```text
    /// Test := "test" STRING "{" NEWLINE* (Given | Expect | NEWLINE)* "}" NEWLINE?
    /// ```
    fn parse_test(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Test, "'test'")?.position;
        let name = self.expect(TokenKind::String, "test name string")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();

        let mut test = Node::new(NodeKind::Test, name.lexeme, start);
        loop {
            match self.current().kind {
                TokenKind::RBrace => break,
                TokenKind::Given => test.push(self.parse_clause(NodeKind::Given)),
                TokenKind::Expect => test.push(self.parse_clause(NodeKind::Expect)),
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => return Err(self.error("'}'")),
                _ => return Err(self.error("'given', 'expect' or '}'")),
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        self.consume_if(TokenKind::Newline);
        Ok(test)
    }

    /// `given ...` or `expect ...` up to the end of the line.
    fn parse_clause(&mut self, kind: NodeKind) -> Node {
        let keyword = self.advance();
        let (text, _) = self.read_span(|_| false);
        self.consume_if(TokenKind::Newline);
        Node::new(kind, text, keyword.position)
    }

    /// Collects tokens up to (not including) a stop token, a newline or the
    /// end of input, as space-joined re-lexable text plus the first token's
    /// position.
    fn read_span(&mut self, stop: impl Fn(TokenKind) -> bool) -> (String, Option<Position>) {
        let mut parts = Vec::new();
        let mut first = None;
        while !matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof)
            && !stop(self.current().kind)
        {
            let token = self.advance();
            first.get_or_insert(token.position);
            parts.push(token.source_text());
        }
        (parts.join(" "), first)
    }
}

// Expression grammar
impl Parser {
    /// Parses a complete expression; anything left over is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect_end("end of expression")?;
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// or := and (OR and)*
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.consume_if(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    /// and := cmp (AND cmp)*
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        while self.consume_if(TokenKind::And) {
            let right = self.parse_comparison()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    /// cmp := add ((== | != | >= | <= | > | <) add)*
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinOp::Equal,
                TokenKind::NotEq => BinOp::NotEqual,
                TokenKind::GtEq => BinOp::GreaterEqual,
                TokenKind::LtEq => BinOp::LessEqual,
                TokenKind::Gt => BinOp::GreaterThan,
                TokenKind::Lt => BinOp::LessThan,
                _ => break,
            };

            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// unary := NOT unary | MINUS unary | primary
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.consume_if(TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        if self.consume_if(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(UnaryOp::Negate, operand));
        }
        self.parse_primary()
    }

    /// Literals, parenthesized expressions and dotted paths
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Number => {
                let token = self.advance();
                let number = Number::from_literal(&token.lexeme).ok_or_else(|| ParseError {
                    expected: "number literal".to_string(),
                    found: token.kind,
                    lexeme: token.lexeme.clone(),
                    position: token.position,
                })?;
                Ok(Expr::Literal(Value::Number(number)))
            }
            TokenKind::String => Ok(Expr::Literal(Value::String(self.advance().lexeme))),
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Value::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Value::Boolean(false)))
            }
            TokenKind::Null | TokenKind::Undefined => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Identifier => Ok(Expr::Path(self.parse_path()?)),
            _ => Err(self.error("expression")),
        }
    }

    /// Reads `IDENT ("." IDENT)*` into a field path.
    pub fn parse_path(&mut self) -> Result<FieldPath, ParseError> {
        let mut segments = vec![self.expect(TokenKind::Identifier, "field name")?.lexeme];
        while self.consume_if(TokenKind::Dot) {
            segments.push(
                self.expect(TokenKind::Identifier, "field name after '.'")?
                    .lexeme,
            );
        }
        FieldPath::from_segments(segments).ok_or_else(|| self.error("field path"))
    }
}
