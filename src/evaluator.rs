use std::{collections::HashMap, fmt};

use tracing::{debug, warn};

use crate::{
    ast::{BinOp, Expr, Position, Token, TokenKind, UnaryOp},
    environment::{Environment, FieldPath},
    lexer::{LexError, tokenize},
    parser::{ParseError, Parser},
    value::Value,
};

/// A malformed expression found while compiling a condition, value,
/// `given` or `expect` span.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
    /// The offending expression text.
    pub expression: String,
    /// Where the problem is, relative to the expression text.
    pub position: Position,
    /// Source location of the line the expression belongs to, when known.
    pub origin: Option<Position>,
}

impl EvalError {
    pub fn new(
        message: impl Into<String>,
        expression: impl Into<String>,
        position: Position,
    ) -> Self {
        EvalError {
            message: message.into(),
            expression: expression.into(),
            position,
            origin: None,
        }
    }

    fn syntax(expression: &str, error: ParseError) -> Self {
        let found = match error.found {
            TokenKind::Eof => "end of expression".to_string(),
            kind => format!("{} '{}'", kind, error.lexeme),
        };
        EvalError {
            message: format!("expected {}, found {}", error.expected, found),
            expression: expression.to_string(),
            position: error.position,
            origin: None,
        }
    }

    fn lexical(expression: &str, error: LexError) -> Self {
        EvalError {
            message: error.message,
            expression: expression.to_string(),
            position: error.position,
            origin: None,
        }
    }

    /// Attaches the source location of the owning line, keeping an existing one.
    pub fn at(mut self, origin: Position) -> Self {
        self.origin.get_or_insert(origin);
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = self.origin {
            write!(f, "[L{} C{}] ", origin.line, origin.column)?;
        }
        write!(
            f,
            "invalid expression '{}': {} (column {})",
            self.expression, self.message, self.position.column
        )
    }
}

impl std::error::Error for EvalError {}

/// Tokens of an expression text, newlines dropped.
fn expression_tokens(text: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = tokenize(text).map_err(|e| EvalError::lexical(text, e))?;
    tokens.retain(|t| !t.is(TokenKind::Newline));
    Ok(tokens)
}

/// Compiles expression text into an [`Expr`] using the canonical lexer and parser.
///
/// # Examples
///
/// ```
/// use bizspec::evaluator::compile;
///
/// let expr = compile("cart.total >= 100000").unwrap();
/// assert_eq!(expr.to_string(), "(cart.total >= 100000)");
/// assert!(compile("(1 + 2").is_err());
/// ```
pub fn compile(text: &str) -> Result<Expr, EvalError> {
    let tokens = expression_tokens(text)?;
    Parser::new(tokens)
        .parse()
        .map_err(|e| EvalError::syntax(text, e))
}

/// Compiles and evaluates an expression against an environment.
///
/// Unresolved paths evaluate to `null`; only malformed syntax is an error.
///
/// # Examples
///
/// ```
/// use bizspec::{evaluate, Environment, FieldPath, Value};
///
/// let mut env = Environment::new();
/// env.set(&FieldPath::parse("cart.total").unwrap(), Value::number(120000.0));
///
/// assert_eq!(evaluate("cart.total >= 100000", &env).unwrap(), Value::Boolean(true));
/// assert_eq!(evaluate("foo.bar == null", &env).unwrap(), Value::Boolean(true));
/// ```
pub fn evaluate(text: &str, env: &Environment) -> Result<Value, EvalError> {
    let expr = compile(text)?;
    Ok(Evaluator::new(env).eval(&expr))
}

/// One `path = expression` item of a `given` line.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: FieldPath,
    pub value: Expr,
}

/// Splits a `given` line on top-level commas and compiles each
/// `path = expression` fragment.
///
/// Empty fragments are ignored. A fragment with no `=` anywhere (not even
/// inside `==`, `!=`, `<=` or `>=`) is skipped with a warning; one whose
/// first `=`-bearing operator is not a plain `=` is an error.
pub fn compile_assignments(text: &str) -> Result<Vec<Assignment>, EvalError> {
    let tokens = expression_tokens(text)?;
    let mut assignments = Vec::new();

    for fragment in split_top_level(&tokens, TokenKind::Comma) {
        if fragment.is_empty() {
            continue;
        }
        let Some(eq) = fragment.iter().position(|t| contains_equals(t.kind)) else {
            warn!(fragment = %join(fragment), "skipping given fragment without '='");
            continue;
        };
        let operator = &fragment[eq];
        if !operator.is(TokenKind::Eq) {
            return Err(EvalError::syntax(
                text,
                ParseError {
                    expected: "'='".to_string(),
                    found: operator.kind,
                    lexeme: operator.lexeme.clone(),
                    position: operator.position,
                },
            ));
        }

        let mut target = Parser::new(fragment[..eq].to_vec());
        let path = target
            .parse_path()
            .and_then(|path| target.expect_end("'='").map(|_| path))
            .map_err(|e| EvalError::syntax(text, e))?;

        // Keep the '=' so an empty right-hand side reports a position after it
        let mut value = Parser::new(fragment[eq..].to_vec());
        value.consume_if(TokenKind::Eq);
        let value = value.parse().map_err(|e| EvalError::syntax(text, e))?;

        assignments.push(Assignment { path, value });
    }

    Ok(assignments)
}

/// Operators spelled with an `=` character.
fn contains_equals(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eq | TokenKind::EqEq | TokenKind::NotEq | TokenKind::GtEq | TokenKind::LtEq
    )
}

/// Splits tokens on `separator` outside parentheses. The trailing `Eof` is dropped.
fn split_top_level(tokens: &[Token], separator: TokenKind) -> Vec<&[Token]> {
    let tokens = match tokens.last() {
        Some(last) if last.is(TokenKind::Eof) => &tokens[..tokens.len() - 1],
        _ => tokens,
    };

    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            kind if kind == separator && depth == 0 => {
                fragments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fragments.push(&tokens[start..]);
    fragments
}

fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::source_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Memo of compiled expressions and `given` lines, keyed by their text.
///
/// Each distinct span is lexed and parsed once per cache, however many tests
/// evaluate it.
#[derive(Debug, Default)]
pub struct ExprCache {
    expressions: HashMap<String, Expr>,
    assignments: HashMap<String, Vec<Assignment>>,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(&mut self, text: &str) -> Result<&Expr, EvalError> {
        if !self.expressions.contains_key(text) {
            let expr = compile(text)?;
            debug!(expression = text, compiled = %expr, "compiled expression");
            self.expressions.insert(text.to_string(), expr);
        }
        Ok(&self.expressions[text])
    }

    pub fn assignments(&mut self, text: &str) -> Result<&[Assignment], EvalError> {
        if !self.assignments.contains_key(text) {
            let compiled = compile_assignments(text)?;
            self.assignments.insert(text.to_string(), compiled);
        }
        Ok(&self.assignments[text])
    }

    pub fn len(&self) -> usize {
        self.expressions.len() + self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks compiled expressions against one environment.
///
/// Evaluation itself cannot fail: every operator coerces its operands.
pub struct Evaluator<'a> {
    env: &'a Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Evaluator { env }
    }

    pub fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(value) => value.clone(),
            Expr::Path(path) => self.env.get(path).clone(),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand);
                match op {
                    UnaryOp::Not => Value::Boolean(!value.is_truthy()),
                    UnaryOp::Negate => Value::number(-value.to_number()),
                }
            }
            Expr::BinaryOp { op, left, right } => {
                // Both sides are always evaluated, `and`/`or` included
                let left_val = self.eval(left);
                let right_val = self.eval(right);
                apply_binop(*op, &left_val, &right_val)
            }
        }
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Equal => Value::Boolean(left == right),
        BinOp::NotEqual => Value::Boolean(left != right),
        BinOp::GreaterThan => Value::Boolean(left.compare(right).is_gt()),
        BinOp::LessThan => Value::Boolean(left.compare(right).is_lt()),
        BinOp::GreaterEqual => Value::Boolean(left.compare(right).is_ge()),
        BinOp::LessEqual => Value::Boolean(left.compare(right).is_le()),
        BinOp::Add => Value::number(left.to_number() + right.to_number()),
        BinOp::Subtract => Value::number(left.to_number() - right.to_number()),
        BinOp::Multiply => Value::number(left.to_number() * right.to_number()),
        BinOp::Divide => Value::number(left.to_number() / right.to_number()),
        BinOp::And => Value::Boolean(left.is_truthy() && right.is_truthy()),
        BinOp::Or => Value::Boolean(left.is_truthy() || right.is_truthy()),
    }
}
