use std::fmt;

use crate::{
    ast::{BinOp, UnaryOp},
    environment::FieldPath,
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Condition, value, `given` and `expect` spans are compiled into this form
/// once and then walked by the evaluator for every test.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "USA"
    /// true
    /// null
    /// ```
    Literal(Value),

    /// Dotted field reference, resolved against the test environment
    ///
    /// # Examples
    /// ```text
    /// envio
    /// carrito.total
    /// ```
    Path(FieldPath),

    /// Prefix operation (`not x`, `-x`)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

/// Fully parenthesized rendering, mostly useful in logs and test failures.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write!(f, "{:?}", s),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Path(path) => write!(f, "{}", path),
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "(not {})", operand),
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "(-{})", operand),
            Expr::BinaryOp { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}
