use std::{cmp::Ordering, fmt, sync::OnceLock};

use regex::Regex;

use crate::environment::Environment;

/// A dynamically typed BizSpec value.
///
/// Expressions never fail on type mismatches: every operator coerces its
/// operands through the total functions defined here ([`Value::is_truthy`],
/// [`Value::to_number`], [`Value::compare`]).
///
/// # Examples
///
/// ```
/// use bizspec::Value;
///
/// assert!(!Value::Null.is_truthy());
/// assert_eq!(Value::String("12.5".into()).to_number(), 12.5);
/// assert_eq!(Value::String("twelve".into()).to_number(), 0.0);
/// assert_eq!(Value::Boolean(true).to_number(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value; also what unresolved paths evaluate to
    Null,

    Boolean(bool),

    /// Floating-point number
    Number(Number),

    String(String),

    /// Nested fields, reached through dotted paths
    Mapping(Environment),
}

/// A floating-point number that remembers whether it was written as an
/// integer literal.
///
/// The flag only affects rendering (`120000` vs `9900.0`); equality and
/// arithmetic look at the value alone. Equality is by bit pattern: NaN equals
/// NaN and `-0.0` differs from `0.0`, matching the ordering of [`Value::compare`].
#[derive(Debug, Clone, Copy)]
pub struct Number {
    value: f64,
    integer_literal: bool,
}

impl Number {
    /// A number produced by arithmetic or coercion.
    pub fn new(value: f64) -> Self {
        Number {
            value,
            integer_literal: false,
        }
    }

    /// Reads a `NUMBER` token lexeme (`42`, `3.14`).
    pub fn from_literal(lexeme: &str) -> Option<Self> {
        let value = lexeme.parse::<f64>().ok()?;
        Some(Number {
            value,
            integer_literal: !lexeme.contains('.'),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_integer_literal(&self) -> bool {
        self.integer_literal
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        (self.value.is_nan() && other.value.is_nan())
            || self.value.to_bits() == other.value.to_bits()
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::new(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.integer_literal && self.value.is_finite() {
            write!(f, "{}", self.value)
        } else {
            f.write_str(&format_double(self.value))
        }
    }
}

/// Classic double rendering: always a fractional part, scientific notation
/// outside `[1e-3, 1e7)`.
fn format_double(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = n.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let s = n.to_string();
        if s.contains('.') { s } else { format!("{}.0", s) }
    } else {
        let s = format!("{:E}", n);
        match s.split_once('E') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => {
                format!("{}.0E{}", mantissa, exponent)
            }
            _ => s,
        }
    }
}

fn float_literal() -> &'static Regex {
    static FLOAT_LITERAL: OnceLock<Regex> = OnceLock::new();
    FLOAT_LITERAL.get_or_init(|| {
        Regex::new(r"^[+-]?(?:NaN|Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?[fFdD]?)$")
            .expect("float literal pattern is valid")
    })
}

/// Parses a string the way a classic floating literal reader would:
/// surrounding blanks ignored, optional exponent and `d`/`f` suffix,
/// `NaN` and `Infinity` accepted.
pub fn parse_float_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim_matches(|c: char| c <= ' ');
    if !float_literal().is_match(trimmed) {
        return None;
    }
    let digits = trimmed.trim_end_matches(['f', 'F', 'd', 'D']);
    digits.parse::<f64>().ok()
}

/// Orders two floats with NaN above everything and `-0.0` below `0.0`.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Orders strings by UTF-16 code unit; differs from `str::cmp` only above U+FFFF.
fn compare_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

impl Value {
    pub fn number(value: f64) -> Self {
        Value::Number(Number::new(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// Check if the value is truthy (for conditions and expects)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => n.value() != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Mapping(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and unary minus.
    ///
    /// Strings that are not float literals become `0.0`; mappings too.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => n.value(),
            Value::String(s) => parse_float_literal(s).unwrap_or(0.0),
            Value::Mapping(_) => 0.0,
        }
    }

    /// Three-way comparison behind `<`, `>`, `<=` and `>=`.
    ///
    /// Null sorts below everything else. If either side is a number both are
    /// compared numerically, two strings compare by UTF-16 code units, and any
    /// other pairing falls back to comparing the rendered text the same way.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Number(_), _) | (_, Value::Number(_)) => {
                compare_numbers(self.to_number(), other.to_number())
            }
            (Value::String(a), Value::String(b)) => compare_utf16(a, b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => compare_utf16(&self.to_string(), &other.to_string()),
        }
    }

    pub fn as_mapping(&self) -> Option<&Environment> {
        match self {
            Value::Mapping(env) => Some(env),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Mapping(env) => write!(f, "{}", env),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
