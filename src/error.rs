use std::fmt;

use crate::{evaluator::EvalError, lexer::LexError, parser::ParseError};

/// Any of the three fatal pipeline errors.
///
/// Each aborts the operation that raised it; the `Display` form is the
/// single message a host shows in its status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Unrecognized character, unterminated string or a lone `!`
    Lex(LexError),
    /// Grammar violation in the program structure
    Parse(ParseError),
    /// Malformed condition, value, `given` or `expect` expression
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "Lex error: {}", e),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Eval(e) => write!(f, "Evaluation error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Eval(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}
