//! # BizSpec
//!
//! Tokenizer, parser and test runner for BizSpec, a small language of
//! business rules (`rule "..." when <condition> then <field> = <value>`)
//! and the test cases that check them.
//!
//! ```
//! let source = r#"
//! rule "Free shipping" when cart.total >= 100000 then shipping = 0
//! rule "Base shipping" when shipping == null then shipping = 9900
//!
//! test "Big order" {
//!   given cart.total = 120000
//!   expect shipping == 0
//! }
//! "#;
//!
//! let report = bizspec::run_source(source, bizspec::RunOptions::default()).unwrap();
//! assert!(report.all_passed());
//! ```

pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod runner;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Expr, Node, NodeKind, Position, Rule, TestCase, Token, TokenKind};
pub use environment::{Environment, FieldPath};
pub use error::Error;
pub use evaluator::{EvalError, Evaluator, ExprCache, compile, evaluate};
pub use lexer::{LexError, Lexer, tokenize};
pub use parser::{ParseError, Parser};
pub use runner::{RunOptions, RunReport, Runner, TestReport};
pub use value::Value;

/// Tokenizes source text.
pub fn tokenize_source(source: &str) -> Result<Vec<Token>, Error> {
    Ok(tokenize(source)?)
}

/// Tokenizes and parses source text into a program tree.
pub fn parse_source(source: &str) -> Result<Node, Error> {
    let tokens = tokenize(source)?;
    Ok(Parser::new(tokens).parse_program()?)
}

/// Tokenizes, parses and runs every test of a source text.
///
/// Running the same source twice yields identical reports.
pub fn run_source(source: &str, options: RunOptions) -> Result<RunReport, Error> {
    let program = parse_source(source)?;
    Ok(Runner::new(options).run(&program)?)
}
