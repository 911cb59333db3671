//! # BizSpec - Abstract Syntax Tree
//!
//! This module defines the syntax tree of BizSpec, a small line-oriented
//! language for business rules (condition → field assignment) and the test
//! cases that exercise them.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - The program tree built by the structural parser
//! - **[program]** - `Rule` / `TestCase` views over the program tree
//! - **[expressions]** - Expression nodes compiled from condition and value spans
//! - **[operators]** - Binary and prefix operators
//!
//! ## Quick Start
//!
//! ```text
//! # Shipping rules
//! rule "Free shipping" when cart.total >= 100000 then shipping = 0
//! rule "Base shipping" when shipping == null then shipping = 9900
//!
//! test "Order 123" {
//!   given cart.total = 120000
//!   expect shipping == 0
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Two-stage parsing
//!
//! The structural parser keeps condition, value, `given` and `expect` bodies
//! as text spans. Those spans are compiled into [`Expr`] trees on first use
//! and cached by the evaluator.
//!
//! ### Rule precedence
//!
//! Rules are global and apply to every test in source order. The first rule
//! whose condition holds wins its target; later rules for the same target
//! are skipped.
//!
//! ### Missing fields
//!
//! A path that does not resolve (`order.customer.tier` before anything set it)
//! evaluates to `null`, it is never an error.
pub mod expressions;
pub mod nodes;
pub mod operators;
pub mod program;
pub mod tokens;

pub use expressions::Expr;
pub use nodes::{Node, NodeKind};
pub use operators::{BinOp, UnaryOp};
pub use program::{Clause, Rule, TestCase};
pub use tokens::{Position, Token, TokenKind};
