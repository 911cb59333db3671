//! Renderings handed to a host application: the flat token table, the
//! program tree and JSON documents for tokens, trees, values and reports.
//!
//! All output is deterministic: environments keep their keys sorted and
//! reports list tests, firings and expectations in source order.
//!
//! # Examples
//!
//! ```
//! use bizspec::output::token_rows;
//!
//! let tokens = bizspec::tokenize("expect total > 0").unwrap();
//! let rows = token_rows(&tokens);
//! assert_eq!(rows[0].kind, "EXPECT");
//! assert_eq!(rows[1].lexeme, "total");
//! assert_eq!(rows.last().unwrap().kind, "EOF");
//! ```

use serde_json::{Map, Number as JsonNumber, Value as Json, json};

use crate::{
    ast::{Node, Token, TokenKind},
    environment::Environment,
    runner::{RunReport, TestReport},
    value::Value,
};

/// One line of the token table.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRow {
    pub index: usize,
    pub kind: &'static str,
    /// Lexeme with control characters escaped for display.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

fn escape_lexeme(token: &Token) -> String {
    match token.kind {
        TokenKind::Newline => "\\n".to_string(),
        _ => token.lexeme.escape_debug().to_string(),
    }
}

pub fn token_rows(tokens: &[Token]) -> Vec<TokenRow> {
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| TokenRow {
            index,
            kind: token.kind.name(),
            lexeme: escape_lexeme(token),
            line: token.position.line,
            column: token.position.column,
        })
        .collect()
}

/// The program tree, one `kind(text)@line:col` per line, children indented.
pub fn render_tree(node: &Node) -> String {
    node.to_string()
}

pub fn tokens_to_json(tokens: &[Token]) -> Json {
    Json::Array(
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                json!({
                    "index": index,
                    "kind": token.kind.name(),
                    "lexeme": token.lexeme,
                    "line": token.position.line,
                    "column": token.position.column,
                })
            })
            .collect(),
    )
}

pub fn node_to_json(node: &Node) -> Json {
    json!({
        "kind": node.kind.name(),
        "text": node.text,
        "line": node.position.line,
        "column": node.position.column,
        "children": node.children.iter().map(node_to_json).collect::<Vec<_>>(),
    })
}

/// Converts a BizSpec value into JSON.
///
/// Integer literals stay integers; NaN and infinities, which JSON cannot
/// represent, become `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Number(n) => {
            let v = n.value();
            if n.is_integer_literal() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Json::Number((v as i64).into())
            } else {
                JsonNumber::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
            }
        }
        Value::String(s) => Json::String(s.clone()),
        Value::Mapping(env) => environment_to_json(env),
    }
}

pub fn environment_to_json(env: &Environment) -> Json {
    Json::Object(
        env.iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect::<Map<String, Json>>(),
    )
}

fn test_to_json(test: &TestReport) -> Json {
    json!({
        "name": test.name,
        "passed": test.passed(),
        "firings": test.firings.iter().map(|f| json!({
            "rule": f.rule,
            "target": f.target,
            "value": value_to_json(&f.value),
            "display": f.value.to_string(),
        })).collect::<Vec<_>>(),
        "expects": test.expects.iter().map(|e| json!({
            "expression": e.expression,
            "passed": e.passed,
        })).collect::<Vec<_>>(),
        "environment": environment_to_json(&test.environment),
        "error": test.error.as_ref().map(|e| e.to_string()),
    })
}

pub fn report_to_json(report: &RunReport) -> Json {
    json!({
        "tests": report.tests.iter().map(test_to_json).collect::<Vec<_>>(),
        "passed": report.passed(),
        "failed": report.failed(),
    })
}
