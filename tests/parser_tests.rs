// tests/parser_tests.rs

use bizspec::ast::{BinOp, Expr, Node, NodeKind, Position, TokenKind, UnaryOp};
use bizspec::lexer::tokenize;
use bizspec::parser::{ParseError, Parser};
use bizspec::{Value, parse_source};

fn parse_program(input: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(input).expect("Lexing failed");
    Parser::new(tokens).parse_program()
}

fn parse_expr(input: &str) -> Expr {
    let tokens = tokenize(input).expect("Lexing failed");
    Parser::new(tokens).parse().expect("Parsing failed")
}

fn kinds(node: &Node) -> Vec<NodeKind> {
    node.children.iter().map(|c| c.kind).collect()
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn test_rule_tree() {
    let program = parse_program(r#"rule "X" when a >= 1 then b = 2"#).unwrap();
    assert_eq!(program.kind, NodeKind::Program);
    assert_eq!(program.children.len(), 1);

    let rule = &program.children[0];
    assert_eq!(rule.kind, NodeKind::Rule);
    assert_eq!(rule.text, "X");
    assert_eq!(kinds(rule), vec![NodeKind::When, NodeKind::Set]);
    assert_eq!(rule.children[0].text, "a >= 1");

    let set = &rule.children[1];
    assert_eq!(kinds(set), vec![NodeKind::Target, NodeKind::Value]);
    assert_eq!(set.children[0].text, "b");
    assert_eq!(set.children[1].text, "2");
}

#[test]
fn test_rule_tree_rendering() {
    let program = parse_program(r#"rule "X" when a >= 1 then b = 2"#).unwrap();
    let expected = "\
Program@1:1
  Rule(X)@1:1
    When(a >= 1)@1:15
    Set@1:22
      Target(b)@1:27
      Value(2)@1:31
";
    assert_eq!(program.to_string(), expected);
}

#[test]
fn test_dotted_rule_target() {
    let program = parse_program(r#"rule "t" when true then order.shipping.cost = 0"#).unwrap();
    let set = program.children[0].child(NodeKind::Set).unwrap();
    assert_eq!(set.child(NodeKind::Target).unwrap().text, "order.shipping.cost");
}

#[test]
fn test_string_literals_stay_quoted_in_spans() {
    let program = parse_program(r#"rule "t" when pais == "USA" then saludo = "hola \"amigo\"""#)
        .unwrap();
    let rule = &program.children[0];
    assert_eq!(rule.children[0].text, r#"pais == "USA""#);

    let value = &rule.children[1].children[1];
    assert_eq!(value.text, r#""hola \"amigo\"""#);
    let again = tokenize(&value.text).unwrap();
    assert_eq!(again[0].lexeme, "hola \"amigo\"");
}

#[test]
fn test_rules_keep_source_order() {
    let source = "\
rule \"a\" when x then y = 1
rule \"b\" when x then y = 2


rule \"c\" when x then z = 3
";
    let program = parse_program(source).unwrap();
    let names: Vec<&str> = program.children.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_empty_condition_is_kept_as_empty_text() {
    // Structural parsing never looks inside the spans
    let program = parse_program(r#"rule "t" when then y = 1"#).unwrap();
    assert_eq!(program.children[0].children[0].text, "");
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_test_block() {
    let source = "\
test \"Orden 123\" {

  given carrito.total=120000, pais = \"CL\"
  expect envio == 0

  given cupon = \"ENVIO10\"
}
";
    let program = parse_program(source).unwrap();
    let test = &program.children[0];
    assert_eq!(test.kind, NodeKind::Test);
    assert_eq!(test.text, "Orden 123");
    assert_eq!(
        kinds(test),
        vec![NodeKind::Given, NodeKind::Expect, NodeKind::Given]
    );
    assert_eq!(test.children[0].text, r#"carrito . total = 120000 , pais = "CL""#);
    assert_eq!(test.children[0].position, Position::new(3, 3));
    assert_eq!(test.children[1].text, "envio == 0");
}

#[test]
fn test_empty_test_block() {
    let program = parse_program("test \"nothing\" {}").unwrap();
    assert!(program.children[0].children.is_empty());
}

#[test]
fn test_rules_and_tests_interleave() {
    let source = "\
# header
test \"t1\" {
}
rule \"r\" when a then b = 1
test \"t2\" { }
";
    let program = parse_program(source).unwrap();
    assert_eq!(
        kinds(&program),
        vec![NodeKind::Test, NodeKind::Rule, NodeKind::Test]
    );
    assert_eq!(program.rules().len(), 1);
    assert_eq!(program.tests().len(), 2);
}

#[test]
fn test_rule_and_test_views() {
    let source = "\
rule \"Free\" when total >= 10 then shipping = 0
test \"t\" {
  given total = 20
  expect shipping == 0
}
";
    let program = parse_program(source).unwrap();

    let rules = program.rules();
    assert_eq!(rules[0].name, "Free");
    assert_eq!(rules[0].condition.text, "total >= 10");
    assert_eq!(rules[0].target, "shipping");
    assert_eq!(rules[0].value.text, "0");

    let tests = program.tests();
    assert_eq!(tests[0].givens[0].text, "total = 20");
    assert_eq!(tests[0].expects[0].text, "shipping == 0");
}

#[test]
fn test_empty_source() {
    let program = parse_program("\n\n# nothing here\n").unwrap();
    assert!(program.children.is_empty());
    assert_eq!(program.to_string(), "Program@1:1\n");
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn test_missing_closing_brace() {
    let err = parse_program("test \"t\" {\n  given a = 1\n").unwrap_err();
    assert_eq!(err.found, TokenKind::Eof);
    assert_eq!(err.expected, "'}'");
    assert_eq!(err.position, Position::new(3, 1));
    assert_eq!(err.to_string(), "[L3 C1] expected '}', found EOF");
}

#[test]
fn test_unexpected_top_level_token() {
    let err = parse_program("x = 1").unwrap_err();
    assert_eq!(err.found, TokenKind::Identifier);
    assert_eq!(err.to_string(), "[L1 C1] expected 'rule' or 'test', found IDENT 'x'");
}

#[test]
fn test_rule_requires_string_name() {
    let err = parse_program("rule X when a then b = 1").unwrap_err();
    assert_eq!(err.found, TokenKind::Identifier);
    assert_eq!(err.position, Position::new(1, 6));
}

#[test]
fn test_rule_requires_then() {
    let err = parse_program("rule \"r\" when a > 1\n").unwrap_err();
    assert_eq!(err.expected, "'then'");
    assert_eq!(err.found, TokenKind::Newline);
}

#[test]
fn test_rule_requires_assignment() {
    let err = parse_program("rule \"r\" when a then b == 1").unwrap_err();
    assert_eq!(err.found, TokenKind::EqEq);
    assert!(err.to_string().contains("'='"));
}

#[test]
fn test_unexpected_line_in_test_block() {
    let err = parse_program("test \"t\" {\n  a = 1\n}").unwrap_err();
    assert_eq!(err.found, TokenKind::Identifier);
    assert_eq!(err.position, Position::new(2, 3));
}

#[test]
fn test_parse_source_wraps_errors() {
    let err = parse_source("test \"t\" {").unwrap_err();
    assert!(err.to_string().starts_with("Parse error: "));

    let err = parse_source("rule \"r\" when a @ b then c = 1").unwrap_err();
    assert!(err.to_string().starts_with("Lex error: "));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_precedence() {
    assert_eq!(parse_expr("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(parse_expr("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
    assert_eq!(
        parse_expr("a or b and c").to_string(),
        "(a or (b and c))"
    );
    assert_eq!(
        parse_expr("a + 1 >= b and not c").to_string(),
        "(((a + 1) >= b) and (not c))"
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(parse_expr("10 - 3 - 2").to_string(), "((10 - 3) - 2)");
    assert_eq!(parse_expr("8 / 4 / 2").to_string(), "((8 / 4) / 2)");
    assert_eq!(parse_expr("a == b == c").to_string(), "((a == b) == c)");
}

#[test]
fn test_unary_operators() {
    match parse_expr("--x") {
        Expr::Unary {
            op: UnaryOp::Negate,
            operand,
        } => assert!(matches!(
            *operand,
            Expr::Unary {
                op: UnaryOp::Negate,
                ..
            }
        )),
        other => panic!("unexpected expression {:?}", other),
    }
    assert_eq!(parse_expr("not not a").to_string(), "(not (not a))");
}

#[test]
fn test_literals() {
    assert_eq!(parse_expr("null"), Expr::Literal(Value::Null));
    assert_eq!(parse_expr("UNDEFINED"), Expr::Literal(Value::Null));
    assert_eq!(parse_expr("true"), Expr::Literal(Value::Boolean(true)));
    assert_eq!(parse_expr("\"USA\""), Expr::Literal(Value::string("USA")));
    assert_eq!(parse_expr("2.5"), Expr::Literal(Value::number(2.5)));
}

#[test]
fn test_paths() {
    match parse_expr("carrito.total >= 100000") {
        Expr::BinaryOp {
            op: BinOp::GreaterEqual,
            left,
            ..
        } => match *left {
            Expr::Path(path) => assert_eq!(path.segments(), ["carrito", "total"]),
            other => panic!("expected a path, got {:?}", other),
        },
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_expression_errors() {
    let cases = vec![
        ("1 +", TokenKind::Eof),
        ("(1 + 2", TokenKind::Eof),
        ("1 2", TokenKind::Number),
        ("a.", TokenKind::Eof),
        ("== 1", TokenKind::EqEq),
        ("a = 1", TokenKind::Eq),
    ];

    for (input, found) in cases {
        let tokens = tokenize(input).unwrap();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.found, found, "Failed for input: {}", input);
    }
}

#[test]
fn test_parser_appends_missing_eof() {
    let mut tokens = tokenize("a + 1").unwrap();
    tokens.pop();
    let expr = Parser::new(tokens).parse().unwrap();
    assert_eq!(expr.to_string(), "(a + 1)");
}
