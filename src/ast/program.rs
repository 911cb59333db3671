use crate::ast::{Node, NodeKind, Position};

/// An expression span together with the place it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub text: String,
    pub position: Position,
}

impl Clause {
    fn from_node(node: &Node) -> Self {
        Clause {
            text: node.text.clone(),
            position: node.position,
        }
    }
}

/// View over a `Rule` node.
///
/// # Example
/// ```text
/// rule "Free shipping" when cart.total >= 100000 then shipping = 0
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub condition: Clause,
    pub target: String,
    pub value: Clause,
    pub position: Position,
}

impl Rule {
    /// Builds the view, or `None` if the node is not a rule.
    pub fn from_node(node: &Node) -> Option<Self> {
        if node.kind != NodeKind::Rule {
            return None;
        }
        let clause = |n: Option<&Node>| {
            n.map(Clause::from_node).unwrap_or(Clause {
                text: String::new(),
                position: node.position,
            })
        };
        let set = node.child(NodeKind::Set);

        Some(Rule {
            name: node.text.clone(),
            condition: clause(node.child(NodeKind::When)),
            target: set
                .and_then(|s| s.child(NodeKind::Target))
                .map(|t| t.text.clone())
                .unwrap_or_default(),
            value: clause(set.and_then(|s| s.child(NodeKind::Value))),
            position: node.position,
        })
    }
}

/// View over a `Test` node.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub givens: Vec<Clause>,
    pub expects: Vec<Clause>,
    pub position: Position,
}

impl TestCase {
    pub fn from_node(node: &Node) -> Option<Self> {
        if node.kind != NodeKind::Test {
            return None;
        }
        Some(TestCase {
            name: node.text.clone(),
            givens: node.children_of(NodeKind::Given).map(Clause::from_node).collect(),
            expects: node.children_of(NodeKind::Expect).map(Clause::from_node).collect(),
            position: node.position,
        })
    }
}

impl Node {
    /// Rules of a program, in source order.
    pub fn rules(&self) -> Vec<Rule> {
        self.children.iter().filter_map(Rule::from_node).collect()
    }

    /// Test cases of a program, in source order.
    pub fn tests(&self) -> Vec<TestCase> {
        self.children.iter().filter_map(TestCase::from_node).collect()
    }
}
