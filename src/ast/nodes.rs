use std::fmt;

use crate::ast::Position;

/// Kind of a program tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a parsed source; children are `Rule` and `Test` nodes in source order
    Program,
    /// `rule "<name>" when ... then ...`; children: `When`, `Set`
    Rule,
    /// Condition span of a rule
    When,
    /// Assignment part of a rule; children: exactly one `Target` and one `Value`
    Set,
    /// Dotted path a rule assigns
    Target,
    /// Value expression span of a rule
    Value,
    /// `test "<name>" { ... }`; children: `Given` and `Expect` nodes in source order
    Test,
    /// `given` line, possibly several comma separated assignments
    Given,
    /// `expect` line
    Expect,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Rule => "Rule",
            NodeKind::When => "When",
            NodeKind::Set => "Set",
            NodeKind::Target => "Target",
            NodeKind::Value => "Value",
            NodeKind::Test => "Test",
            NodeKind::Given => "Given",
            NodeKind::Expect => "Expect",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the program tree.
///
/// Child order is source order and carries meaning: it fixes rule precedence
/// and the order in which `given` and `expect` lines run.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Associated text: rule/test name, expression span or target path.
    /// Empty for `Program` and `Set`.
    pub text: String,
    pub position: Position,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, text: impl Into<String>, position: Position) -> Self {
        Node {
            kind,
            text: text.into(),
            position,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// The `kind(text)@line:col` label of this node alone.
    pub fn label(&self) -> String {
        if self.text.is_empty() {
            format!("{}@{}", self.kind, self.position)
        } else {
            format!("{}({})@{}", self.kind, self.text, self.position)
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{}{}", "  ".repeat(depth), self.label())?;
        for child in &self.children {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Renders the whole subtree, one node per line, children indented by two spaces.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
