use std::fmt;

use serde::Serialize;

use super::Symbol;

/// Half-open byte range `[start, end)` in the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    /// The matched text of a terminal.
    Leaf(String),
    Children(Vec<Node>),
}

/// A concrete syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: Symbol,
    pub span: Span,
    pub value: NodeValue,
}

impl Node {
    pub fn leaf(name: Symbol, span: Span, text: &str) -> Self {
        Self {
            name,
            span,
            value: NodeValue::Leaf(text.to_string()),
        }
    }

    pub fn interior(name: Symbol, span: Span, children: Vec<Node>) -> Self {
        Self {
            name,
            span,
            value: NodeValue::Children(children),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Leaf(text) => Some(text),
            NodeValue::Children(_) => None,
        }
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.value {
            NodeValue::Leaf(_) => &[],
            NodeValue::Children(children) => children,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
