use crate::mark::Mark;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute mapping of a node or mark
pub type Attrs = BTreeMap<String, Value>;

/// Name of the node type every text leaf uses
pub const TEXT_TYPE: &str = "text";

/// A node of the document tree.
///
/// Serializes to the ProseMirror JSON shape
/// (`{"type", "attrs", "content", "text", "marks"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    /// Text leaf
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(TEXT_TYPE)
        }
    }

    pub fn text_with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            marks,
            ..Self::text(text)
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT_TYPE
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    /// Width of this node inside inline content: characters for text, 1 for atoms
    pub fn inline_len(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None => 1,
        }
    }

    /// Sum of the inline widths of the children
    pub fn content_len(&self) -> usize {
        self.content.iter().map(Node::inline_len).sum()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for index in path {
            node = node.content.get(*index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for index in path {
            node = node.content.get_mut(*index)?;
        }
        Some(node)
    }

    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.content.iter().map(Node::text_content).collect(),
        }
    }

    /// Same type, attributes and marks (content ignored)
    pub fn same_markup(&self, other: &Node) -> bool {
        self.kind == other.kind && self.attrs == other.attrs && self.marks == other.marks
    }

    /// Depth-first, pre-order walk. The callback returns `false` to skip a
    /// node's children.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, &[usize]) -> bool,
    {
        let mut path = Vec::new();
        self.walk_inner(&mut path, f);
    }

    fn walk_inner<F>(&self, path: &mut Vec<usize>, f: &mut F)
    where
        F: FnMut(&Node, &[usize]) -> bool,
    {
        if !f(self, path) {
            return;
        }
        for (index, child) in self.content.iter().enumerate() {
            path.push(index);
            child.walk_inner(path, f);
            path.pop();
        }
    }

    /// Mutable pre-order walk over every node, root included
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        f(self);
        for child in &mut self.content {
            child.walk_mut(f);
        }
    }

    /// Paths of every node matching `predicate`, in document order
    pub fn find_all<F>(&self, mut predicate: F) -> Vec<Vec<usize>>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut found = Vec::new();
        self.walk(&mut |node: &Node, path: &[usize]| {
            if predicate(node) {
                found.push(path.to_vec());
            }
            true
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        Node::new("doc").with_content(vec![
            Node::new("paragraph").with_child(Node::text("Hello")),
            Node::new("layout").with_attr("columns", 2).with_content(vec![
                Node::new("layoutColumn").with_child(Node::new("paragraph")),
                Node::new("layoutColumn").with_child(Node::new("paragraph").with_child(Node::text("x"))),
            ]),
        ])
    }

    #[test]
    fn test_node_at_path() {
        let doc = sample();

        assert_eq!(doc.node_at(&[1]).unwrap().kind, "layout");
        assert_eq!(doc.node_at(&[1, 1, 0]).unwrap().text_content(), "x");
        assert!(doc.node_at(&[4]).is_none());
    }

    #[test]
    fn test_json_shape() {
        let paragraph = Node::new("paragraph").with_child(Node::text("Hi"));
        let value = serde_json::to_value(&paragraph).unwrap();

        assert_eq!(
            value,
            json!({"type": "paragraph", "content": [{"type": "text", "text": "Hi"}]})
        );

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, paragraph);
    }

    #[test]
    fn test_find_all_in_document_order() {
        let doc = sample();
        let paragraphs = doc.find_all(|n| n.kind == "paragraph");

        assert_eq!(paragraphs, vec![vec![0], vec![1, 0, 0], vec![1, 1, 0]]);
    }

    #[test]
    fn test_inline_len_counts_chars() {
        assert_eq!(Node::text("héllo").inline_len(), 5);
        assert_eq!(Node::new("hardBreak").inline_len(), 1);
    }
}
