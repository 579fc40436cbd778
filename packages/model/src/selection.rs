//! # Selection
//!
//! Positions address the document by path: `path` names a node by child
//! indices from the root and `offset` is an inline offset when that node is a
//! textblock (characters for text, 1 for inline atoms) or a child index when
//! it is a container. Positions inside textblocks order the same way the
//! document reads, so `Ord` on `Position` is document order.

use crate::error::ModelError;
use crate::node::Node;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Position {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Check that the position exists in `doc`
    pub fn validate(&self, doc: &Node) -> Result<(), ModelError> {
        let node = doc
            .node_at(&self.path)
            .ok_or_else(|| ModelError::InvalidPath(self.path.clone()))?;
        let size = if node.content.iter().any(|c| c.text.is_some()) || node.content.is_empty() {
            node.content_len()
        } else {
            node.content.len()
        };
        if self.offset > size {
            return Err(ModelError::OffsetOutOfRange {
                path: self.path.clone(),
                offset: self.offset,
                size,
            });
        }
        Ok(())
    }
}

/// Cursor or range supplied by the host editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    /// Text cursor (anchor == head) or text range
    Text { anchor: Position, head: Position },

    /// A single selected node
    Node { path: Vec<usize> },

    /// The whole document
    All,
}

impl Selection {
    pub fn cursor(path: Vec<usize>, offset: usize) -> Self {
        let position = Position::new(path, offset);
        Selection::Text {
            anchor: position.clone(),
            head: position,
        }
    }

    pub fn range(anchor: Position, head: Position) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn node(path: Vec<usize>) -> Self {
        Selection::Node { path }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Text { anchor, head } => anchor == head,
            Selection::Node { .. } | Selection::All => false,
        }
    }

    /// Start and end of a text selection, in document order
    pub fn text_range(&self) -> Option<(&Position, &Position)> {
        match self {
            Selection::Text { anchor, head } if anchor <= head => Some((anchor, head)),
            Selection::Text { anchor, head } => Some((head, anchor)),
            Selection::Node { .. } | Selection::All => None,
        }
    }

    /// Path the selection starts in: the `from` textblock, the selected node,
    /// or the root for `All`.
    pub fn from_path(&self) -> &[usize] {
        match self {
            Selection::Text { .. } => self
                .text_range()
                .map(|(from, _)| from.path.as_slice())
                .unwrap_or_default(),
            Selection::Node { path } => path,
            Selection::All => &[],
        }
    }

    /// Paths enclosing the selection start, innermost first, root last
    pub fn ancestor_paths(&self) -> Vec<Vec<usize>> {
        let path = self.from_path();
        (0..=path.len()).rev().map(|len| path[..len].to_vec()).collect()
    }

    pub fn selected_node<'a>(&self, doc: &'a Node) -> Option<&'a Node> {
        match self {
            Selection::Node { path } => doc.node_at(path),
            Selection::Text { .. } | Selection::All => None,
        }
    }

    pub fn validate(&self, doc: &Node) -> Result<(), ModelError> {
        match self {
            Selection::Text { anchor, head } => {
                anchor.validate(doc)?;
                head.validate(doc)
            }
            Selection::Node { path } => doc
                .node_at(path)
                .map(|_| ())
                .ok_or_else(|| ModelError::InvalidPath(path.clone())),
            Selection::All => Ok(()),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::cursor(vec![0], 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_range_orders_positions() {
        let selection = Selection::range(Position::new(vec![2], 1), Position::new(vec![0], 3));
        let (from, to) = selection.text_range().unwrap();

        assert_eq!(from.path, vec![0]);
        assert_eq!(to.path, vec![2]);
    }

    #[test]
    fn test_ancestor_paths_innermost_first() {
        let selection = Selection::cursor(vec![1, 0, 0], 0);

        assert_eq!(
            selection.ancestor_paths(),
            vec![vec![1, 0, 0], vec![1, 0], vec![1], vec![]]
        );
    }

    #[test]
    fn test_validate_rejects_missing_path() {
        let doc = Node::new("doc").with_child(Node::new("paragraph").with_child(Node::text("ab")));

        assert!(Selection::cursor(vec![0], 2).validate(&doc).is_ok());
        assert!(Selection::cursor(vec![0], 3).validate(&doc).is_err());
        assert!(Selection::node(vec![3]).validate(&doc).is_err());
    }

    #[test]
    fn test_selection_json() {
        let selection = Selection::node(vec![0]);
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"type":"node","path":[0]}"#);
    }
}
