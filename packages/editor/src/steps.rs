//! # Steps
//!
//! The primitive edits every command is built from. A step addresses nodes
//! by child-index path from the document root and is applied to the tree
//! as is; keeping the tree valid is the job of the command that emits it.
//!
//! - `Replace` swaps a run of children of one parent for new nodes. With an
//!   empty run it inserts, with no new nodes it deletes. Inline content of a
//!   textblock is replaced the same way.
//! - `SetAttrs` overwrites the attribute map of one node.

use crate::errors::{TransformError, TransformResult};
use folio_model::{Attrs, Node};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Replace {
        parent: Vec<usize>,
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },

    SetAttrs { path: Vec<usize>, attrs: Attrs },
}

impl Step {
    pub fn apply(&self, doc: &mut Node) -> TransformResult<()> {
        match self {
            Step::Replace {
                parent,
                from,
                to,
                nodes,
            } => {
                let target = doc
                    .node_at_mut(parent)
                    .ok_or_else(|| TransformError::NodeNotFound(parent.clone()))?;
                let size = target.content.len();
                if from > to || *to > size {
                    return Err(TransformError::RangeOutOfBounds {
                        parent: parent.clone(),
                        from: *from,
                        to: *to,
                        size,
                    });
                }
                target.content.splice(*from..*to, nodes.iter().cloned());
                Ok(())
            }
            Step::SetAttrs { path, attrs } => {
                let target = doc
                    .node_at_mut(path)
                    .ok_or_else(|| TransformError::NodeNotFound(path.clone()))?;
                target.attrs = attrs.clone();
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Replace { nodes, .. } if nodes.is_empty() => "delete",
            Step::Replace { from, to, .. } if from == to => "insert",
            Step::Replace { .. } => "replace",
            Step::SetAttrs { .. } => "setAttrs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Node {
        Node::new("doc")
            .with_child(Node::new("paragraph").with_child(Node::text("a")))
            .with_child(Node::new("paragraph").with_child(Node::text("b")))
    }

    #[test]
    fn test_replace_inserts_and_deletes() {
        let mut doc = doc();
        Step::Replace {
            parent: vec![],
            from: 1,
            to: 1,
            nodes: vec![Node::new("horizontalRule")],
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.content[1].kind, "horizontalRule");

        let delete = Step::Replace {
            parent: vec![],
            from: 0,
            to: 2,
            nodes: vec![],
        };
        assert_eq!(delete.name(), "delete");
        delete.apply(&mut doc).unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].text_content(), "b");
    }

    #[test]
    fn test_out_of_range_leaves_document_alone() {
        let mut doc = doc();
        let result = Step::Replace {
            parent: vec![0],
            from: 0,
            to: 5,
            nodes: vec![],
        }
        .apply(&mut doc);

        assert!(matches!(result, Err(TransformError::RangeOutOfBounds { size: 1, .. })));
        assert_eq!(doc, self::doc());
    }

    #[test]
    fn test_set_attrs_on_missing_node() {
        let mut doc = doc();
        let mut attrs = Attrs::new();
        attrs.insert("level".to_string(), json!(2));

        let result = Step::SetAttrs { path: vec![7], attrs }.apply(&mut doc);
        assert_eq!(result, Err(TransformError::NodeNotFound(vec![7])));
    }
}
