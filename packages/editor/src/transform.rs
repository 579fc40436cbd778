//! # Transform
//!
//! A working copy of the document that commands edit through [`Step`]s.
//! The original document is never touched: a command either hands back the
//! finished transform or drops it, so a rejected or failed command leaves
//! no trace.

use crate::errors::{TransformError, TransformResult};
use crate::steps::Step;
use folio_model::{Attrs, Node};
use folio_schema::Schema;

pub struct Transform<'a> {
    schema: &'a Schema,
    doc: Node,
    steps: Vec<Step>,
}

impl<'a> Transform<'a> {
    pub fn new(schema: &'a Schema, doc: Node) -> Self {
        Self {
            schema,
            doc,
            steps: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn into_parts(self) -> (Node, Vec<Step>) {
        (self.doc, self.steps)
    }

    pub fn node(&self, path: &[usize]) -> TransformResult<&Node> {
        self.doc
            .node_at(path)
            .ok_or_else(|| TransformError::NodeNotFound(path.to_vec()))
    }

    pub fn step(&mut self, step: Step) -> TransformResult<()> {
        step.apply(&mut self.doc)?;
        self.steps.push(step);
        Ok(())
    }

    /// Replace children `from..to` of `parent` with `nodes`
    pub fn replace(&mut self, parent: &[usize], from: usize, to: usize, nodes: Vec<Node>) -> TransformResult<()> {
        self.step(Step::Replace {
            parent: parent.to_vec(),
            from,
            to,
            nodes,
        })
    }

    pub fn insert(&mut self, parent: &[usize], index: usize, nodes: Vec<Node>) -> TransformResult<()> {
        self.replace(parent, index, index, nodes)
    }

    pub fn replace_node(&mut self, path: &[usize], node: Node) -> TransformResult<()> {
        let (parent, index) = split_path(path)?;
        self.replace(parent, index, index + 1, vec![node])
    }

    /// Replace one node with any number of nodes (lifting its children, say)
    pub fn replace_with(&mut self, path: &[usize], nodes: Vec<Node>) -> TransformResult<()> {
        let (parent, index) = split_path(path)?;
        self.replace(parent, index, index + 1, nodes)
    }

    pub fn remove(&mut self, path: &[usize]) -> TransformResult<()> {
        let (parent, index) = split_path(path)?;
        self.replace(parent, index, index + 1, Vec::new())
    }

    /// Swap the whole content of the node at `path`
    pub fn set_content(&mut self, path: &[usize], content: Vec<Node>) -> TransformResult<()> {
        let size = self.node(path)?.content.len();
        self.replace(path, 0, size, content)
    }

    /// Overwrite attributes, default-filled against the node's type. Keys the
    /// type does not declare are dropped. Nothing is recorded when the
    /// attributes do not change.
    pub fn set_attrs(&mut self, path: &[usize], attrs: &Attrs) -> TransformResult<()> {
        let node = self.node(path)?;
        let attrs = self.schema.node_attrs(&node.kind, attrs)?;
        if attrs == node.attrs {
            return Ok(());
        }
        self.step(Step::SetAttrs {
            path: path.to_vec(),
            attrs,
        })
    }

    /// Merge `changes` into the current attributes
    pub fn update_attrs(&mut self, path: &[usize], changes: &Attrs) -> TransformResult<()> {
        let mut attrs = self.node(path)?.attrs.clone();
        attrs.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.set_attrs(path, &attrs)
    }

    /// Re-fill the content of `path` so it satisfies its content model again
    pub fn fill(&mut self, path: &[usize]) -> TransformResult<()> {
        let node = self.node(path)?;
        if self.schema.content_matches(&node.kind, &node.content) {
            return Ok(());
        }
        let filled = self.schema.fill_content(&node.kind, node.content.clone())?;
        self.set_content(path, filled)
    }
}

/// `(parent path, index in parent)`; the root has neither
pub fn split_path(path: &[usize]) -> TransformResult<(&[usize], usize)> {
    match path.split_last() {
        Some((index, parent)) => Ok((parent, *index)),
        None => Err(TransformError::RootReplacement),
    }
}
