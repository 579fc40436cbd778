//! # Composite document schema
//!
//! The result of a build: every active node and mark type with resolved
//! content models, the command table and the editor features. A `Schema`
//! is immutable; a new extension set or configuration means a new build.

use crate::attribute::fill_defaults;
use crate::command::CommandSpec;
use crate::content::ContentModel;
use crate::definition::{MarkSpec, NodeSpec, TypeDefinition};
use crate::error::{SchemaError, SchemaResult};
use crate::feature::Feature;
use folio_model::{Attrs, Mark, Node, TEXT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Depth limit for recursive filling of required content
const MAX_FILL_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct NodeType {
    pub definition: TypeDefinition,
    pub spec: NodeSpec,
    pub content: ContentModel,
    /// Content accepts inline nodes
    pub inline_content: bool,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn is_textblock(&self) -> bool {
        self.inline_content
    }

    pub fn is_leaf(&self) -> bool {
        self.spec().is_leaf()
    }

    pub fn is_inline(&self) -> bool {
        self.spec().inline
    }

    pub fn is_atom(&self) -> bool {
        self.spec().atom || self.is_leaf()
    }
}

#[derive(Debug, Clone)]
pub struct MarkType {
    pub definition: TypeDefinition,
    /// Position in the schema; marks in a set are kept sorted by rank
    pub rank: usize,
}

impl MarkType {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn spec(&self) -> MarkSpec {
        self.definition.mark_spec().cloned().unwrap_or_default()
    }
}

/// One candidate implementation of a command name
#[derive(Debug, Clone)]
pub struct CommandEntry {
    /// Type that declared the command, `None` for fragment-level commands
    pub owner: Option<String>,
    pub spec: CommandSpec,
    /// Build order of the contributing fragment; higher is later
    pub rank: usize,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) nodes: Vec<NodeType>,
    pub(crate) marks: Vec<MarkType>,
    pub(crate) top_node: String,
    pub(crate) commands: BTreeMap<String, Vec<CommandEntry>>,
    pub(crate) features: Vec<Feature>,
    pub(crate) fragments: Vec<String>,
}

impl Schema {
    pub fn nodes(&self) -> &[NodeType] {
        &self.nodes
    }

    pub fn marks(&self) -> &[MarkType] {
        &self.marks
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    pub fn mark_type(&self, name: &str) -> Option<&MarkType> {
        self.marks.iter().find(|mark| mark.name() == name)
    }

    pub fn top_node(&self) -> &str {
        &self.top_node
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Names of the fragments the schema was built from, in build order
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn commands(&self, name: &str) -> &[CommandEntry] {
        self.commands.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn is_textblock(&self, name: &str) -> bool {
        self.node_type(name).is_some_and(NodeType::is_textblock)
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.node_type(name).is_some_and(NodeType::is_inline)
    }

    /// Textblock used when loose inline content needs a parent
    pub fn default_textblock(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.is_textblock() && !node.spec().code && node.spec().in_group("block"))
            .map(NodeType::name)
    }

    pub fn group_members(&self, group: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| node.spec().in_group(group))
            .map(|node| node.name().to_string())
            .collect()
    }

    pub fn mark_rank(&self, name: &str) -> usize {
        self.mark_type(name).map_or(usize::MAX, |mark| mark.rank)
    }

    /// Declared attributes of a node type, default-filled
    pub fn node_attrs(&self, type_name: &str, attrs: &Attrs) -> SchemaResult<Attrs> {
        let node_type = self
            .node_type(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;
        Ok(fill_defaults(&node_type.definition.attributes, attrs))
    }

    /// Node with default-filled attributes and the given content
    pub fn node(&self, type_name: &str, attrs: &Attrs, content: Vec<Node>) -> SchemaResult<Node> {
        let attrs = self.node_attrs(type_name, attrs)?;
        Ok(Node::new(type_name).with_attrs(attrs).with_content(content))
    }

    /// Mark with default-filled attributes
    pub fn mark(&self, type_name: &str, attrs: &Attrs) -> SchemaResult<Mark> {
        let mark_type = self
            .mark_type(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;
        Ok(Mark::new(type_name).with_attrs(fill_defaults(&mark_type.definition.attributes, attrs)))
    }

    /// Node with its required content filled in (an empty layout column gets
    /// a paragraph, a document gets one empty paragraph)
    pub fn create_and_fill(&self, type_name: &str, attrs: &Attrs) -> SchemaResult<Node> {
        self.create_and_fill_inner(type_name, attrs, 0)
    }

    fn create_and_fill_inner(&self, type_name: &str, attrs: &Attrs, depth: usize) -> SchemaResult<Node> {
        let mut node = self.node(type_name, attrs, Vec::new())?;
        if depth < MAX_FILL_DEPTH {
            node.content = self.fill_content_inner(type_name, Vec::new(), depth)?;
        }
        Ok(node)
    }

    /// Append whatever `children` is missing to satisfy the type's content
    /// model. Children that do not form a valid prefix are returned as is.
    pub fn fill_content(&self, type_name: &str, children: Vec<Node>) -> SchemaResult<Vec<Node>> {
        self.fill_content_inner(type_name, children, 0)
    }

    fn fill_content_inner(&self, type_name: &str, mut children: Vec<Node>, depth: usize) -> SchemaResult<Vec<Node>> {
        let node_type = self
            .node_type(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;
        let types: Vec<&str> = children.iter().map(|c| c.kind.as_str()).collect();
        if let Some(missing) = node_type.content.fill(types, &[TEXT_TYPE]) {
            for name in missing {
                children.push(self.create_and_fill_inner(&name, &Attrs::new(), depth + 1)?);
            }
        }
        Ok(children)
    }

    /// Child sequence satisfies the content model of `type_name`
    pub fn content_matches(&self, type_name: &str, children: &[Node]) -> bool {
        self.node_type(type_name)
            .is_some_and(|node_type| node_type.content.matches(children.iter().map(|c| c.kind.as_str())))
    }

    /// Add `mark` to `set`: marks it excludes are dropped, the result is
    /// sorted by rank and never holds two marks of one type.
    pub fn add_mark(&self, set: &[Mark], mark: Mark) -> Vec<Mark> {
        let spec = self.mark_type(&mark.kind).map(MarkType::spec).unwrap_or_default();
        let mut result: Vec<Mark> = set
            .iter()
            .filter(|existing| !spec.excludes_mark(&mark.kind, &existing.kind))
            .filter(|existing| existing.kind != mark.kind)
            .cloned()
            .collect();
        let blocked = result.iter().any(|existing| {
            self.mark_type(&existing.kind)
                .is_some_and(|other| other.spec().excludes_mark(&existing.kind, &mark.kind))
        });
        if !blocked {
            result.push(mark);
        }
        self.sort_marks(&mut result);
        result
    }

    pub fn sort_marks(&self, marks: &mut [Mark]) {
        marks.sort_by_key(|mark| self.mark_rank(&mark.kind));
    }

    /// Marks may appear inside nodes of this type
    pub fn allows_marks(&self, parent: &str) -> bool {
        self.node_type(parent).is_some_and(|node| !node.spec().code)
    }

    /// Check a whole document: known types, complete attribute maps, content
    /// models and mark sets
    pub fn validate(&self, doc: &Node) -> SchemaResult<()> {
        if doc.kind != self.top_node {
            return Err(SchemaError::invalid_document(
                &[],
                format!("root is `{}`, expected `{}`", doc.kind, self.top_node),
            ));
        }
        let mut path = Vec::new();
        self.validate_node(doc, &mut path)
    }

    fn validate_node(&self, node: &Node, path: &mut Vec<usize>) -> SchemaResult<()> {
        let node_type = self
            .node_type(&node.kind)
            .ok_or_else(|| SchemaError::invalid_document(path, format!("unknown node type `{}`", node.kind)))?;

        if node.is_text() {
            if node.text.as_deref().unwrap_or_default().is_empty() {
                return Err(SchemaError::invalid_document(path, "empty text node"));
            }
        } else if node.text.is_some() {
            return Err(SchemaError::invalid_document(path, "only text nodes carry text"));
        }

        let declared = &node_type.definition.attributes;
        if node.attrs.len() != declared.len() || declared.iter().any(|spec| !node.attrs.contains_key(&spec.key)) {
            return Err(SchemaError::invalid_document(
                path,
                format!("attributes of `{}` do not match its declaration", node.kind),
            ));
        }

        if !node_type.content.matches(node.content.iter().map(|c| c.kind.as_str())) {
            let children: Vec<&str> = node.content.iter().map(|c| c.kind.as_str()).collect();
            return Err(SchemaError::invalid_document(
                path,
                format!(
                    "`{}` cannot hold [{}] (content `{}`)",
                    node.kind,
                    children.join(", "),
                    node_type.content.expression()
                ),
            ));
        }

        for (index, child) in node.content.iter().enumerate() {
            path.push(index);
            if !child.marks.is_empty() && !self.allows_marks(&node.kind) {
                return Err(SchemaError::invalid_document(path, format!("`{}` does not allow marks", node.kind)));
            }
            self.validate_marks(&child.marks, path)?;
            self.validate_node(child, path)?;
            path.pop();
        }
        Ok(())
    }

    fn validate_marks(&self, marks: &[Mark], path: &[usize]) -> SchemaResult<()> {
        for (index, mark) in marks.iter().enumerate() {
            let mark_type = self
                .mark_type(&mark.kind)
                .ok_or_else(|| SchemaError::invalid_document(path, format!("unknown mark `{}`", mark.kind)))?;
            let declared = &mark_type.definition.attributes;
            if mark.attrs.len() != declared.len() || declared.iter().any(|spec| !mark.attrs.contains_key(&spec.key)) {
                return Err(SchemaError::invalid_document(
                    path,
                    format!("attributes of mark `{}` do not match its declaration", mark.kind),
                ));
            }
            let spec = mark_type.spec();
            if marks[index + 1..]
                .iter()
                .any(|other| spec.excludes_mark(&mark.kind, &other.kind))
            {
                return Err(SchemaError::invalid_document(path, format!("mark `{}` appears with a mark it excludes", mark.kind)));
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> SchemaSummary {
        let describe = |definition: &TypeDefinition| -> BTreeMap<String, Value> {
            definition
                .attributes
                .iter()
                .map(|spec| (spec.key.clone(), spec.default.clone()))
                .collect()
        };
        SchemaSummary {
            top_node: self.top_node.clone(),
            fragments: self.fragments.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|node| {
                    let spec = node.spec();
                    NodeSummary {
                        name: node.name().to_string(),
                        group: spec.group.clone(),
                        content: spec.content.clone(),
                        atom: spec.atom,
                        inline: spec.inline,
                        attrs: describe(&node.definition),
                    }
                })
                .collect(),
            marks: self
                .marks
                .iter()
                .map(|mark| {
                    let spec = mark.spec();
                    MarkSummary {
                        name: mark.name().to_string(),
                        inclusive: spec.inclusive,
                        excludes: spec.excludes.clone(),
                        attrs: describe(&mark.definition),
                    }
                })
                .collect(),
            commands: self
                .commands
                .iter()
                .map(|(name, entries)| {
                    let owners = entries
                        .iter()
                        .map(|entry| entry.owner.clone().unwrap_or_else(|| "*".to_string()))
                        .collect();
                    (name.clone(), owners)
                })
                .collect(),
            features: self.features.iter().map(|f| f.name().to_string()).collect(),
        }
    }
}

/// Serializable overview of a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub top_node: String,
    pub fragments: Vec<String>,
    pub nodes: Vec<NodeSummary>,
    pub marks: Vec<MarkSummary>,
    /// Command name to owning types (`*` for fragment-level commands)
    pub commands: BTreeMap<String, Vec<String>>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub atom: bool,
    pub inline: bool,
    pub attrs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkSummary {
    pub name: String,
    pub inclusive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excludes: Option<String>,
    pub attrs: BTreeMap<String, Value>,
}
