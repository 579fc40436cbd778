//! # Node and mark definitions
//!
//! A [`TypeDefinition`] is one named schema fragment: a structural contract
//! ([`NodeSpec`] or [`MarkSpec`]), attribute descriptors, markup rules and
//! commands. Definitions are plain values. Deriving one from another is an
//! explicit merge of a base with a [`DefinitionDelta`]:
//!
//! - attributes: union, same key from the delta wins
//! - commands: union, same name from the delta wins
//! - contract, parse rules, render: replaced only when the delta sets them
//!
//! Anything the delta does not mention is kept exactly as in the base.

use crate::attribute::{upsert_attribute, AttributeSpec};
use crate::command::{upsert_command, CommandSpec};
use crate::dom::{ParseRule, RenderSpec};

/// Structural contract of a node type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeSpec {
    /// Space separated group names (`block`, `inline`, `list`)
    pub group: Option<String>,
    /// Content expression; `None` for leaves
    pub content: Option<String>,
    pub inline: bool,
    pub atom: bool,
    pub selectable: bool,
    pub draggable: bool,
    pub defining: bool,
    pub isolating: bool,
    pub top_node: bool,
    /// Holds code: no marks, whitespace preserved
    pub code: bool,
}

impl NodeSpec {
    pub fn block(content: &str) -> Self {
        Self {
            group: Some("block".to_string()),
            content: Some(content.to_string()),
            selectable: true,
            ..Self::default()
        }
    }

    pub fn textblock() -> Self {
        Self::block("inline*")
    }

    /// Childless block such as a spacer or an image
    pub fn block_atom() -> Self {
        Self {
            group: Some("block".to_string()),
            atom: true,
            selectable: true,
            ..Self::default()
        }
    }

    pub fn inline_atom() -> Self {
        Self {
            group: Some("inline".to_string()),
            inline: true,
            atom: true,
            selectable: true,
            ..Self::default()
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.group.as_deref().unwrap_or_default().split_whitespace()
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups().any(|g| g == group)
    }

    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }
}

/// Structural contract of a mark type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpec {
    /// Typing at the mark's end continues it
    pub inclusive: bool,
    /// Space separated mark names this mark cannot coexist with; `_` for all.
    /// `None` excludes only other marks of the same type.
    pub excludes: Option<String>,
    /// Can stretch across several adjacent nodes in output
    pub spanning: bool,
}

impl Default for MarkSpec {
    fn default() -> Self {
        Self {
            inclusive: true,
            excludes: None,
            spanning: true,
        }
    }
}

impl MarkSpec {
    pub fn excludes_mark(&self, own_name: &str, other: &str) -> bool {
        match &self.excludes {
            None => own_name == other,
            Some(list) => list
                .split_whitespace()
                .any(|name| name == "_" || name == other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRole {
    Node(NodeSpec),
    Mark(MarkSpec),
}

impl TypeRole {
    pub fn as_node(&self) -> Option<&NodeSpec> {
        match self {
            TypeRole::Node(spec) => Some(spec),
            TypeRole::Mark(_) => None,
        }
    }

    pub fn as_mark(&self) -> Option<&MarkSpec> {
        match self {
            TypeRole::Mark(spec) => Some(spec),
            TypeRole::Node(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeRole::Node(_) => "node",
            TypeRole::Mark(_) => "mark",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub role: TypeRole,
    pub attributes: Vec<AttributeSpec>,
    pub parse_rules: Vec<ParseRule>,
    pub render: RenderSpec,
    pub commands: Vec<CommandSpec>,
}

impl TypeDefinition {
    pub fn node(name: impl Into<String>, spec: NodeSpec, render: RenderSpec) -> Self {
        Self {
            name: name.into(),
            role: TypeRole::Node(spec),
            attributes: Vec::new(),
            parse_rules: Vec::new(),
            render,
            commands: Vec::new(),
        }
    }

    pub fn mark(name: impl Into<String>, spec: MarkSpec, render: RenderSpec) -> Self {
        Self {
            name: name.into(),
            role: TypeRole::Mark(spec),
            attributes: Vec::new(),
            parse_rules: Vec::new(),
            render,
            commands: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, spec: AttributeSpec) -> Self {
        upsert_attribute(&mut self.attributes, spec);
        self
    }

    pub fn with_parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse_rules.push(rule);
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        upsert_command(&mut self.commands, command);
        self
    }

    pub fn with_commands(mut self, commands: impl IntoIterator<Item = CommandSpec>) -> Self {
        for command in commands {
            upsert_command(&mut self.commands, command);
        }
        self
    }

    pub fn is_node(&self) -> bool {
        matches!(self.role, TypeRole::Node(_))
    }

    pub fn is_mark(&self) -> bool {
        matches!(self.role, TypeRole::Mark(_))
    }

    pub fn node_spec(&self) -> Option<&NodeSpec> {
        self.role.as_node()
    }

    pub fn mark_spec(&self) -> Option<&MarkSpec> {
        self.role.as_mark()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|spec| spec.key == key)
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// New definition from this one plus `delta`
    pub fn derive(&self, delta: DefinitionDelta) -> TypeDefinition {
        let mut derived = self.clone();
        if let Some(name) = delta.name {
            derived.name = name;
        }
        if let Some(role) = delta.role {
            derived.role = role;
        }
        for spec in delta.attributes {
            upsert_attribute(&mut derived.attributes, spec);
        }
        derived
            .attributes
            .retain(|spec| !delta.removed_attributes.contains(&spec.key));
        if let Some(rules) = delta.parse_rules {
            derived.parse_rules = rules;
        }
        if let Some(render) = delta.render {
            derived.render = render;
        }
        for command in delta.commands {
            upsert_command(&mut derived.commands, command);
        }
        derived
    }
}

/// Overrides applied on top of a base definition by [`TypeDefinition::derive`]
#[derive(Debug, Clone, Default)]
pub struct DefinitionDelta {
    pub name: Option<String>,
    pub role: Option<TypeRole>,
    pub attributes: Vec<AttributeSpec>,
    pub removed_attributes: Vec<String>,
    pub parse_rules: Option<Vec<ParseRule>>,
    pub render: Option<RenderSpec>,
    pub commands: Vec<CommandSpec>,
}

impl DefinitionDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn role(mut self, role: TypeRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    pub fn remove_attribute(mut self, key: impl Into<String>) -> Self {
        self.removed_attributes.push(key.into());
        self
    }

    pub fn parse_rules(mut self, rules: Vec<ParseRule>) -> Self {
        self.parse_rules = Some(rules);
        self
    }

    pub fn render(mut self, render: RenderSpec) -> Self {
        self.render = Some(render);
        self
    }

    pub fn command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = CommandSpec>) -> Self {
        self.commands.extend(commands);
        self
    }
}

/// Attributes a fragment adds to types it does not own (text alignment on
/// paragraphs and headings, ids, colors on `textStyle`)
#[derive(Debug, Clone)]
pub struct GlobalAttributes {
    pub types: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
}

impl GlobalAttributes {
    pub fn new(types: Vec<String>, attributes: Vec<AttributeSpec>) -> Self {
        Self { types, attributes }
    }
}
