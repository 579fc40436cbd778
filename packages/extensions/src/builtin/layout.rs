//! Multi-column layout blocks and vertical spacers.

use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, Loader};
use folio_markup::Element;
use folio_schema::attribute::{AttrSource, AttrTarget, AttributeSpec};
use folio_schema::dom::{attributes, with_fixed};
use folio_schema::{
    ArgBinding, CommandKind, CommandSpec, DomSpec, NodeSpec, ParseRule, RenderSpec, SchemaFragment, TypeDefinition,
};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_COLUMNS: usize = 2;

pub fn layout() -> ExtensionDescriptor {
    ExtensionDescriptor::new("layout", "Layout", "custom/layout", ExtensionGroup::Node, Loader::Immediate(load_layout))
}

/// `data-columns`, anything unparseable or zero reads as the default
fn column_count(element: &Element) -> Option<Value> {
    element
        .attribute("data-columns")
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|count| *count > 0)
        .map(Value::from)
}

fn load_layout(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::node(
        "layout",
        NodeSpec {
            defining: true,
            isolating: true,
            ..NodeSpec::block("layoutColumn+")
        },
        RenderSpec::tag_with("div", attributes([("data-type", "layout-block"), ("class", "layout-block")])),
    )
    .with_attribute(
        AttributeSpec::new("columns", DEFAULT_COLUMNS)
            .parse_from(AttrSource::Custom(Arc::new(column_count)))
            .render_to(vec![AttrTarget::Attribute("data-columns".to_string())]),
    )
    .with_parse_rule(ParseRule::tag("div").with_attr_equals("data-type", "layout-block"))
    .with_commands([
        CommandSpec::new(
            "insertLayout",
            CommandKind::InsertColumns {
                node_type: "layout".to_string(),
                column_type: "layoutColumn".to_string(),
                count_key: "columns".to_string(),
                default_count: DEFAULT_COLUMNS,
            },
        ),
        CommandSpec::new(
            "setLayout",
            CommandKind::ResizeColumns {
                node_type: "layout".to_string(),
                column_type: "layoutColumn".to_string(),
                count_key: "columns".to_string(),
            },
        ),
        CommandSpec::new(
            "unsetLayout",
            CommandKind::RemoveAncestor {
                node_type: "layout".to_string(),
            },
        ),
    ]);
    SchemaFragment::new("layout").with_definition(definition)
}

pub fn layout_column() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "layoutColumn",
        "Layout Column",
        "custom/layout-column",
        ExtensionGroup::Node,
        Loader::Immediate(load_layout_column),
    )
}

fn style_attribute(key: &str, property: &str, default: &str) -> AttributeSpec {
    AttributeSpec::new(key, default)
        .parse_from(AttrSource::Style(property.to_string()))
        .render_to(vec![AttrTarget::Style(property.to_string())])
}

fn update(name: &str, key: &str) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandKind::UpdateAttributes {
            binding: ArgBinding::Value(key.to_string()),
        },
    )
}

fn load_layout_column(_: &ExtensionConfig) -> SchemaFragment {
    // only reachable inside a layout, so no group
    let definition = TypeDefinition::node(
        "layoutColumn",
        NodeSpec {
            group: None,
            defining: true,
            isolating: true,
            ..NodeSpec::block("block+")
        },
        RenderSpec::tag_with("div", attributes([("data-type", "layout-column"), ("class", "layout-column")])),
    )
    .with_attribute(style_attribute("justifyContent", "justify-content", "flex-start"))
    .with_attribute(style_attribute("alignItems", "align-items", "stretch"))
    .with_parse_rule(ParseRule::tag("div").with_attr_equals("data-type", "layout-column"))
    .with_commands([
        update("setColumnJustify", "justifyContent"),
        update("setColumnAlign", "alignItems"),
    ]);
    SchemaFragment::new("layoutColumn").with_definition(definition)
}

pub fn spacer() -> ExtensionDescriptor {
    ExtensionDescriptor::new("spacer", "Spacer", "custom/spacer", ExtensionGroup::Node, Loader::Immediate(load_spacer))
}

fn load_spacer(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::node(
        "spacer",
        NodeSpec::block_atom(),
        RenderSpec::custom(|attrs, rendered| {
            let variant = attrs.get("variant").and_then(Value::as_str).unwrap_or("md");
            let mut fixed = attributes([("data-type", "spacer")]);
            fixed.insert("class".to_string(), format!("spacer spacer-{}", variant));
            DomSpec::new("div", with_fixed(&fixed, rendered))
        }),
    )
    .with_attribute(AttributeSpec::data("variant", "md"))
    .with_parse_rule(ParseRule::tag("div").with_attr_equals("data-type", "spacer"))
    .with_command(CommandSpec::new(
        "insertSpacer",
        CommandKind::InsertNode {
            node_type: "spacer".to_string(),
            binding: ArgBinding::Value("variant".to_string()),
        },
    ));
    SchemaFragment::new("spacer").with_definition(definition)
}
