//! Collapsible `details` blocks: a summary line followed by content.

use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, Loader, OptionField, OptionKind};
use folio_schema::attribute::{AttrSource, AttrTarget, AttributeSpec};
use folio_schema::dom::attributes;
use folio_schema::{CommandKind, CommandSpec, DetailsTypes, NodeSpec, ParseRule, RenderSpec, SchemaFragment, TypeDefinition};
use serde_json::json;

pub fn details() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "details",
        "Details",
        "@tiptap/extension-details",
        ExtensionGroup::Node,
        Loader::Immediate(load_details),
    )
    .with_defaults(json!({"open": false}))
    .with_option(
        OptionField::new("detailsOpen", "Open by default", OptionKind::Boolean, false)
            .with_note("Whether new details blocks start expanded"),
    )
}

fn load_details(config: &ExtensionConfig) -> SchemaFragment {
    let open = config.boolean("detailsOpen", false);
    let types = DetailsTypes::default();

    let definition = TypeDefinition::node(
        &types.details,
        NodeSpec {
            defining: true,
            isolating: true,
            ..NodeSpec::block(&format!("{} {}", types.summary, types.content))
        },
        RenderSpec::tag("details"),
    )
    .with_attribute(
        AttributeSpec::new("open", open)
            .parse_from(AttrSource::Present("open".to_string()))
            .render_to(vec![AttrTarget::Boolean("open".to_string())]),
    )
    .with_parse_rule(ParseRule::tag("details"))
    .with_commands([
        CommandSpec::new("setDetails", CommandKind::SetDetails(types.clone())),
        CommandSpec::new("unsetDetails", CommandKind::UnsetDetails(types.clone())),
        CommandSpec::new("toggleDetails", CommandKind::ToggleDetails { types, open }),
    ]);
    SchemaFragment::new("details").with_definition(definition)
}

pub fn details_summary() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "detailsSummary",
        "Details Summary",
        "@tiptap/extension-details-summary",
        ExtensionGroup::Node,
        Loader::Immediate(load_details_summary),
    )
}

fn load_details_summary(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::node(
        "detailsSummary",
        NodeSpec {
            group: None,
            defining: true,
            isolating: true,
            ..NodeSpec::block("text*")
        },
        RenderSpec::tag("summary"),
    )
    .with_parse_rule(ParseRule::tag("summary"));
    SchemaFragment::new("detailsSummary").with_definition(definition)
}

pub fn details_content() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "detailsContent",
        "Details Content",
        "@tiptap/extension-details-content",
        ExtensionGroup::Node,
        Loader::Immediate(load_details_content),
    )
}

fn load_details_content(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::node(
        "detailsContent",
        NodeSpec {
            group: None,
            defining: true,
            ..NodeSpec::block("block+")
        },
        RenderSpec::tag_with("div", attributes([("data-type", "detailsContent")])),
    )
    .with_parse_rule(ParseRule::tag("div").with_attr_equals("data-type", "detailsContent"));
    SchemaFragment::new("detailsContent").with_definition(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_open_default_comes_from_config() {
        let closed = load_details(&ExtensionConfig::new());
        let open = load_details(&ExtensionConfig::new().with("detailsOpen", true));

        assert_eq!(closed.definitions[0].attribute("open").unwrap().default, Value::Bool(false));
        assert_eq!(open.definitions[0].attribute("open").unwrap().default, Value::Bool(true));
        assert_eq!(closed.definitions[0].commands.len(), 3);

        let toggle = |fragment: &SchemaFragment| {
            fragment.definitions[0]
                .commands
                .iter()
                .find(|command| command.name == "toggleDetails")
                .map(|command| command.kind.clone())
        };
        assert!(matches!(toggle(&open), Some(CommandKind::ToggleDetails { open: true, .. })));
        assert!(matches!(toggle(&closed), Some(CommandKind::ToggleDetails { open: false, .. })));
    }
}
