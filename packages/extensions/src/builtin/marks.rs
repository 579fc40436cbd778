use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, LoadFuture, Loader, OptionField, OptionKind};
use folio_schema::attribute::{AttrSource, AttrTarget, AttributeSpec};
use folio_schema::base::{simple_mark, string_attribute};
use folio_schema::{
    ArgBinding, CommandKind, CommandSpec, GlobalAttributes, MarkSpec, ParseRule, RenderSpec, SchemaFragment,
    TypeDefinition, TypeRole,
};
use serde_json::{json, Value};

pub const LINK_TYPE_DEFAULT: &str = "external_link";

pub fn highlight() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "highlight",
        "Highlight",
        "@tiptap/extension-highlight",
        ExtensionGroup::Mark,
        Loader::Immediate(load_highlight),
    )
}

pub fn underline() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "underline",
        "Underline",
        "@tiptap/extension-underline",
        ExtensionGroup::Mark,
        Loader::Immediate(load_underline),
    )
}

fn load_highlight(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("highlight").with_definition(simple_mark("highlight", "Highlight", "mark", &["mark"]))
}

fn load_underline(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("underline").with_definition(simple_mark("underline", "Underline", "u", &["u"]))
}

fn load_subscript(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("subscript").with_definition(script_mark("subscript", "Subscript", "sub", "superscript"))
}

fn load_superscript(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("superscript").with_definition(script_mark("superscript", "Superscript", "sup", "subscript"))
}

/// Sub- and superscript exclude each other
fn script_mark(name: &str, title: &str, tag: &str, other: &str) -> TypeDefinition {
    let mut definition = simple_mark(name, title, tag, &[tag]);
    definition.role = TypeRole::Mark(MarkSpec {
        excludes: Some(format!("{} {}", name, other)),
        ..MarkSpec::default()
    });
    definition
}

pub fn subscript() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "subscript",
        "Subscript",
        "@tiptap/extension-subscript",
        ExtensionGroup::Mark,
        Loader::Immediate(load_subscript),
    )
}

pub fn superscript() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "superscript",
        "Superscript",
        "@tiptap/extension-superscript",
        ExtensionGroup::Mark,
        Loader::Immediate(load_superscript),
    )
}

pub fn link() -> ExtensionDescriptor {
    ExtensionDescriptor::new("link", "Link", "custom/link", ExtensionGroup::Mark, Loader::Immediate(load_link))
}

fn link_attribute(key: &str, name: &str) -> AttributeSpec {
    AttributeSpec::new(key, Value::Null)
        .parse_from(string_attribute(name))
        .render_to(vec![AttrTarget::Attribute(name.to_string())])
}

fn load_link(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::mark(
        "link",
        MarkSpec {
            inclusive: false,
            ..MarkSpec::default()
        },
        RenderSpec::tag("a"),
    )
    .with_attribute(link_attribute("href", "href"))
    .with_attribute(link_attribute("target", "target"))
    .with_attribute(link_attribute("rel", "rel"))
    .with_attribute(link_attribute("title", "title"))
    .with_attribute(link_attribute("ariaLabel", "aria-label"))
    .with_attribute(AttributeSpec::new("type", LINK_TYPE_DEFAULT).parse_from(string_attribute("type")))
    .with_parse_rule(ParseRule::tag("a").with_attr_present("href"))
    .with_commands([
        CommandSpec::new(
            "setLink",
            CommandKind::SetMark {
                mark: "link".to_string(),
                binding: ArgBinding::Object,
                extend_empty: true,
            },
        ),
        CommandSpec::new(
            "unsetLink",
            CommandKind::UnsetMark {
                mark: "link".to_string(),
                extend_empty: true,
            },
        ),
    ]);
    SchemaFragment::new("link").with_definition(definition)
}

pub fn text_style() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "textStyle",
        "Text Style",
        "@tiptap/extension-text-style",
        ExtensionGroup::Mark,
        Loader::Immediate(load_text_style),
    )
}

fn load_text_style(_: &ExtensionConfig) -> SchemaFragment {
    let definition = TypeDefinition::mark("textStyle", MarkSpec::default(), RenderSpec::tag("span"))
        .with_parse_rule(ParseRule::tag("span").with_attr_present("style"))
        .with_command(CommandSpec::new(
            "removeEmptyTextStyle",
            CommandKind::RemoveEmptyMark {
                mark: "textStyle".to_string(),
            },
        ));
    SchemaFragment::new("textStyle").with_definition(definition)
}

pub fn color() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "color",
        "Color",
        "@tiptap/extension-color",
        ExtensionGroup::Mark,
        Loader::Deferred(load_color),
    )
    .with_defaults(json!({"types": ["textStyle"]}))
    .with_option(
        OptionField::new("colorTypes", "Target types", OptionKind::Json, json!(["textStyle"]))
            .with_note("Node or mark types where color should be applied (usually textStyle)."),
    )
}

fn load_color(config: ExtensionConfig) -> LoadFuture {
    Box::pin(async move {
        let types = config.string_list("colorTypes", &["textStyle"]);
        let color = AttributeSpec::new("color", Value::Null)
            .parse_from(AttrSource::Style("color".to_string()))
            .render_to(vec![AttrTarget::Style("color".to_string())]);

        Ok(SchemaFragment::new("color")
            .with_global_attributes(GlobalAttributes::new(types, vec![color]))
            .with_command(CommandSpec::new(
                "setColor",
                CommandKind::SetMarkAttribute {
                    mark: "textStyle".to_string(),
                    key: "color".to_string(),
                },
            ))
            .with_command(CommandSpec::new(
                "unsetColor",
                CommandKind::UnsetMarkAttribute {
                    mark: "textStyle".to_string(),
                    key: "color".to_string(),
                },
            )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_markup::Element;

    #[test]
    fn test_link_reads_strings_verbatim() {
        let fragment = load_link(&ExtensionConfig::new());
        let link = &fragment.definitions[0];
        let element = Element::new("a")
            .with_attribute("href", "123")
            .with_attribute("aria-label", "Docs");

        let href = link.attribute("href").unwrap();
        assert_eq!(href.parse(&element), json!("123"));
        assert_eq!(link.attribute("ariaLabel").unwrap().parse(&element), json!("Docs"));
        assert_eq!(link.attribute("type").unwrap().parse(&element), json!(LINK_TYPE_DEFAULT));
        assert!(!link.mark_spec().unwrap().inclusive);
    }

    #[tokio::test]
    async fn test_color_targets_configured_types() {
        let config = ExtensionConfig::new().with("colorTypes", json!(["textStyle", "heading"]));
        let fragment = color().load(&config).await.unwrap();

        assert_eq!(fragment.global_attributes[0].types, vec!["textStyle", "heading"]);
        assert_eq!(fragment.commands.len(), 2);
    }

    #[test]
    fn test_scripts_exclude_each_other() {
        let sub = script_mark("subscript", "Subscript", "sub", "superscript");
        let spec = sub.mark_spec().unwrap();

        assert!(spec.excludes_mark("subscript", "superscript"));
        assert!(spec.excludes_mark("subscript", "subscript"));
        assert!(!spec.excludes_mark("subscript", "bold"));
    }
}
