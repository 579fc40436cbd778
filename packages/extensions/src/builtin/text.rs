//! Block text extensions: variant-aware paragraph, heading and lists, plus
//! text alignment.

use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, Loader, OptionField, OptionKind};
use folio_markup::Element;
use folio_schema::attribute::{AttrSource, AttrTarget, AttributeSpec};
use folio_schema::base::{self, class_from};
use folio_schema::{ArgBinding, CommandKind, CommandSpec, DefinitionDelta, GlobalAttributes, SchemaFragment};
use serde_json::{json, Value};
use std::sync::Arc;

pub const TEXT_ALIGN_TYPES: [&str; 2] = ["heading", "paragraph"];
pub const TEXT_ALIGNMENTS: [&str; 4] = ["left", "center", "right", "justify"];

/// `spaceBefore`/`spaceAfter` as `data-space-before`/`data-space-after`
fn spacing(delta: DefinitionDelta) -> DefinitionDelta {
    delta
        .attribute(AttributeSpec::data("spaceBefore", Value::Null))
        .attribute(AttributeSpec::data("spaceAfter", Value::Null))
        .command(CommandSpec::new(
            "setSpacing",
            CommandKind::UpdateAttributes {
                binding: ArgBinding::fields(&[("before", "spaceBefore"), ("after", "spaceAfter")]),
            },
        ))
}

fn set_variant(name: &str) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandKind::UpdateAttributes {
            binding: ArgBinding::Value("variant".to_string()),
        },
    )
}

pub fn paragraph() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "paragraph",
        "Paragraph",
        "custom/paragraph-variant",
        ExtensionGroup::Node,
        Loader::Immediate(load_paragraph),
    )
}

fn load_paragraph(_: &ExtensionConfig) -> SchemaFragment {
    let variant = AttributeSpec::data("variant", Value::Null).with_target(AttrTarget::Class("paragraph-".to_string()));
    let delta = spacing(DefinitionDelta::new().attribute(variant).command(set_variant("setParagraphVariant")));
    SchemaFragment::new("paragraph").with_definition(base::paragraph().derive(delta))
}

pub fn heading() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "heading",
        "Heading",
        "custom/heading",
        ExtensionGroup::Node,
        Loader::Immediate(load_heading),
    )
}

fn load_heading(_: &ExtensionConfig) -> SchemaFragment {
    // a variant heading carries its level as a class, `heading2`
    let variant = AttributeSpec::data("variant", Value::Null).with_target(class_from("heading", "level"));
    let delta = spacing(DefinitionDelta::new().attribute(variant).command(set_variant("setHeadingVariant")));
    SchemaFragment::new("heading").with_definition(base::heading().derive(delta))
}

fn list_variant(default: &str) -> AttributeSpec {
    AttributeSpec::data("variant", default).with_target(AttrTarget::Class("list-variant-".to_string()))
}

pub fn bullet_list() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "bulletList",
        "Bullet List",
        "custom/bullet-list",
        ExtensionGroup::Node,
        Loader::Immediate(load_bullet_list),
    )
}

fn load_bullet_list(_: &ExtensionConfig) -> SchemaFragment {
    let delta = spacing(
        DefinitionDelta::new()
            .attribute(list_variant("default"))
            .command(set_variant("setListVariant")),
    );
    SchemaFragment::new("bulletList").with_definition(base::bullet_list().derive(delta))
}

pub fn ordered_list() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "orderedList",
        "Ordered List",
        "custom/ordered-list",
        ExtensionGroup::Node,
        Loader::Immediate(load_ordered_list),
    )
}

fn load_ordered_list(_: &ExtensionConfig) -> SchemaFragment {
    let delta = spacing(
        DefinitionDelta::new()
            .attribute(list_variant("decimal"))
            .command(set_variant("setListVariant")),
    );
    SchemaFragment::new("orderedList").with_definition(base::ordered_list().derive(delta))
}

pub fn text_align() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "textAlign",
        "Text Align",
        "@tiptap/extension-text-align",
        ExtensionGroup::Node,
        Loader::Immediate(load_text_align),
    )
    .with_defaults(json!({"types": TEXT_ALIGN_TYPES, "alignments": TEXT_ALIGNMENTS}))
    .with_option(
        OptionField::new("textAlignTypes", "Text align types", OptionKind::Json, json!(TEXT_ALIGN_TYPES))
            .with_note("Node types that can be aligned"),
    )
    .with_option(OptionField::new(
        "textAlignAlignments",
        "Alignments",
        OptionKind::Json,
        json!(TEXT_ALIGNMENTS),
    ))
}

fn load_text_align(config: &ExtensionConfig) -> SchemaFragment {
    let types = config.string_list("textAlignTypes", &TEXT_ALIGN_TYPES);
    let alignments = config.string_list("textAlignAlignments", &TEXT_ALIGNMENTS);
    let default = alignments.first().cloned().unwrap_or_else(|| "left".to_string());

    let allowed = alignments.clone();
    let parse = move |element: &Element| {
        element
            .style("text-align")
            .filter(|align| allowed.contains(align))
            .map(Value::String)
    };
    let text_align = AttributeSpec::new("textAlign", default)
        .parse_from(AttrSource::Custom(Arc::new(parse)))
        .render_to(vec![AttrTarget::Style("text-align".to_string())]);

    SchemaFragment::new("textAlign")
        .with_global_attributes(GlobalAttributes::new(types.clone(), vec![text_align]))
        .with_command(CommandSpec::new(
            "setTextAlign",
            CommandKind::SetGlobalAttribute {
                key: "textAlign".to_string(),
                types: types.clone(),
                allowed: alignments.into_iter().map(Value::String).collect(),
            },
        ))
        .with_command(CommandSpec::new(
            "unsetTextAlign",
            CommandKind::ResetGlobalAttribute {
                key: "textAlign".to_string(),
                types,
            },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_schema::attribute::render_attributes;
    use folio_model::Attrs;

    #[test]
    fn test_heading_variant_renders_level_class() {
        let fragment = load_heading(&ExtensionConfig::new());
        let heading = &fragment.definitions[0];
        let mut attrs = Attrs::new();
        attrs.insert("level".to_string(), json!(2));
        attrs.insert("variant".to_string(), json!("display"));

        let rendered = render_attributes(&heading.attributes, &attrs);
        assert_eq!(rendered["class"], "heading2");
        assert_eq!(rendered["data-variant"], "display");

        attrs.insert("variant".to_string(), Value::Null);
        assert!(render_attributes(&heading.attributes, &attrs).is_empty());
    }

    #[test]
    fn test_list_variant_default_is_omitted() {
        let fragment = load_bullet_list(&ExtensionConfig::new());
        let list = &fragment.definitions[0];
        let mut attrs = Attrs::new();
        attrs.insert("variant".to_string(), json!("default"));
        assert!(render_attributes(&list.attributes, &attrs).is_empty());

        attrs.insert("variant".to_string(), json!("dash"));
        let rendered = render_attributes(&list.attributes, &attrs);
        assert_eq!(rendered["class"], "list-variant-dash");
        assert_eq!(rendered["data-variant"], "dash");
    }

    #[test]
    fn test_text_align_reads_configured_alignments() {
        let config = ExtensionConfig::new().with("textAlignAlignments", json!(["left", "center"]));
        let fragment = load_text_align(&config);
        let spec = &fragment.global_attributes[0].attributes[0];

        let centered = Element::new("p").with_attribute("style", "text-align: center");
        let justified = Element::new("p").with_attribute("style", "text-align: justify");
        assert_eq!(spec.parse(&centered), json!("center"));
        assert_eq!(spec.parse(&justified), json!("left"));
        assert_eq!(fragment.global_attributes[0].types, vec!["heading", "paragraph"]);
    }
}
