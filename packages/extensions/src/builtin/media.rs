//! Image and video nodes bound to external assets.

use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, Loader, OptionField, OptionKind};
use folio_markup::{Attributes, Element};
use folio_schema::attribute::{AttrSource, AttrTarget, AttributeSpec};
use folio_schema::base::string_attribute;
use folio_schema::dom::{attributes, with_fixed};
use folio_schema::{ArgBinding, CommandKind, CommandSpec, DomSpec, NodeSpec, ParseRule, RenderSpec, SchemaFragment, TypeDefinition};
use serde_json::{json, Value};
use std::sync::Arc;

pub const CAPTIONS_LANG: &str = "en";
pub const CAPTIONS_LABEL: &str = "English";

fn upsert(name: &str, node_type: &str) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandKind::Upsert {
            node_type: node_type.to_string(),
            binding: ArgBinding::Resource("src".to_string()),
        },
    )
}

fn media_rule(tag: &str, allow_base64: bool) -> ParseRule {
    let rule = ParseRule::tag(tag).with_attr_present("src");
    if allow_base64 {
        rule
    } else {
        rule.with_attr_not_prefix("src", "data:")
    }
}

fn text_attribute(key: &str) -> AttributeSpec {
    AttributeSpec::new(key, Value::Null).parse_from(string_attribute(key))
}

pub fn image() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "image",
        "Image",
        "@tiptap/extension-image",
        ExtensionGroup::Node,
        Loader::Immediate(load_image),
    )
    .with_defaults(json!({"inline": false, "allowBase64": false}))
    .with_option(OptionField::new("imageInline", "Inline images", OptionKind::Boolean, false))
    .with_option(
        OptionField::new("imageAllowBase64", "Allow base64 images", OptionKind::Boolean, false)
            .with_note("Accept images embedded as data URLs"),
    )
}

fn load_image(config: &ExtensionConfig) -> SchemaFragment {
    let inline = config.boolean("imageInline", false);
    let allow_base64 = config.boolean("imageAllowBase64", false);
    let spec = if inline {
        NodeSpec::inline_atom()
    } else {
        NodeSpec::block_atom()
    };

    let definition = TypeDefinition::node(
        "image",
        NodeSpec { draggable: true, ..spec },
        RenderSpec::leaf("img"),
    )
    .with_attribute(text_attribute("src"))
    .with_attribute(text_attribute("alt"))
    .with_attribute(text_attribute("title"))
    .with_parse_rule(media_rule("img", allow_base64))
    .with_command(upsert("setImage", "image"));
    SchemaFragment::new("image").with_definition(definition)
}

pub fn video() -> ExtensionDescriptor {
    ExtensionDescriptor::new("video", "Video", "custom/video", ExtensionGroup::Node, Loader::Immediate(load_video))
}

/// `<video controls>` and `controls="true"` read as on, `controls="false"` as off
fn controls(element: &Element) -> Option<Value> {
    element
        .attribute("controls")
        .map(|raw| Value::Bool(raw != "false"))
}

/// Captions come from the first `track` child
fn track_value(read: fn(&Element) -> Option<Value>) -> AttrSource {
    AttrSource::Custom(Arc::new(move |element: &Element| {
        element
            .children
            .iter()
            .filter_map(|child| child.as_element())
            .find(|child| child.tag == "track")
            .and_then(read)
    }))
}

fn captions_attribute(key: &str, default: impl Into<Value>, read: fn(&Element) -> Option<Value>) -> AttributeSpec {
    AttributeSpec::new(key, default)
        .parse_from(track_value(read))
        .render_to(Vec::new())
}

fn render_video(attrs: &folio_model::Attrs, rendered: Attributes) -> DomSpec {
    let video = DomSpec::new("video", with_fixed(&attributes([("controls", "")]), rendered));
    let Some(src) = attrs.get("captionsSrc").and_then(Value::as_str) else {
        return video;
    };

    let text = |key: &str, fallback: &str| {
        attrs
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    let mut track = attributes([("kind", "captions"), ("src", src)]);
    track.insert("srclang".to_string(), text("captionsLang", CAPTIONS_LANG));
    track.insert("label".to_string(), text("captionsLabel", CAPTIONS_LABEL));
    if attrs.get("captionsDefault").and_then(Value::as_bool).unwrap_or(false) {
        track.insert("default".to_string(), String::new());
    }
    video.with_child(DomSpec::new("track", track))
}

fn load_video(_: &ExtensionConfig) -> SchemaFragment {
    let flag = |key: &str| {
        AttributeSpec::new(key, false)
            .parse_from(AttrSource::Present(key.to_string()))
            .render_to(vec![AttrTarget::Boolean(key.to_string())])
    };

    let definition = TypeDefinition::node(
        "video",
        NodeSpec {
            draggable: true,
            ..NodeSpec::block_atom()
        },
        RenderSpec::custom(render_video),
    )
    .with_attribute(text_attribute("src"))
    .with_attribute(AttributeSpec::new("controls", true).parse_from(AttrSource::Custom(Arc::new(controls))))
    .with_attribute(flag("autoplay"))
    .with_attribute(flag("loop"))
    .with_attribute(flag("muted"))
    .with_attribute(captions_attribute("captionsSrc", Value::Null, |track| {
        track.attribute("src").map(|src| Value::String(src.to_string()))
    }))
    .with_attribute(captions_attribute("captionsLang", CAPTIONS_LANG, |track| {
        track.attribute("srclang").map(|lang| Value::String(lang.to_string()))
    }))
    .with_attribute(captions_attribute("captionsLabel", CAPTIONS_LABEL, |track| {
        track.attribute("label").map(|label| Value::String(label.to_string()))
    }))
    .with_attribute(captions_attribute("captionsDefault", false, |track| {
        Some(Value::Bool(track.has_attribute("default")))
    }))
    .with_parse_rule(media_rule("video", false))
    .with_command(upsert("setVideo", "video"));
    SchemaFragment::new("video").with_definition(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Attrs;
    use folio_schema::attribute::{parse_attributes, render_attributes};

    fn video_definition() -> TypeDefinition {
        load_video(&ExtensionConfig::new()).definitions.remove(0)
    }

    #[test]
    fn test_video_renders_track_for_captions() {
        let video = video_definition();
        let mut attrs = Attrs::new();
        attrs.insert("src".to_string(), json!("/assets/abc"));
        attrs.insert("controls".to_string(), json!(true));
        attrs.insert("loop".to_string(), json!(true));
        attrs.insert("captionsSrc".to_string(), json!("/assets/subs"));
        attrs.insert("captionsDefault".to_string(), json!(true));

        let spec = video.render.render(&attrs, render_attributes(&video.attributes, &attrs));
        assert_eq!(spec.attributes["src"], "/assets/abc");
        assert_eq!(spec.attributes["controls"], "");
        assert_eq!(spec.attributes["loop"], "");
        assert!(!spec.attributes.contains_key("captionsSrc"));

        let track = &spec.children[0];
        assert_eq!(track.attributes["srclang"], "en");
        assert_eq!(track.attributes["label"], "English");
        assert!(track.attributes.contains_key("default"));
    }

    #[test]
    fn test_video_reads_track_and_flags() {
        let video = video_definition();
        let element = Element::new("video")
            .with_attribute("src", "/assets/abc")
            .with_attribute("controls", "false")
            .with_attribute("muted", "")
            .with_child(
                Element::new("track")
                    .with_attribute("src", "/assets/subs")
                    .with_attribute("srclang", "de")
                    .with_attribute("label", "Deutsch"),
            );

        let attrs = parse_attributes(&video.attributes, &element);
        assert_eq!(attrs["controls"], json!(false));
        assert_eq!(attrs["muted"], json!(true));
        assert_eq!(attrs["autoplay"], json!(false));
        assert_eq!(attrs["captionsLang"], json!("de"));
        assert_eq!(attrs["captionsDefault"], json!(false));
    }

    #[test]
    fn test_data_urls_need_opt_in() {
        let element = Element::new("img").with_attribute("src", "data:image/png;base64,AA");
        assert!(media_rule("img", false).matches(&element).is_none());
        assert!(media_rule("img", true).matches(&element).is_some());

        let inline = load_image(&ExtensionConfig::new().with("imageInline", true));
        assert!(inline.definitions[0].node_spec().unwrap().inline);
    }
}
