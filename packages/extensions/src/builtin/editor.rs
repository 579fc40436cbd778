//! Editor-level extensions. They contribute features instead of types;
//! `uniqueId` also adds its id attribute to the configured types.

use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, LoadFuture, Loader, OptionField, OptionKind};
use folio_schema::attribute::{AttrTarget, AttributeSpec};
use folio_schema::base::string_attribute;
use folio_schema::{Feature, FocusMode, GlobalAttributes, SchemaFragment};
use serde_json::{json, Value};

pub const PLACEHOLDER_TEXT: &str = "Write something …";
pub const FOCUS_CLASS: &str = "has-focus";
pub const UNIQUE_ID_ATTRIBUTE: &str = "id";
pub const UNIQUE_ID_TYPES: [&str; 2] = ["heading", "paragraph"];

pub fn placeholder() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "placeholder",
        "Placeholder",
        "@tiptap/extension-placeholder",
        ExtensionGroup::Editor,
        Loader::Immediate(load_placeholder),
    )
    .with_defaults(json!({"placeholder": PLACEHOLDER_TEXT}))
    .with_option(OptionField::new("placeholder", "Placeholder", OptionKind::String, PLACEHOLDER_TEXT))
}

fn load_placeholder(config: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("placeholder").with_feature(Feature::Placeholder {
        text: config.string("placeholder", PLACEHOLDER_TEXT),
    })
}

pub fn focus() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "focus",
        "Focus",
        "@tiptap/extension-focus",
        ExtensionGroup::Editor,
        Loader::Immediate(load_focus),
    )
    .with_defaults(json!({"className": FOCUS_CLASS, "mode": "all"}))
    .with_option(OptionField::new("focusClassName", "Focus class name", OptionKind::String, FOCUS_CLASS))
    .with_option(
        OptionField::new("focusMode", "Focus mode", OptionKind::String, "all")
            .with_note("all, deepest or shallowest"),
    )
}

fn load_focus(config: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("focus").with_feature(Feature::Focus {
        class_name: config.string("focusClassName", FOCUS_CLASS),
        mode: FocusMode::parse(&config.string("focusMode", "all")),
    })
}

pub fn typography() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "typography",
        "Typography",
        "@tiptap/extension-typography",
        ExtensionGroup::Editor,
        Loader::Immediate(load_typography),
    )
}

fn load_typography(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("typography").with_feature(Feature::Typography)
}

pub fn character_count() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "characterCount",
        "Character Count",
        "@tiptap/extension-character-count",
        ExtensionGroup::Editor,
        Loader::Immediate(load_character_count),
    )
    .with_defaults(json!({"limit": null}))
    .with_option(
        OptionField::new("characterCountLimit", "Character limit", OptionKind::Json, Value::Null)
            .with_note("Maximum number of characters, empty for no limit"),
    )
}

fn load_character_count(config: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("characterCount").with_feature(Feature::CharacterCount {
        limit: config.json("characterCountLimit", None),
    })
}

pub fn unique_id() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "uniqueId",
        "Unique ID",
        "@tiptap/extension-unique-id",
        ExtensionGroup::Editor,
        Loader::Deferred(load_unique_id),
    )
    .with_defaults(json!({"attributeName": UNIQUE_ID_ATTRIBUTE, "types": UNIQUE_ID_TYPES}))
    .with_option(
        OptionField::new(
            "uniqueIdAttributeName",
            "Unique ID attribute name",
            OptionKind::String,
            UNIQUE_ID_ATTRIBUTE,
        )
        .with_note("Name of the attribute that is attached to the HTML tag"),
    )
    .with_option(
        OptionField::new("uniqueIdTypes", "Unique ID types", OptionKind::Json, json!(UNIQUE_ID_TYPES))
            .with_note("All types that should get a unique ID"),
    )
}

fn load_unique_id(config: ExtensionConfig) -> LoadFuture {
    Box::pin(async move {
        let attribute = config.string("uniqueIdAttributeName", UNIQUE_ID_ATTRIBUTE);
        let types = config.string_list("uniqueIdTypes", &UNIQUE_ID_TYPES);
        let markup_name = format!("data-{}", attribute);
        let spec = AttributeSpec::new(attribute.as_str(), Value::Null)
            .parse_from(string_attribute(&markup_name))
            .render_to(vec![AttrTarget::Attribute(markup_name.clone())])
            .keep_on_split(false);

        Ok(SchemaFragment::new("uniqueId")
            .with_global_attributes(GlobalAttributes::new(types.clone(), vec![spec]))
            .with_feature(Feature::UniqueId { attribute, types }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_id_uses_data_attribute() {
        let config = ExtensionConfig::new().with("uniqueIdAttributeName", "uid");
        let fragment = unique_id().load(&config).await.unwrap();
        let spec = &fragment.global_attributes[0].attributes[0];

        assert_eq!(spec.key, "uid");
        assert!(!spec.keep_on_split);
        assert_eq!(
            fragment.features,
            vec![Feature::UniqueId {
                attribute: "uid".to_string(),
                types: vec!["heading".to_string(), "paragraph".to_string()],
            }]
        );
    }

    #[test]
    fn test_focus_mode_falls_back_to_all() {
        let fragment = load_focus(&ExtensionConfig::new().with("focusMode", "sideways"));
        assert_eq!(
            fragment.features[0],
            Feature::Focus {
                class_name: FOCUS_CLASS.to_string(),
                mode: FocusMode::All,
            }
        );
    }

    #[test]
    fn test_character_limit() {
        let fragment = load_character_count(&ExtensionConfig::new().with("characterCountLimit", 280));
        assert_eq!(fragment.features[0], Feature::CharacterCount { limit: Some(280) });
    }
}
