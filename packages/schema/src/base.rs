//! # Base schema
//!
//! The fixed minimal schema every build starts from. Extensions may replace
//! any of these types by registering a definition of the same name; the
//! constructors are public so replacements can derive from them.

use crate::attribute::{value_to_string, AttrSource, AttrTarget, AttributeSpec, ValueKind};
use crate::command::{mark_commands, ArgBinding, CommandKind, CommandSpec};
use crate::definition::{MarkSpec, NodeSpec, TypeDefinition};
use crate::dom::{DomSpec, ParseRule, RenderSpec};
use folio_markup::{Attributes, Element};
use serde_json::Value;

pub const HEADING_LEVELS: [u8; 6] = [1, 2, 3, 4, 5, 6];

#[derive(Debug, Clone)]
pub struct BaseSchema {
    pub definitions: Vec<TypeDefinition>,
    /// Commands not owned by a type
    pub commands: Vec<CommandSpec>,
    /// Base types that are switched off whenever a same-named custom
    /// definition is active
    pub disabled_when_overridden: Vec<String>,
}

impl BaseSchema {
    pub fn standard() -> Self {
        Self {
            definitions: vec![
                doc(),
                paragraph(),
                text(),
                heading(),
                bullet_list(),
                ordered_list(),
                list_item(),
                blockquote(),
                code_block(),
                horizontal_rule(),
                hard_break(),
                simple_mark("bold", "Bold", "strong", &["strong", "b"]),
                simple_mark("italic", "Italic", "em", &["em", "i"]),
                simple_mark("strike", "Strike", "s", &["s", "del", "strike"]),
                code_mark(),
            ],
            commands: vec![
                CommandSpec::new("insertText", CommandKind::InsertText),
                CommandSpec::new("splitBlock", CommandKind::SplitBlock),
                CommandSpec::new("extendMarkRange", CommandKind::ExtendMarkRange),
            ],
            disabled_when_overridden: ["paragraph", "heading", "bulletList", "orderedList"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

impl Default for BaseSchema {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn doc() -> TypeDefinition {
    TypeDefinition::node(
        "doc",
        NodeSpec {
            content: Some("block+".to_string()),
            top_node: true,
            ..NodeSpec::default()
        },
        RenderSpec::tag("div"),
    )
}

pub fn paragraph() -> TypeDefinition {
    TypeDefinition::node("paragraph", NodeSpec::textblock(), RenderSpec::tag("p"))
        .with_parse_rule(ParseRule::tag("p"))
        .with_command(CommandSpec::new(
            "setParagraph",
            CommandKind::SetBlockType {
                node_type: "paragraph".to_string(),
                binding: ArgBinding::None,
            },
        ))
}

pub fn text() -> TypeDefinition {
    TypeDefinition::node(
        "text",
        NodeSpec {
            group: Some("inline".to_string()),
            inline: true,
            ..NodeSpec::default()
        },
        RenderSpec::leaf("span"),
    )
}

pub fn heading() -> TypeDefinition {
    let mut definition = TypeDefinition::node(
        "heading",
        NodeSpec {
            defining: true,
            ..NodeSpec::textblock()
        },
        RenderSpec::custom(|attrs, rendered| {
            let level = attrs.get("level").and_then(Value::as_u64).unwrap_or(1);
            DomSpec::new(format!("h{}", level), rendered).with_hole()
        }),
    )
    .with_attribute(AttributeSpec::internal("level", 1))
    .with_commands([
        CommandSpec::new(
            "setHeading",
            CommandKind::SetBlockType {
                node_type: "heading".to_string(),
                binding: ArgBinding::Object,
            },
        ),
        CommandSpec::new(
            "toggleHeading",
            CommandKind::ToggleBlockType {
                node_type: "heading".to_string(),
                fallback: "paragraph".to_string(),
                binding: ArgBinding::Object,
            },
        ),
    ]);

    for level in HEADING_LEVELS {
        definition = definition
            .with_parse_rule(ParseRule::tag(format!("h{}", level)).with_static_attr("level", level));
    }
    definition
}

fn list_spec() -> NodeSpec {
    NodeSpec {
        group: Some("block list".to_string()),
        ..NodeSpec::block("listItem+")
    }
}

pub fn bullet_list() -> TypeDefinition {
    TypeDefinition::node("bulletList", list_spec(), RenderSpec::tag("ul"))
        .with_parse_rule(ParseRule::tag("ul"))
        .with_command(toggle_list("toggleBulletList", "bulletList"))
}

pub fn ordered_list() -> TypeDefinition {
    TypeDefinition::node("orderedList", list_spec(), RenderSpec::tag("ol"))
        .with_attribute(AttributeSpec::new("start", 1).numeric())
        .with_parse_rule(ParseRule::tag("ol"))
        .with_command(toggle_list("toggleOrderedList", "orderedList"))
}

fn toggle_list(name: &str, list_type: &str) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandKind::ToggleList {
            list_type: list_type.to_string(),
            item_type: "listItem".to_string(),
        },
    )
}

pub fn list_item() -> TypeDefinition {
    TypeDefinition::node(
        "listItem",
        NodeSpec {
            group: None,
            defining: true,
            ..NodeSpec::block("paragraph block*")
        },
        RenderSpec::tag("li"),
    )
    .with_parse_rule(ParseRule::tag("li"))
}

pub fn blockquote() -> TypeDefinition {
    TypeDefinition::node(
        "blockquote",
        NodeSpec {
            defining: true,
            ..NodeSpec::block("block+")
        },
        RenderSpec::tag("blockquote"),
    )
    .with_parse_rule(ParseRule::tag("blockquote"))
    .with_command(CommandSpec::new(
        "toggleBlockquote",
        CommandKind::ToggleWrap {
            node_type: "blockquote".to_string(),
        },
    ))
}

pub fn code_block() -> TypeDefinition {
    TypeDefinition::node(
        "codeBlock",
        NodeSpec {
            code: true,
            defining: true,
            ..NodeSpec::block("text*")
        },
        RenderSpec::custom(|_, rendered| {
            DomSpec::new("pre", Attributes::new())
                .with_child(DomSpec::new("code", rendered).with_hole())
        }),
    )
    .with_attribute(
        AttributeSpec::new("language", Value::Null)
            .parse_from(AttrSource::Custom(std::sync::Arc::new(code_language)))
            .render_to(vec![AttrTarget::Class("language-".to_string())]),
    )
    .with_parse_rule(ParseRule::tag("pre"))
}

/// `language-rust` on the `pre` or its inner `code`
fn code_language(element: &Element) -> Option<Value> {
    let from = |element: &Element| {
        element
            .classes()
            .find_map(|class| class.strip_prefix("language-"))
            .map(|language| Value::String(language.to_string()))
    };
    from(element).or_else(|| {
        element
            .children
            .iter()
            .filter_map(|child| child.as_element())
            .find(|child| child.tag == "code")
            .and_then(from)
    })
}

pub fn horizontal_rule() -> TypeDefinition {
    TypeDefinition::node("horizontalRule", NodeSpec::block_atom(), RenderSpec::leaf("hr"))
        .with_parse_rule(ParseRule::tag("hr"))
        .with_command(CommandSpec::new(
            "setHorizontalRule",
            CommandKind::InsertNode {
                node_type: "horizontalRule".to_string(),
                binding: ArgBinding::None,
            },
        ))
}

pub fn hard_break() -> TypeDefinition {
    TypeDefinition::node(
        "hardBreak",
        NodeSpec {
            selectable: false,
            ..NodeSpec::inline_atom()
        },
        RenderSpec::leaf("br"),
    )
    .with_parse_rule(ParseRule::tag("br"))
    .with_command(CommandSpec::new(
        "setHardBreak",
        CommandKind::InsertInline {
            node_type: "hardBreak".to_string(),
        },
    ))
}

/// Attribute-less mark with the usual command triple
pub fn simple_mark(name: &str, title: &str, tag: &str, parse_tags: &[&str]) -> TypeDefinition {
    let mut definition = TypeDefinition::mark(name, MarkSpec::default(), RenderSpec::tag(tag))
        .with_commands(mark_commands(name, title));
    for parse_tag in parse_tags {
        definition = definition.with_parse_rule(ParseRule::tag(*parse_tag));
    }
    definition
}

fn code_mark() -> TypeDefinition {
    let mut definition = simple_mark("code", "Code", "code", &["code"]);
    definition.role = crate::definition::TypeRole::Mark(MarkSpec {
        excludes: Some("_".to_string()),
        ..MarkSpec::default()
    });
    definition
}

/// Read a string attribute as-is, used by definitions that keep raw values
pub fn string_attribute(name: &str) -> AttrSource {
    AttrSource::Attribute {
        name: name.to_string(),
        kind: ValueKind::String,
    }
}

/// `class` output from a value, skipping nulls
pub fn class_from(prefix: &'static str, key: &'static str) -> AttrTarget {
    AttrTarget::Custom(std::sync::Arc::new(move |attrs| {
        let mut out = Attributes::new();
        if let Some(value) = attrs.get(key).filter(|v| !v.is_null()) {
            out.insert("class".to_string(), format!("{}{}", prefix, value_to_string(value)));
        }
        out
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_documented_types() {
        let base = BaseSchema::standard();
        let names: Vec<&str> = base.definitions.iter().map(|d| d.name.as_str()).collect();

        for name in [
            "doc", "paragraph", "text", "heading", "bulletList", "orderedList", "listItem",
            "blockquote", "codeBlock", "horizontalRule", "hardBreak", "bold", "italic", "strike",
            "code",
        ] {
            assert!(names.contains(&name), "missing {}", name);
        }
        assert_eq!(base.disabled_when_overridden.len(), 4);
    }

    #[test]
    fn test_heading_parses_level_from_tag() {
        let heading = heading();
        let rule = heading
            .parse_rules
            .iter()
            .find(|rule| rule.tag == "h4")
            .unwrap();
        let attrs = rule.matches(&Element::new("h4")).unwrap();

        assert_eq!(attrs.get("level"), Some(&Value::from(4)));
    }

    #[test]
    fn test_code_language_from_inner_code() {
        let pre = Element::new("pre")
            .with_child(Element::new("code").with_attribute("class", "language-rust"));

        assert_eq!(code_language(&pre), Some(Value::from("rust")));
    }
}
