//! # Composite schema builder
//!
//! Merges the base schema and the resolved fragments into one [`Schema`]:
//!
//! 1. start from the base definitions
//! 2. apply fragments in resolution order; a definition whose name already
//!    exists replaces the earlier one entirely, in place
//! 3. reject node/mark name clashes and competing document roots
//! 4. apply global attributes to their target types
//! 5. resolve content expressions and collect the command table

use crate::attribute::upsert_attribute;
use crate::base::BaseSchema;
use crate::command::CommandSpec;
use crate::content::{parse_content, ContentModel};
use crate::definition::{GlobalAttributes, TypeDefinition, TypeRole};
use crate::error::{SchemaError, SchemaResult};
use crate::feature::Feature;
use crate::fragment::SchemaFragment;
use crate::schema::{CommandEntry, MarkType, NodeType, Schema};
use folio_model::TEXT_TYPE;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

const BASE_ORIGIN: &str = "base";

/// A definition together with the fragment it came from
struct Placed {
    definition: TypeDefinition,
    origin: String,
    rank: usize,
}

pub struct SchemaBuilder<'a> {
    base: &'a BaseSchema,
    fragments: Vec<&'a SchemaFragment>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(base: &'a BaseSchema) -> Self {
        Self {
            base,
            fragments: Vec::new(),
        }
    }

    pub fn fragment(mut self, fragment: &'a SchemaFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn fragments(mut self, fragments: impl IntoIterator<Item = &'a SchemaFragment>) -> Self {
        self.fragments.extend(fragments);
        self
    }

    #[instrument(skip(self), fields(fragments = self.fragments.len()))]
    pub fn build(self) -> SchemaResult<Schema> {
        let mut placed: Vec<Placed> = self
            .base
            .definitions
            .iter()
            .map(|definition| Placed {
                definition: definition.clone(),
                origin: BASE_ORIGIN.to_string(),
                rank: 0,
            })
            .collect();
        let mut free_commands: Vec<(usize, CommandSpec)> =
            self.base.commands.iter().map(|c| (0, c.clone())).collect();
        let mut globals: Vec<&GlobalAttributes> = Vec::new();
        let mut features: Vec<Feature> = Vec::new();

        for (index, fragment) in self.fragments.iter().enumerate() {
            let rank = index + 1;
            for definition in &fragment.definitions {
                self.place(&mut placed, definition, &fragment.name, rank)?;
            }
            free_commands.extend(fragment.commands.iter().map(|c| (rank, c.clone())));
            globals.extend(fragment.global_attributes.iter());
            features.extend(fragment.features.iter().cloned());
        }

        let top_node = find_top_node(&placed)?;

        for global in globals {
            for type_name in &global.types {
                match placed.iter_mut().find(|p| &p.definition.name == type_name) {
                    Some(target) => {
                        for spec in &global.attributes {
                            upsert_attribute(&mut target.definition.attributes, spec.clone());
                        }
                    }
                    None => debug!(type_name = %type_name, "global attribute target not in schema, skipped"),
                }
            }
        }

        let commands = collect_commands(&placed, free_commands);
        let (nodes, marks) = resolve_types(placed)?;

        info!(
            nodes = nodes.len(),
            marks = marks.len(),
            commands = commands.len(),
            "Schema built"
        );

        Ok(Schema {
            nodes,
            marks,
            top_node,
            commands,
            features,
            fragments: self.fragments.iter().map(|f| f.name.clone()).collect(),
        })
    }

    fn place(
        &self,
        placed: &mut Vec<Placed>,
        definition: &TypeDefinition,
        origin: &str,
        rank: usize,
    ) -> SchemaResult<()> {
        let Some(index) = placed.iter().position(|p| p.definition.name == definition.name) else {
            placed.push(Placed {
                definition: definition.clone(),
                origin: origin.to_string(),
                rank,
            });
            return Ok(());
        };
        let existing = &mut placed[index];

        if existing.definition.role.label() != definition.role.label() {
            return Err(SchemaError::conflict(format!(
                "`{}` is a {} in `{}` and a {} in `{}`",
                definition.name,
                existing.definition.role.label(),
                existing.origin,
                definition.role.label(),
                origin
            )));
        }

        if existing.origin == BASE_ORIGIN {
            if self.base.disabled_when_overridden.contains(&definition.name) {
                debug!(type_name = %definition.name, fragment = origin, "Base type disabled by custom definition");
            } else {
                info!(type_name = %definition.name, fragment = origin, "Base type overridden");
            }
        } else {
            debug!(
                type_name = %definition.name,
                previous = %existing.origin,
                fragment = origin,
                "Later definition replaces earlier one"
            );
        }

        existing.definition = definition.clone();
        existing.origin = origin.to_string();
        existing.rank = rank;
        Ok(())
    }
}

/// Build a schema from `base` and `fragments` in the given order
pub fn build(fragments: &[SchemaFragment], base: &BaseSchema) -> SchemaResult<Schema> {
    SchemaBuilder::new(base).fragments(fragments).build()
}

fn find_top_node(placed: &[Placed]) -> SchemaResult<String> {
    let roots: Vec<&Placed> = placed
        .iter()
        .filter(|p| p.definition.node_spec().is_some_and(|spec| spec.top_node))
        .collect();
    match roots.as_slice() {
        [] => Err(SchemaError::MissingTopNode),
        [root] => Ok(root.definition.name.clone()),
        [first, second, ..] => Err(SchemaError::conflict(format!(
            "two document roots: `{}` from `{}` and `{}` from `{}`",
            first.definition.name, first.origin, second.definition.name, second.origin
        ))),
    }
}

fn collect_commands(
    placed: &[Placed],
    free_commands: Vec<(usize, CommandSpec)>,
) -> BTreeMap<String, Vec<CommandEntry>> {
    let mut commands: BTreeMap<String, Vec<CommandEntry>> = BTreeMap::new();
    for p in placed {
        for spec in &p.definition.commands {
            commands.entry(spec.name.clone()).or_default().push(CommandEntry {
                owner: Some(p.definition.name.clone()),
                spec: spec.clone(),
                rank: p.rank,
            });
        }
    }
    for (rank, spec) in free_commands {
        let entries = commands.entry(spec.name.clone()).or_default();
        // a later fragment-level command of the same name replaces the earlier
        entries.retain(|entry| entry.owner.is_some());
        entries.push(CommandEntry {
            owner: None,
            spec,
            rank,
        });
    }
    commands
}

fn resolve_types(placed: Vec<Placed>) -> SchemaResult<(Vec<NodeType>, Vec<MarkType>)> {
    let node_specs: Vec<(String, crate::definition::NodeSpec)> = placed
        .iter()
        .filter_map(|p| p.definition.node_spec().map(|spec| (p.definition.name.clone(), spec.clone())))
        .collect();

    let resolve = |name: &str| -> Option<Vec<String>> {
        if node_specs.iter().any(|(node, _)| node == name) {
            return Some(vec![name.to_string()]);
        }
        let members: Vec<String> = node_specs
            .iter()
            .filter(|(_, spec)| spec.in_group(name))
            .map(|(node, _)| node.clone())
            .collect();
        (!members.is_empty()).then_some(members)
    };
    let inline_types: Vec<&str> = node_specs
        .iter()
        .filter(|(_, spec)| spec.inline)
        .map(|(name, _)| name.as_str())
        .collect();

    let mut nodes = Vec::new();
    let mut marks = Vec::new();
    for p in placed {
        match p.definition.role.clone() {
            TypeRole::Node(spec) => {
                let content = match &spec.content {
                    Some(expression) => {
                        let expr = parse_content(expression).map_err(|message| {
                            SchemaError::invalid_content(&p.definition.name, expression, message)
                        })?;
                        ContentModel::compile(expression, &expr, &resolve).map_err(|message| {
                            SchemaError::invalid_content(&p.definition.name, expression, message)
                        })?
                    }
                    None => ContentModel::empty(),
                };
                let inline_content = content
                    .allowed_types()
                    .iter()
                    .any(|t| *t == TEXT_TYPE || inline_types.contains(t));
                nodes.push(NodeType {
                    definition: p.definition,
                    spec,
                    content,
                    inline_content,
                });
            }
            TypeRole::Mark(_) => {
                let rank = marks.len();
                marks.push(MarkType {
                    definition: p.definition,
                    rank,
                });
            }
        }
    }
    Ok((nodes, marks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeSpec;
    use crate::base;
    use crate::definition::{DefinitionDelta, NodeSpec};
    use crate::dom::RenderSpec;
    use serde_json::Value;

    fn custom_paragraph() -> SchemaFragment {
        SchemaFragment::new("paragraph").with_definition(
            base::paragraph().derive(DefinitionDelta::new().attribute(AttributeSpec::data("variant", Value::Null))),
        )
    }

    #[test]
    fn test_base_schema_builds() {
        let schema = build(&[], &BaseSchema::standard()).unwrap();

        assert_eq!(schema.top_node(), "doc");
        assert_eq!(schema.default_textblock(), Some("paragraph"));
        assert!(schema.is_textblock("heading"));
        assert!(!schema.is_textblock("bulletList"));
        assert_eq!(schema.commands("toggleBold").len(), 1);
    }

    #[test]
    fn test_custom_definition_replaces_base() {
        let schema = build(&[custom_paragraph()], &BaseSchema::standard()).unwrap();
        let paragraphs: Vec<&NodeType> = schema.nodes().iter().filter(|n| n.name() == "paragraph").collect();

        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].definition.attribute("variant").is_some());
        // replaced in place, so it stays the default textblock
        assert_eq!(schema.nodes()[1].name(), "paragraph");
    }

    #[test]
    fn test_node_mark_clash_is_conflict() {
        let fragment = SchemaFragment::new("weird").with_definition(TypeDefinition::node(
            "bold",
            NodeSpec::textblock(),
            RenderSpec::tag("div"),
        ));
        let result = build(&[fragment], &BaseSchema::standard());

        assert!(matches!(result, Err(SchemaError::Conflict { .. })));
    }

    #[test]
    fn test_second_root_is_conflict() {
        let fragment = SchemaFragment::new("page").with_definition(TypeDefinition::node(
            "page",
            NodeSpec {
                content: Some("block+".into()),
                top_node: true,
                ..NodeSpec::default()
            },
            RenderSpec::tag("div"),
        ));
        let result = build(&[fragment], &BaseSchema::standard());

        assert!(matches!(result, Err(SchemaError::Conflict { .. })));
    }

    #[test]
    fn test_unknown_content_name() {
        let fragment = SchemaFragment::new("layout").with_definition(TypeDefinition::node(
            "layout",
            NodeSpec::block("layoutColumn+"),
            RenderSpec::tag("div"),
        ));
        let result = build(&[fragment], &BaseSchema::standard());

        assert!(matches!(result, Err(SchemaError::InvalidContent { .. })));
    }

    #[test]
    fn test_global_attributes_skip_absent_targets() {
        let fragment = SchemaFragment::new("textAlign").with_global_attributes(GlobalAttributes::new(
            vec!["heading".into(), "paragraph".into(), "missing".into()],
            vec![AttributeSpec::new("textAlign", "left")],
        ));
        let schema = build(&[fragment], &BaseSchema::standard()).unwrap();

        assert!(schema.node_type("heading").unwrap().definition.attribute("textAlign").is_some());
        assert!(schema.node_type("missing").is_none());
    }

    #[test]
    fn test_create_and_fill_document() {
        let schema = build(&[], &BaseSchema::standard()).unwrap();
        let doc = schema.create_and_fill("doc", &Default::default()).unwrap();

        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].kind, "paragraph");
        assert!(schema.validate(&doc).is_ok());
    }
}
