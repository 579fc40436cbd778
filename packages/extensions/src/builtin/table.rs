use crate::config::ExtensionConfig;
use crate::descriptor::{ExtensionDescriptor, ExtensionGroup, Loader, OptionField, OptionKind};
use folio_markup::Attributes;
use folio_schema::attribute::{AttrSource, AttributeSpec, ValueKind};
use folio_schema::{
    CommandKind, CommandSpec, DomSpec, NodeSpec, ParseRule, RenderSpec, SchemaFragment, TableTypes, TypeDefinition,
};
use serde_json::{json, Value};

pub fn table() -> ExtensionDescriptor {
    ExtensionDescriptor::new(
        "table",
        "Table",
        "@tiptap/extension-table",
        ExtensionGroup::Node,
        Loader::Immediate(load_table),
    )
    .with_defaults(json!({"resizable": false}))
    .with_option(OptionField::new("tableResizable", "Table resizable", OptionKind::Boolean, false))
}

fn span_attribute(key: &str) -> AttributeSpec {
    AttributeSpec::new(key, 1).numeric()
}

fn cell(name: &str, tag: &str, resizable: bool) -> TypeDefinition {
    let mut definition = TypeDefinition::node(
        name,
        NodeSpec {
            group: None,
            isolating: true,
            ..NodeSpec::block("block+")
        },
        RenderSpec::tag(tag),
    )
    .with_attribute(span_attribute("colspan"))
    .with_attribute(span_attribute("rowspan"))
    .with_parse_rule(ParseRule::tag(tag));

    // resizable tables remember column widths
    if resizable {
        definition = definition.with_attribute(AttributeSpec::data("colwidth", Value::Null).parse_from(
            AttrSource::Attribute {
                name: "data-colwidth".to_string(),
                kind: ValueKind::Auto,
            },
        ));
    }
    definition
}

fn load_table(config: &ExtensionConfig) -> SchemaFragment {
    let resizable = config.boolean("tableResizable", false);
    let types = TableTypes::default();

    let table = TypeDefinition::node(
        &types.table,
        NodeSpec {
            isolating: true,
            ..NodeSpec::block("tableRow+")
        },
        RenderSpec::custom(|_, rendered| {
            DomSpec::new("table", rendered).with_child(DomSpec::new("tbody", Attributes::new()).with_hole())
        }),
    )
    .with_parse_rule(ParseRule::tag("table"))
    .with_commands([
        CommandSpec::new("insertTable", CommandKind::InsertTable(types.clone())),
        CommandSpec::new(
            "deleteTable",
            CommandKind::RemoveAncestor {
                node_type: types.table.clone(),
            },
        ),
        CommandSpec::new("addRowAfter", CommandKind::AddRowAfter(types.clone())),
        CommandSpec::new("deleteRow", CommandKind::DeleteRow(types.clone())),
    ]);

    let row = TypeDefinition::node(
        &types.row,
        NodeSpec {
            group: None,
            ..NodeSpec::block("(tableCell | tableHeader)*")
        },
        RenderSpec::tag("tr"),
    )
    .with_parse_rule(ParseRule::tag("tr"));

    SchemaFragment::new("table")
        .with_definition(table)
        .with_definition(row)
        .with_definition(cell(&types.cell, "td", resizable))
        .with_definition(cell(&types.header, "th", resizable))
}
