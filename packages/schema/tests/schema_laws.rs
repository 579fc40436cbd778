use folio_schema::attribute::AttributeSpec;
use folio_schema::base;
use folio_schema::{
    build, parse_document, serialize_document, BaseSchema, DefinitionDelta, SchemaFragment,
};
use serde_json::{json, Value};

fn variant_paragraph(default: &str) -> SchemaFragment {
    SchemaFragment::new("paragraph").with_definition(
        base::paragraph().derive(DefinitionDelta::new().attribute(AttributeSpec::data("variant", default))),
    )
}

#[test]
fn test_markup_round_trip_is_stable() {
    let schema = build(&[variant_paragraph("body")], &BaseSchema::standard()).unwrap();
    let source = concat!(
        "<h1>Title</h1>",
        "<p data-variant=\"lead\">Intro <strong>with <em>marks</em></strong></p>",
        "<p>plain</p>",
        "<blockquote><p>quote</p></blockquote>",
        "<ol start=\"4\"><li><p>four</p></li></ol>",
    );

    let doc = parse_document(&schema, source).unwrap();
    schema.validate(&doc).unwrap();
    let html = serialize_document(&schema, &doc);
    let again = parse_document(&schema, &html).unwrap();

    assert_eq!(html, source);
    assert_eq!(again, doc);
}

#[test]
fn test_later_fragment_wins() {
    let schema = build(
        &[variant_paragraph("body"), variant_paragraph("caption")],
        &BaseSchema::standard(),
    )
    .unwrap();

    let paragraph = schema.node_type("paragraph").unwrap();
    assert_eq!(
        paragraph.definition.attribute("variant").unwrap().default,
        Value::from("caption")
    );
    assert_eq!(schema.nodes().iter().filter(|n| n.name() == "paragraph").count(), 1);
}

#[test]
fn test_missing_attribute_reads_as_default() {
    let schema = build(&[variant_paragraph("body")], &BaseSchema::standard()).unwrap();
    let doc = parse_document(&schema, "<p>text</p>").unwrap();

    assert_eq!(doc.content[0].attr("variant"), Some(&json!("body")));
    assert_eq!(serialize_document(&schema, &doc), "<p>text</p>");
}

#[test]
fn test_build_is_deterministic() {
    let fragments = vec![variant_paragraph("body")];
    let first = build(&fragments, &BaseSchema::standard()).unwrap();
    let second = build(&fragments, &BaseSchema::standard()).unwrap();

    assert_eq!(first.summary(), second.summary());
    let summary = serde_json::to_value(first.summary()).unwrap();
    assert_eq!(summary["topNode"], json!("doc"));
    assert_eq!(summary["fragments"], json!(["paragraph"]));
}

#[test]
fn test_fragment_commands_are_listed() {
    let schema = build(&[], &BaseSchema::standard()).unwrap();
    let summary = schema.summary();

    assert_eq!(summary.commands["insertText"], vec!["*".to_string()]);
    assert_eq!(summary.commands["toggleHeading"], vec!["heading".to_string()]);
}
