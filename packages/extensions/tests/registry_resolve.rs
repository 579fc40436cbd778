use folio_extensions::{
    ExtensionConfig, ExtensionDescriptor, ExtensionGroup, LoadFuture, Loader, Registry, RegistryError,
};
use folio_schema::{parse_document, serialize_document, Feature, SchemaFragment};
use serde_json::{json, Value};
use std::time::Duration;

fn slow_load(_: ExtensionConfig) -> LoadFuture {
    Box::pin(async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(SchemaFragment::new("slow"))
    })
}

fn failing_load(_: ExtensionConfig) -> LoadFuture {
    Box::pin(async { Err(RegistryError::load("broken", "asset bundle missing")) })
}

fn fast_load(_: &ExtensionConfig) -> SchemaFragment {
    SchemaFragment::new("fast")
}

#[tokio::test]
async fn test_deferred_loads_keep_resolution_order() {
    let mut registry = Registry::empty();
    registry.register(ExtensionDescriptor::new("slow", "Slow", "test/slow", ExtensionGroup::Mark, Loader::Deferred(slow_load)));
    registry.register(ExtensionDescriptor::new("fast", "Fast", "test/fast", ExtensionGroup::Node, Loader::Immediate(fast_load)));

    let fragments = registry.resolve(&["fast", "slow"], &ExtensionConfig::new()).await.unwrap();
    let names: Vec<&str> = fragments.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(names, vec!["slow", "fast"]);
}

#[tokio::test]
async fn test_failed_load_fails_resolution() {
    let mut registry = Registry::new();
    registry.register(ExtensionDescriptor::new(
        "broken",
        "Broken",
        "test/broken",
        ExtensionGroup::Editor,
        Loader::Deferred(failing_load),
    ));

    let result = registry.resolve(&["link", "broken"], &ExtensionConfig::new()).await;
    match result {
        Err(error) => assert_eq!(error, RegistryError::load("broken", "asset bundle missing")),
        Ok(_) => panic!("expected the broken extension to fail resolution"),
    }
}

#[tokio::test]
async fn test_builtin_extensions_build() {
    let registry = Registry::new();
    let active: Vec<&str> = registry.descriptors().iter().map(|d| d.name.as_str()).collect();
    let config = ExtensionConfig::new()
        .with("characterCountLimit", 500)
        .with("placeholder", "Start here");

    let schema = registry.build_schema(&active, &config).await.unwrap();

    for name in ["layout", "layoutColumn", "video", "spacer", "details", "table", "tableCell"] {
        assert!(schema.node_type(name).is_some(), "missing node {}", name);
    }
    for name in ["link", "highlight", "textStyle", "underline"] {
        assert!(schema.mark_type(name).is_some(), "missing mark {}", name);
    }
    assert!(schema
        .features()
        .contains(&Feature::Placeholder { text: "Start here".to_string() }));
    assert!(schema
        .features()
        .contains(&Feature::CharacterCount { limit: Some(500) }));
}

#[tokio::test]
async fn test_custom_types_replace_base_types() {
    let registry = Registry::new();
    let schema = registry
        .build_schema(&["paragraph", "heading", "bulletList", "orderedList"], &ExtensionConfig::new())
        .await
        .unwrap();

    assert_eq!(schema.nodes().iter().filter(|n| n.name() == "paragraph").count(), 1);
    assert!(schema.node_type("paragraph").unwrap().definition.attribute("variant").is_some());
    assert_eq!(schema.commands("setParagraphVariant")[0].owner.as_deref(), Some("paragraph"));

    let owners: Vec<Option<&str>> = schema
        .commands("setListVariant")
        .iter()
        .map(|entry| entry.owner.as_deref())
        .collect();
    assert!(owners.contains(&Some("bulletList")));
    assert!(owners.contains(&Some("orderedList")));

    // base behavior survives the override
    assert!(!schema.commands("toggleBulletList").is_empty());
    assert_eq!(schema.top_node(), "doc");
}

#[tokio::test]
async fn test_config_document_drives_resolution() {
    let registry = Registry::new();
    let config = ExtensionConfig::from_value(json!({
        "extensions": ["uniqueId", "textAlign"],
        "uniqueIdAttributeName": "uid",
        "textAlignAlignments": ["left", "center"],
        "someStrayKey": true,
    }))
    .unwrap();

    let fragments = registry.resolve_config(&config).await.unwrap();
    let names: Vec<&str> = fragments.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["textAlign", "uniqueId"]);

    assert_eq!(
        ExtensionConfig::from_value(json!([1, 2])),
        Err(RegistryError::InvalidConfig("array".to_string()))
    );
}

#[tokio::test]
async fn test_layout_markup_round_trip() {
    let registry = Registry::new();
    let schema = registry
        .build_schema(&["layout", "layoutColumn", "spacer", "textAlign"], &ExtensionConfig::new())
        .await
        .unwrap();

    let source = concat!(
        "<div data-type=\"layout-block\" data-columns=\"3\">",
        "<div data-type=\"layout-column\" style=\"justify-content: center\"><p>one</p></div>",
        "<div data-type=\"layout-column\"><p style=\"text-align: right\">two</p></div>",
        "<div data-type=\"layout-column\"></div>",
        "</div>",
        "<div data-type=\"spacer\" data-variant=\"lg\"></div>",
    );
    let doc = parse_document(&schema, source).unwrap();
    schema.validate(&doc).unwrap();

    let layout = &doc.content[0];
    assert_eq!(layout.kind, "layout");
    assert_eq!(layout.attr("columns"), Some(&json!(3)));
    assert_eq!(layout.content.len(), 3);
    assert_eq!(layout.content[0].attr("justifyContent"), Some(&json!("center")));
    assert_eq!(layout.content[1].content[0].attr("textAlign"), Some(&json!("right")));
    // an empty column is filled with a paragraph
    assert_eq!(layout.content[2].content[0].kind, "paragraph");
    assert_eq!(doc.content[1].attr("variant"), Some(&Value::from("lg")));

    let html = serialize_document(&schema, &doc);
    assert!(html.contains("data-columns=\"3\""));
    assert!(html.contains("spacer spacer-lg"));
    assert_eq!(parse_document(&schema, &html).unwrap(), doc);
}

#[tokio::test]
async fn test_registration_order_does_not_change_the_schema() {
    let mut reversed = Registry::empty();
    for descriptor in folio_extensions::builtin::extensions().into_iter().rev() {
        reversed.register(descriptor);
    }
    let forward = Registry::new();
    let active: Vec<&str> = forward.descriptors().iter().map(|d| d.name.as_str()).collect();
    let config = ExtensionConfig::new().with("detailsOpen", true);

    let expected = forward.build_schema(&active, &config).await.unwrap();
    let actual = reversed.build_schema(&active, &config).await.unwrap();

    assert_eq!(actual.summary(), expected.summary());
    assert_eq!(actual.fragments(), expected.fragments());
}
