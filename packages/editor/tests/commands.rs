use folio_editor::{CommandError, CommandOutcome, Editor, EditorError, Rejection};
use folio_extensions::{ExtensionConfig, Registry};
use folio_model::{Position, Selection};
use folio_schema::{parse_document, Schema};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

async fn schema(active: &[&str], config: ExtensionConfig) -> Arc<Schema> {
    Arc::new(Registry::new().build_schema(active, &config).await.unwrap())
}

async fn editor(active: &[&str], markup: &str) -> Editor {
    Editor::from_markup(schema(active, ExtensionConfig::new()).await, markup).unwrap()
}

const LAYOUT: [&str; 2] = ["layout", "layoutColumn"];
const DETAILS: [&str; 3] = ["details", "detailsSummary", "detailsContent"];

#[tokio::test]
async fn test_media_upsert_updates_selected_node() {
    let mut editor = Editor::empty(schema(&["image"], ExtensionConfig::new()).await).unwrap();

    let outcome = editor.execute("setImage", &json!({"id": "abc"})).unwrap();
    assert_eq!(outcome, CommandOutcome::Applied);
    assert_eq!(editor.doc().content.len(), 1);
    assert_eq!(editor.doc().content[0].attr_str("src"), Some("/assets/abc"));
    assert_eq!(editor.selection(), &Selection::node(vec![0]));

    editor.execute("setImage", &json!({"id": "abc2"})).unwrap();
    assert_eq!(editor.doc().content.len(), 1);
    assert_eq!(editor.doc().content[0].kind, "image");
    assert_eq!(editor.doc().content[0].attr_str("src"), Some("/assets/abc2"));
}

#[tokio::test]
async fn test_video_upsert_keeps_one_node() {
    let mut editor = Editor::empty(schema(&["video"], ExtensionConfig::new()).await).unwrap();

    editor.execute("setVideo", &json!({"id": "abc", "filename": "x.mp4"})).unwrap();
    editor.execute("setVideo", &json!({"id": "abc2"})).unwrap();

    let videos = editor.doc().find_all(|node| node.kind == "video");
    assert_eq!(videos.len(), 1);
    assert_eq!(editor.doc().content[0].attr_str("src"), Some("/assets/abc2"));
    assert_eq!(editor.doc().content[0].attr("controls"), Some(&json!(true)));
}

#[tokio::test]
async fn test_unset_layout_keeps_siblings() {
    let markup = r#"<p>before</p><div data-type="layout-block"><div data-type="layout-column"><p>a</p></div><div data-type="layout-column"><p>b</p></div></div><p>after</p>"#;
    let mut editor = editor(&LAYOUT, markup).await;
    editor.set_selection(Selection::cursor(vec![1, 0, 0], 1)).unwrap();

    assert!(editor.execute("unsetLayout", &Value::Null).unwrap().is_applied());

    let texts: Vec<String> = editor.doc().content.iter().map(|node| node.text_content()).collect();
    assert_eq!(texts, vec!["before", "after"]);

    assert_eq!(
        editor.execute("unsetLayout", &Value::Null).unwrap(),
        CommandOutcome::Rejected(Rejection::NotFound)
    );
}

#[tokio::test]
async fn test_unset_layout_outside_layout_is_not_found() {
    let mut editor = editor(&LAYOUT, "<p>Hello</p>").await;
    let before = editor.doc().clone();

    let outcome = editor.execute("unsetLayout", &Value::Null).unwrap();

    assert_eq!(outcome, CommandOutcome::Rejected(Rejection::NotFound));
    assert_eq!(editor.doc(), &before);
    assert_eq!(editor.version(), 0);
}

#[tokio::test]
async fn test_insert_layout_column_counts() {
    for count in [1usize, 2, 5] {
        let mut editor = editor(&LAYOUT, "<p>Intro</p>").await;
        editor.set_selection(Selection::cursor(vec![0], 5)).unwrap();

        assert!(editor.execute("insertLayout", &json!(count)).unwrap().is_applied());

        let layout = &editor.doc().content[1];
        assert_eq!(layout.kind, "layout");
        assert_eq!(layout.attr("columns"), Some(&json!(count)));
        assert_eq!(layout.content.len(), count);
        for column in &layout.content {
            assert_eq!(column.kind, "layoutColumn");
            assert_eq!(column.content[0].kind, "paragraph");
        }
        assert_eq!(editor.selection(), &Selection::cursor(vec![1, 0, 0], 0));
    }
}

#[tokio::test]
async fn test_insert_layout_default_and_bad_count() {
    let mut editor = editor(&LAYOUT, "<p></p>").await;

    editor.execute("insertLayout", &Value::Null).unwrap();
    // the empty paragraph is replaced
    assert_eq!(editor.doc().content.len(), 1);
    assert_eq!(editor.doc().content[0].content.len(), 2);

    let error = editor.execute("insertLayout", &json!(0)).unwrap_err();
    assert!(matches!(error, EditorError::Command(CommandError::InvalidArguments { .. })));
    let error = editor.execute("insertLayout", &json!(1_000_000_000_000u64)).unwrap_err();
    assert!(matches!(error, EditorError::Command(CommandError::InvalidArguments { .. })));
    assert_eq!(editor.version(), 1);
}

#[tokio::test]
async fn test_shrinking_layout_keeps_blocks() {
    let markup = r#"<div data-type="layout-block" data-columns="3"><div data-type="layout-column"><p>a</p></div><div data-type="layout-column"><p>b</p></div><div data-type="layout-column"><p>c</p></div></div>"#;
    let mut editor = editor(&LAYOUT, markup).await;
    editor.set_selection(Selection::cursor(vec![0, 2, 0], 1)).unwrap();

    editor.execute("setLayout", &json!({"columns": 2})).unwrap();

    let layout = &editor.doc().content[0];
    assert_eq!(layout.attr("columns"), Some(&json!(2)));
    assert_eq!(layout.content.len(), 2);
    let texts: Vec<String> = layout.content[1].content.iter().map(|p| p.text_content()).collect();
    assert_eq!(texts, vec!["b", "c"]);
    // the cursor followed its paragraph into the kept column
    assert_eq!(editor.selection(), &Selection::cursor(vec![0, 1, 1], 1));

    assert!(editor.execute("unsetLayout", &Value::Null).unwrap().is_applied());
    assert_eq!(editor.doc().content.len(), 1);
    assert_eq!(editor.doc().content[0].kind, "paragraph");
}

#[tokio::test]
async fn test_toggle_details_round_trip() {
    let mut editor = editor(&DETAILS, "<p>Hello</p>").await;
    let original = editor.doc().clone();
    editor.set_selection(Selection::cursor(vec![0], 2)).unwrap();

    editor.execute("toggleDetails", &Value::Null).unwrap();
    let details = &editor.doc().content[0];
    assert_eq!(details.kind, "details");
    assert_eq!(details.content[0].kind, "detailsSummary");
    assert_eq!(details.content[1].content[0].text_content(), "Hello");
    assert_eq!(editor.selection(), &Selection::cursor(vec![0, 0], 0));

    editor.execute("toggleDetails", &Value::Null).unwrap();
    assert_eq!(editor.doc(), &original);
}

#[tokio::test]
async fn test_details_open_flag_always_unsets() {
    let config = ExtensionConfig::new().with("detailsOpen", true);
    let mut editor = Editor::from_markup(schema(&DETAILS, config).await, "<p>Hello</p>").unwrap();
    let original = editor.doc().clone();

    assert_eq!(
        editor.execute("toggleDetails", &Value::Null).unwrap(),
        CommandOutcome::Rejected(Rejection::NotApplicable)
    );
    assert_eq!(editor.doc(), &original);

    editor.execute("setDetails", &Value::Null).unwrap();
    assert_eq!(editor.doc().content[0].attr("open"), Some(&json!(true)));

    editor.execute("toggleDetails", &Value::Null).unwrap();
    assert_eq!(editor.doc(), &original);
}

#[tokio::test]
async fn test_numeric_spacing_survives_markup() {
    let mut editor = editor(&["paragraph"], "<p>a</p>").await;

    editor.execute("setSpacing", &json!({"before": 16})).unwrap();

    let html = editor.to_html();
    assert_eq!(html, r#"<p data-space-before="16">a</p>"#);
    assert_eq!(&parse_document(editor.schema(), &html).unwrap(), editor.doc());
}

#[tokio::test]
async fn test_empty_variant_renders_nothing() {
    let mut editor = editor(&["paragraph"], "<p>a</p>").await;

    editor.execute("setParagraphVariant", &json!("lead")).unwrap();
    assert_eq!(editor.to_html(), r#"<p class="paragraph-lead" data-variant="lead">a</p>"#);

    editor.execute("setParagraphVariant", &json!("")).unwrap();
    assert_eq!(editor.to_html(), "<p>a</p>");
    assert_eq!(&parse_document(editor.schema(), &editor.to_html()).unwrap(), editor.doc());
}

#[tokio::test]
async fn test_list_variant_needs_a_list() {
    let mut editor = editor(&["bulletList", "paragraph"], "<p>a</p>").await;
    assert_eq!(
        editor.execute("setListVariant", &json!("square")).unwrap(),
        CommandOutcome::Rejected(Rejection::NotApplicable)
    );

    let mut editor = editor_in_list().await;
    editor.execute("setListVariant", &json!("square")).unwrap();
    assert_eq!(editor.doc().content[0].attr_str("variant"), Some("square"));
}

async fn editor_in_list() -> Editor {
    let mut editor = editor(&["bulletList", "paragraph"], "<ul><li><p>a</p></li></ul>").await;
    editor.set_selection(Selection::cursor(vec![0, 0, 0], 1)).unwrap();
    editor
}

#[tokio::test]
async fn test_innermost_owner_wins() {
    let mut editor = editor_in_list().await;

    editor.execute("setSpacing", &json!({"before": "lg"})).unwrap();

    let list = &editor.doc().content[0];
    assert_eq!(list.content[0].content[0].attr_str("spaceBefore"), Some("lg"));
    assert_eq!(list.attr("spaceBefore"), Some(&Value::Null));
}

#[tokio::test]
async fn test_toggle_bullet_list_round_trip() {
    let mut editor = editor(&["bulletList", "paragraph"], "<p>a</p><p>b</p>").await;
    let original = editor.doc().clone();
    editor
        .set_selection(Selection::range(Position::new(vec![0], 0), Position::new(vec![1], 1)))
        .unwrap();

    editor.execute("toggleBulletList", &Value::Null).unwrap();
    assert_eq!(editor.doc().content.len(), 1);
    assert_eq!(editor.doc().content[0].kind, "bulletList");
    assert_eq!(editor.doc().content[0].content.len(), 2);

    editor.execute("toggleBulletList", &Value::Null).unwrap();
    assert_eq!(editor.doc(), &original);
}

#[tokio::test]
async fn test_unique_ids_on_load_and_split() {
    let mut editor = editor(&["paragraph", "uniqueId"], "<p>a</p><p>b</p>").await;
    let first = editor.doc().content[0].attr_str("id").map(str::to_string);
    assert!(first.is_some());
    assert_ne!(editor.doc().content[0].attr("id"), editor.doc().content[1].attr("id"));

    editor.set_selection(Selection::cursor(vec![1], 1)).unwrap();
    editor.execute("splitBlock", &Value::Null).unwrap();

    let ids: HashSet<&str> = editor.doc().content.iter().filter_map(|p| p.attr_str("id")).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(editor.doc().content[0].attr_str("id"), first.as_deref());
}

#[tokio::test]
async fn test_character_limit_rejects_growth() {
    let config = ExtensionConfig::new().with("characterCountLimit", 5);
    let mut editor = Editor::from_markup(schema(&["characterCount"], config).await, "<p>abc</p>").unwrap();
    editor.set_selection(Selection::cursor(vec![0], 3)).unwrap();

    assert!(editor.execute("insertText", &json!("de")).unwrap().is_applied());
    assert_eq!(editor.character_count().characters, 5);
    assert_eq!(editor.character_limit(), Some(5));

    assert!(!editor.can_execute("insertText", &json!("f")).unwrap());
    assert_eq!(
        editor.execute("insertText", &json!("f")).unwrap(),
        CommandOutcome::Rejected(Rejection::NotApplicable)
    );
    assert_eq!(editor.doc().text_content(), "abcde");
}

#[tokio::test]
async fn test_typography_and_placeholder() {
    let config = ExtensionConfig::new().with("placeholder", "Write something");
    let mut editor = Editor::empty(schema(&["typography", "placeholder"], config).await).unwrap();
    assert_eq!(editor.placeholder(), Some("Write something"));

    editor.execute("insertText", &json!({"text": "(c) 2024 -> done"})).unwrap();

    assert_eq!(editor.doc().text_content(), "© 2024 → done");
    assert_eq!(editor.placeholder(), None);
    assert_eq!(editor.selection(), &Selection::cursor(vec![0], 13));
}

#[tokio::test]
async fn test_stored_mark_applies_to_typed_text() {
    let mut editor = editor(&[], "<p>ab</p>").await;
    editor.set_selection(Selection::cursor(vec![0], 2)).unwrap();

    editor.execute("toggleBold", &Value::Null).unwrap();
    editor.execute("insertText", &json!("c")).unwrap();

    let paragraph = &editor.doc().content[0];
    assert_eq!(paragraph.content.len(), 2);
    assert_eq!(paragraph.content[1].text.as_deref(), Some("c"));
    assert_eq!(paragraph.content[1].marks[0].kind, "bold");
}

#[tokio::test]
async fn test_unknown_command_is_an_error() {
    let mut editor = editor(&[], "<p>a</p>").await;

    let error = editor.execute("explode", &Value::Null).unwrap_err();

    assert_eq!(error, EditorError::Command(CommandError::UnknownCommand("explode".to_string())));
    assert_eq!(editor.version(), 0);
}
