use folio_model::{Mark, Node, ResourceRef, Selection};
use serde_json::json;

#[test]
fn test_prosemirror_document_loads() {
    let value = json!({
        "type": "doc",
        "content": [
            {
                "type": "heading",
                "attrs": {"level": 2, "variant": null},
                "content": [{"type": "text", "text": "Title"}]
            },
            {
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "see "},
                    {
                        "type": "text",
                        "text": "docs",
                        "marks": [{"type": "link", "attrs": {"href": "/assets/abc"}}]
                    }
                ]
            }
        ]
    });

    let doc: Node = serde_json::from_value(value.clone()).unwrap();

    assert_eq!(doc.content.len(), 2);
    assert_eq!(doc.node_at(&[0]).unwrap().attr("level"), Some(&json!(2)));
    assert_eq!(doc.text_content(), "Titlesee docs");

    let link = &doc.node_at(&[1, 1]).unwrap().marks[0];
    assert_eq!(link, &Mark::new("link").with_attr("href", "/assets/abc"));
    assert_eq!(serde_json::to_value(&doc).unwrap(), value);
}

#[test]
fn test_selection_from_host_json() {
    let selection: Selection = serde_json::from_value(json!({
        "type": "text",
        "anchor": {"path": [1], "offset": 4},
        "head": {"path": [1], "offset": 8}
    }))
    .unwrap();

    assert!(!selection.is_empty());
    assert_eq!(selection.from_path(), &[1]);

    let all: Selection = serde_json::from_value(json!({"type": "all"})).unwrap();
    assert_eq!(all, Selection::All);
}

#[test]
fn test_resource_binding_as_attribute() {
    let resource = ResourceRef::from_file_object(&json!({"id": "abc", "filename": "x.mp4"})).unwrap();
    let video = Node::new("video")
        .with_attr("src", resource.path())
        .with_attr("filename", resource.filename.clone().unwrap_or_default());

    assert_eq!(video.attr_str("src"), Some("/assets/abc"));
    assert_eq!(video.attr_str("filename"), Some("x.mp4"));
}
