//! # Document → markup
//!
//! Every node and mark renders through its type's [`RenderSpec`]; the
//! descriptor output is handed to the render function, which decides the
//! element shape. Content lands in the element marked as the hole.
//!
//! Inline content keeps marks open across neighbouring leaves that share
//! them, so `<strong>a<em>b</em></strong>` round-trips without splitting
//! the outer element.
//!
//! [`RenderSpec`]: crate::dom::RenderSpec

use crate::attribute::render_attributes;
use crate::dom::DomSpec;
use crate::schema::Schema;
use folio_markup::{Element, MarkupNode, Serializer};
use folio_model::{Mark, Node};
use tracing::warn;

pub struct DomSerializer<'a> {
    schema: &'a Schema,
}

/// An open mark element collecting children
struct OpenMark<'m> {
    mark: &'m Mark,
    children: Vec<MarkupNode>,
}

impl<'a> DomSerializer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Markup for the children of the document node
    pub fn serialize_fragment(&self, doc: &Node) -> Vec<MarkupNode> {
        self.serialize_content(doc)
    }

    /// Markup for one node, its content included
    pub fn serialize_node(&self, node: &Node) -> MarkupNode {
        if node.is_text() {
            return MarkupNode::Text(node.text.clone().unwrap_or_default());
        }
        let Some(node_type) = self.schema.node_type(&node.kind) else {
            warn!(node_type = %node.kind, "Serializing node of unknown type as its content");
            return MarkupNode::Element(Element::new("div").with_children(self.serialize_content(node)));
        };
        let rendered = render_attributes(&node_type.definition.attributes, &node.attrs);
        let spec = node_type.definition.render.render(&node.attrs, rendered);
        MarkupNode::Element(build_element(spec, self.serialize_content(node)))
    }

    pub fn to_html(&self, doc: &Node) -> String {
        Serializer::new().serialize(&self.serialize_fragment(doc))
    }

    pub fn to_html_pretty(&self, doc: &Node) -> String {
        Serializer::pretty().serialize(&self.serialize_fragment(doc))
    }

    fn serialize_content(&self, node: &Node) -> Vec<MarkupNode> {
        if self.schema.is_textblock(&node.kind) || node.content.iter().any(|child| child.is_text()) {
            self.serialize_inline(&node.content)
        } else {
            node.content.iter().map(|child| self.serialize_node(child)).collect()
        }
    }

    fn serialize_inline(&self, content: &[Node]) -> Vec<MarkupNode> {
        let mut output = Vec::new();
        let mut stack: Vec<OpenMark<'_>> = Vec::new();

        for leaf in content {
            let mut marks: Vec<&Mark> = leaf.marks.iter().collect();
            marks.sort_by_key(|mark| self.schema.mark_rank(&mark.kind));

            let keep = stack
                .iter()
                .zip(marks.iter())
                .take_while(|(open, mark)| open.mark == **mark && self.spanning(&open.mark.kind))
                .count();

            while stack.len() > keep {
                self.close_mark(&mut stack, &mut output);
            }
            for mark in &marks[keep..] {
                stack.push(OpenMark {
                    mark,
                    children: Vec::new(),
                });
            }

            let rendered = self.serialize_node(leaf);
            match stack.last_mut() {
                Some(open) => open.children.push(rendered),
                None => output.push(rendered),
            }
        }
        while !stack.is_empty() {
            self.close_mark(&mut stack, &mut output);
        }
        output
    }

    fn close_mark(&self, stack: &mut Vec<OpenMark<'_>>, output: &mut Vec<MarkupNode>) {
        let Some(open) = stack.pop() else {
            return;
        };
        let element = self.render_mark(open.mark, open.children);
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => output.push(element),
        }
    }

    fn render_mark(&self, mark: &Mark, children: Vec<MarkupNode>) -> MarkupNode {
        let Some(mark_type) = self.schema.mark_type(&mark.kind) else {
            warn!(mark = %mark.kind, "Dropping unknown mark from output");
            return MarkupNode::Element(Element::new("span").with_children(children));
        };
        let rendered = render_attributes(&mark_type.definition.attributes, &mark.attrs);
        let spec = mark_type.definition.render.render(&mark.attrs, rendered);
        MarkupNode::Element(build_element(spec, children))
    }

    fn spanning(&self, kind: &str) -> bool {
        self.schema.mark_type(kind).map_or(true, |mark| mark.spec().spanning)
    }
}

/// Element tree of a [`DomSpec`] with `content` placed in the hole
pub fn build_element(spec: DomSpec, content: Vec<MarkupNode>) -> Element {
    let mut content = Some(content);
    build_with(spec, &mut content)
}

fn build_with(spec: DomSpec, content: &mut Option<Vec<MarkupNode>>) -> Element {
    let mut element = Element::new(spec.tag).with_attributes(spec.attributes);
    for child in spec.children {
        element.children.push(MarkupNode::Element(build_with(child, content)));
    }
    if spec.hole {
        if let Some(content) = content.take() {
            element.children.extend(content);
        }
    }
    element
}

/// Render `doc` to markup source with `schema`
pub fn serialize_document(schema: &Schema, doc: &Node) -> String {
    DomSerializer::new(schema).to_html(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseSchema;
    use crate::builder::build;
    use crate::dom_parser::parse_document;

    fn schema() -> Schema {
        build(&[], &BaseSchema::standard()).unwrap()
    }

    #[test]
    fn test_shared_marks_stay_open() {
        let schema = schema();
        let doc = parse_document(&schema, "<p>a<strong>b<em>c</em>d</strong></p>").unwrap();

        assert_eq!(
            serialize_document(&schema, &doc),
            "<p>a<strong>b<em>c</em>d</strong></p>"
        );
    }

    #[test]
    fn test_heading_and_code_block() {
        let schema = schema();
        let doc = parse_document(
            &schema,
            "<h3>Title</h3><pre><code class=\"language-rust\">let x = 1;</code></pre>",
        )
        .unwrap();

        assert_eq!(
            serialize_document(&schema, &doc),
            "<h3>Title</h3><pre><code class=\"language-rust\">let x = 1;</code></pre>"
        );
    }

    #[test]
    fn test_default_attributes_are_not_rendered() {
        let schema = schema();
        let doc = parse_document(&schema, "<ol start=\"1\"><li><p>x</p></li></ol><ol start=\"3\"><li><p>y</p></li></ol>").unwrap();

        assert_eq!(
            serialize_document(&schema, &doc),
            "<ol><li><p>x</p></li></ol><ol start=\"3\"><li><p>y</p></li></ol>"
        );
    }

    #[test]
    fn test_leaf_nodes() {
        let schema = schema();
        let doc = parse_document(&schema, "<p>a<br>b</p><hr>").unwrap();

        assert_eq!(serialize_document(&schema, &doc), "<p>a<br>b</p><hr>");
    }
}
