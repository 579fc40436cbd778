//! # Markup → document
//!
//! Reads a markup fragment into a document that satisfies the schema.
//! Elements are matched against the parse rules of every type (priority,
//! then specificity, then schema order; first match wins). Elements no rule
//! claims are transparent: their children are read in place. Loose inline
//! content inside containers is wrapped in the default textblock and
//! missing required children are filled in.

use crate::attribute::{fill_defaults, parse_attributes};
use crate::dom::ParseRule;
use crate::error::SchemaResult;
use crate::schema::Schema;
use folio_markup::{Element, MarkupNode};
use folio_model::inline::normalize_inline;
use folio_model::{Attrs, Mark, Node};
use tracing::debug;

/// Elements whose content is never document text
const IGNORED_TAGS: &[&str] = &["head", "script", "style", "template", "title"];

/// How deep `find_wrapping` searches for intermediate container types
const MAX_WRAP_DEPTH: usize = 3;

struct TypedRule<'a> {
    rule: &'a ParseRule,
    type_name: &'a str,
    order: usize,
}

pub struct DomParser<'a> {
    schema: &'a Schema,
    node_rules: Vec<TypedRule<'a>>,
    mark_rules: Vec<TypedRule<'a>>,
}

impl<'a> DomParser<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        let mut node_rules = Vec::new();
        for node in schema.nodes() {
            for rule in &node.definition.parse_rules {
                node_rules.push(TypedRule {
                    rule,
                    type_name: node.name(),
                    order: node_rules.len(),
                });
            }
        }
        let mut mark_rules = Vec::new();
        for mark in schema.marks() {
            for rule in &mark.definition.parse_rules {
                mark_rules.push(TypedRule {
                    rule,
                    type_name: mark.name(),
                    order: mark_rules.len(),
                });
            }
        }
        sort_rules(&mut node_rules);
        sort_rules(&mut mark_rules);

        Self {
            schema,
            node_rules,
            mark_rules,
        }
    }

    /// Parse markup source into a document
    pub fn parse_str(&self, source: &str) -> SchemaResult<Node> {
        let markup = folio_markup::parse(source)?;
        self.parse(&markup)
    }

    /// Parse a markup fragment into a document
    pub fn parse(&self, markup: &[MarkupNode]) -> SchemaResult<Node> {
        let top = self.schema.top_node();
        let mut items = Vec::new();
        self.read_nodes(markup, &[], &mut items);
        let content = self.fit(top, items)?;
        self.schema.node(top, &Attrs::new(), content)
    }

    fn read_nodes(&self, markup: &[MarkupNode], marks: &[Mark], out: &mut Vec<Node>) {
        for node in markup {
            match node {
                MarkupNode::Text(text) => {
                    let text = collapse_whitespace(text);
                    if !text.is_empty() {
                        out.push(Node::text_with_marks(text, marks.to_vec()));
                    }
                }
                MarkupNode::Element(element) => self.read_element(element, marks, out),
            }
        }
    }

    fn read_element(&self, element: &Element, marks: &[Mark], out: &mut Vec<Node>) {
        if IGNORED_TAGS.contains(&element.tag.as_str()) {
            return;
        }

        if let Some((type_name, rule_attrs)) = match_rule(&self.node_rules, element) {
            match self.read_node(type_name, rule_attrs, element, marks) {
                Ok(Some(node)) => out.push(node),
                Ok(None) => {}
                Err(err) => debug!(type_name, error = %err, "Skipping unreadable element"),
            }
            return;
        }

        if let Some((type_name, rule_attrs)) = match_rule(&self.mark_rules, element) {
            if let Some(mark_type) = self.schema.mark_type(type_name) {
                let mut attrs = parse_attributes(&mark_type.definition.attributes, element);
                attrs.extend(rule_attrs);
                let mark = Mark::new(type_name).with_attrs(fill_defaults(&mark_type.definition.attributes, &attrs));
                let marks = self.schema.add_mark(marks, mark);
                self.read_nodes(&element.children, &marks, out);
                return;
            }
        }

        self.read_nodes(&element.children, marks, out);
    }

    fn read_node(
        &self,
        type_name: &str,
        rule_attrs: Attrs,
        element: &Element,
        marks: &[Mark],
    ) -> SchemaResult<Option<Node>> {
        let Some(node_type) = self.schema.node_type(type_name) else {
            return Ok(None);
        };
        let mut attrs = parse_attributes(&node_type.definition.attributes, element);
        attrs.extend(rule_attrs);
        let mut node = self.schema.node(type_name, &attrs, Vec::new())?;

        if node_type.is_leaf() {
            if node_type.is_inline() {
                node.marks = marks.to_vec();
            }
        } else if node_type.spec().code {
            let text = element.text_content();
            if !text.is_empty() {
                node.content = vec![Node::text(text)];
            }
        } else if node_type.is_textblock() {
            let mut items = Vec::new();
            self.read_nodes(&element.children, marks, &mut items);
            node.content = self.inline_content(type_name, items);
        } else {
            let mut items = Vec::new();
            self.read_nodes(&element.children, &[], &mut items);
            node.content = self.fit(type_name, items)?;
        }
        Ok(Some(node))
    }

    /// Inline content of a textblock: nested blocks are flattened, marks are
    /// dropped where the parent does not allow them, edges are trimmed.
    fn inline_content(&self, parent: &str, items: Vec<Node>) -> Vec<Node> {
        let mut leaves = Vec::new();
        for item in items {
            self.collect_inline(item, &mut leaves);
        }
        if !self.schema.allows_marks(parent) {
            leaves.iter_mut().for_each(|leaf| leaf.marks.clear());
        }
        trim_edges(&mut leaves);
        normalize_inline(leaves)
    }

    fn collect_inline(&self, node: Node, leaves: &mut Vec<Node>) {
        if node.is_text() || self.schema.is_inline(&node.kind) {
            leaves.push(node);
        } else {
            for child in node.content {
                self.collect_inline(child, leaves);
            }
        }
    }

    /// Arrange parsed items as the children of a `parent` container
    fn fit(&self, parent: &str, items: Vec<Node>) -> SchemaResult<Vec<Node>> {
        let mut result = Vec::new();
        let mut run = Vec::new();
        for item in items {
            if item.is_text() || self.schema.is_inline(&item.kind) {
                run.push(item);
            } else {
                self.flush_inline(parent, &mut run, &mut result)?;
                self.place(parent, item, &mut result)?;
            }
        }
        self.flush_inline(parent, &mut run, &mut result)?;
        self.schema.fill_content(parent, result)
    }

    fn flush_inline(&self, parent: &str, run: &mut Vec<Node>, result: &mut Vec<Node>) -> SchemaResult<()> {
        let items = std::mem::take(run);
        if items
            .iter()
            .all(|item| item.is_text() && item.text.as_deref().unwrap_or_default().trim().is_empty())
        {
            return Ok(());
        }
        let Some(textblock) = self.schema.default_textblock() else {
            debug!(parent, "No textblock for loose inline content");
            return Ok(());
        };
        let content = self.inline_content(textblock, items);
        let block = self.schema.node(textblock, &Attrs::new(), content)?;
        self.place(parent, block, result)
    }

    fn place(&self, parent: &str, node: Node, result: &mut Vec<Node>) -> SchemaResult<()> {
        let Some(parent_type) = self.schema.node_type(parent) else {
            return Ok(());
        };
        if parent_type.content.allows(&node.kind) {
            result.push(node);
            return Ok(());
        }

        if let Some(wrapping) = self.find_wrapping(parent, &node.kind) {
            // consecutive loose blocks share one wrapper
            if let Some(last) = result.last_mut() {
                if Some(&last.kind) == wrapping.first() && wrapping.len() == 1 {
                    let mut children = std::mem::take(&mut last.content);
                    children.push(node);
                    if self.schema.content_matches(&last.kind, &children) {
                        last.content = children;
                        return Ok(());
                    }
                    let node = children.pop();
                    last.content = children;
                    if let Some(node) = node {
                        return self.push_wrapped(&wrapping, node, result);
                    }
                    return Ok(());
                }
            }
            return self.push_wrapped(&wrapping, node, result);
        }

        if !node.content.is_empty() && !self.schema.is_textblock(&node.kind) {
            debug!(parent, child = %node.kind, "Lifting children of misplaced node");
            for child in node.content {
                self.place(parent, child, result)?;
            }
            return Ok(());
        }

        debug!(parent, child = %node.kind, "Dropping node the parent cannot hold");
        Ok(())
    }

    fn push_wrapped(&self, wrapping: &[String], node: Node, result: &mut Vec<Node>) -> SchemaResult<()> {
        let mut wrapped = node;
        for wrapper in wrapping.iter().rev() {
            let content = self.schema.fill_content(wrapper, vec![wrapped])?;
            wrapped = self.schema.node(wrapper, &Attrs::new(), content)?;
        }
        result.push(wrapped);
        Ok(())
    }

    /// Shortest chain of container types that lets `child` live in `parent`
    pub fn find_wrapping(&self, parent: &str, child: &str) -> Option<Vec<String>> {
        let mut frontier: Vec<Vec<String>> = vec![Vec::new()];
        for _ in 0..MAX_WRAP_DEPTH {
            let mut next = Vec::new();
            for path in frontier {
                let current = path.last().map(String::as_str).unwrap_or(parent);
                let node_type = self.schema.node_type(current)?;
                for candidate in node_type.content.allowed_types() {
                    let Some(candidate_type) = self.schema.node_type(candidate) else {
                        continue;
                    };
                    if candidate_type.is_leaf() || candidate_type.is_textblock() || path.iter().any(|p| p == candidate) {
                        continue;
                    }
                    let mut extended = path.clone();
                    extended.push(candidate.to_string());
                    if candidate_type.content.allows(child) {
                        return Some(extended);
                    }
                    next.push(extended);
                }
            }
            frontier = next;
        }
        None
    }
}

fn sort_rules(rules: &mut [TypedRule<'_>]) {
    rules.sort_by(|a, b| {
        b.rule
            .priority
            .cmp(&a.rule.priority)
            .then(b.rule.specificity().cmp(&a.rule.specificity()))
            .then(a.order.cmp(&b.order))
    });
}

fn match_rule<'r>(rules: &'r [TypedRule<'_>], element: &Element) -> Option<(&'r str, Attrs)> {
    rules
        .iter()
        .find_map(|typed| typed.rule.matches(element).map(|attrs| (typed.type_name, attrs)))
}

/// Runs of whitespace become one space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn trim_edges(leaves: &mut Vec<Node>) {
    if let Some(text) = leaves.first_mut().and_then(|leaf| leaf.text.as_mut()) {
        *text = text.trim_start().to_string();
    }
    if let Some(text) = leaves.last_mut().and_then(|leaf| leaf.text.as_mut()) {
        *text = text.trim_end().to_string();
    }
    leaves.retain(|leaf| leaf.text.as_deref() != Some(""));
}

/// Parse markup source with `schema`
pub fn parse_document(schema: &Schema, source: &str) -> SchemaResult<Node> {
    DomParser::new(schema).parse_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseSchema;
    use crate::builder::build;
    use serde_json::json;

    fn schema() -> Schema {
        build(&[], &BaseSchema::standard()).unwrap()
    }

    #[test]
    fn test_parse_paragraphs_and_marks() {
        let schema = schema();
        let doc = parse_document(&schema, "<p>Hello <strong>big <em>world</em></strong></p><h2>Title</h2>").unwrap();

        assert_eq!(doc.content.len(), 2);
        let paragraph = &doc.content[0];
        assert_eq!(paragraph.content.len(), 3);
        assert_eq!(paragraph.content[2].text.as_deref(), Some("world"));
        let kinds: Vec<&str> = paragraph.content[2].marks.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, vec!["bold", "italic"]);

        assert_eq!(doc.content[1].attr("level"), Some(&json!(2)));
        assert!(schema.validate(&doc).is_ok());
    }

    #[test]
    fn test_loose_text_is_wrapped() {
        let schema = schema();
        let doc = parse_document(&schema, "just text <b>bold</b>").unwrap();

        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].kind, "paragraph");
        assert_eq!(doc.content[0].text_content(), "just text bold");
    }

    #[test]
    fn test_list_item_text_gets_paragraph() {
        let schema = schema();
        let doc = parse_document(&schema, "<ul>\n  <li>one</li>\n  <li><p>two</p></li>\n</ul>").unwrap();
        let list = &doc.content[0];

        assert_eq!(list.kind, "bulletList");
        assert_eq!(list.content.len(), 2);
        assert_eq!(list.content[0].content[0].kind, "paragraph");
        assert_eq!(list.content[1].text_content(), "two");
        assert!(schema.validate(&doc).is_ok());
    }

    #[test]
    fn test_unknown_elements_are_transparent() {
        let schema = schema();
        let doc = parse_document(&schema, "<section><article><p>a</p></article><p>b</p></section>").unwrap();

        assert_eq!(doc.content.len(), 2);
        assert_eq!(doc.text_content(), "ab");
    }

    #[test]
    fn test_empty_input_gives_filled_document() {
        let schema = schema();
        let doc = parse_document(&schema, "").unwrap();

        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].kind, "paragraph");
    }

    #[test]
    fn test_code_block_keeps_whitespace() {
        let schema = schema();
        let doc = parse_document(&schema, "<pre><code class=\"language-rust\">fn  main() {}\n</code></pre>").unwrap();
        let code = &doc.content[0];

        assert_eq!(code.kind, "codeBlock");
        assert_eq!(code.attr("language"), Some(&json!("rust")));
        assert_eq!(code.text_content(), "fn  main() {}\n");
    }

    #[test]
    fn test_block_in_list_is_wrapped() {
        let schema = schema();
        let doc = parse_document(&schema, "<ul><p>stray</p></ul>").unwrap();
        let list = &doc.content[0];

        assert_eq!(list.content[0].kind, "listItem");
        assert_eq!(list.content[0].text_content(), "stray");
    }
}
