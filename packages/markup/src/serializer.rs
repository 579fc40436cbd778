use crate::ast::{Element, MarkupNode};

/// Serializer converts a markup tree back to source text.
///
/// Attributes are written in key order so the same tree always produces the
/// same text. Pretty output only breaks lines inside elements whose children
/// are all elements; mixed inline content is written as-is so whitespace in
/// text stays significant.
pub struct Serializer {
    pretty: bool,
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            pretty: false,
            indent_level: 0,
            indent_string: "  ".to_string(),
        }
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::new()
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            pretty: true,
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a fragment (sequence of sibling nodes)
    pub fn serialize(&mut self, nodes: &[MarkupNode]) -> String {
        let mut output = String::new();
        let block_layout = self.pretty && nodes.iter().all(|n| n.as_element().is_some());

        for node in nodes {
            if block_layout {
                self.write_indent(&mut output);
            }
            self.serialize_node(node, &mut output);
            if block_layout {
                output.push('\n');
            }
        }

        output
    }

    fn serialize_node(&mut self, node: &MarkupNode, output: &mut String) {
        match node {
            MarkupNode::Text(text) => output.push_str(&escape_text(text)),
            MarkupNode::Element(element) => self.serialize_element(element, output),
        }
    }

    fn serialize_element(&mut self, element: &Element, output: &mut String) {
        output.push('<');
        output.push_str(&element.tag);

        for (name, value) in &element.attributes {
            output.push(' ');
            output.push_str(name);
            output.push_str("=\"");
            output.push_str(&escape_attribute(value));
            output.push('"');
        }

        output.push('>');

        if element.is_void() {
            return;
        }

        let block_layout = self.pretty
            && !element.children.is_empty()
            && element.children.iter().all(|n| n.as_element().is_some());

        if block_layout {
            output.push('\n');
            self.indent_level += 1;
            for child in &element.children {
                self.write_indent(output);
                self.serialize_node(child, output);
                output.push('\n');
            }
            self.indent_level -= 1;
            self.write_indent(output);
        } else {
            for child in &element.children {
                self.serialize_node(child, output);
            }
        }

        output.push_str("</");
        output.push_str(&element.tag);
        output.push('>');
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Serialize a fragment in compact form
pub fn serialize(nodes: &[MarkupNode]) -> String {
    Serializer::new().serialize(nodes)
}
