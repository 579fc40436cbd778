use crate::ast::{is_void_element, Attributes, Element, MarkupNode};
use crate::error::{MarkupError, MarkupResult};
use crate::tokenizer::{decode_entities, ContentToken, TagToken};
use logos::{Lexer, Logos};

/// Block-level tags that implicitly close an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol",
    "p", "pre", "section", "table", "ul",
];

/// Lenient markup parser.
///
/// Mismatched closing tags close every element opened after the matching one,
/// stray closing tags are dropped and unclosed elements are closed at the end
/// of input. Only a tag cut off by the end of input is an error.
pub struct Parser<'src> {
    source: &'src str,
    stack: Vec<Element>,
    root: Vec<MarkupNode>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    /// Parse the source as a fragment (sequence of sibling nodes)
    pub fn parse_fragment(mut self) -> MarkupResult<Vec<MarkupNode>> {
        let mut lexer = ContentToken::lexer(self.source);

        while let Some(token) = lexer.next() {
            match token {
                Ok(ContentToken::OpenTag(name)) => {
                    let start = lexer.span().start;
                    let mut tag_lexer = lexer.morph::<TagToken>();
                    let (attributes, self_closing) = read_attributes(&mut tag_lexer, start)?;
                    lexer = tag_lexer.morph();
                    self.open(name, attributes, self_closing);
                }
                Ok(ContentToken::CloseTag(name)) => self.close(name),
                Ok(ContentToken::Text(text)) => self.push_text(&decode_entities(text)),
                Ok(ContentToken::Declaration) => {}
                // A '<' that does not start a tag is literal text
                Err(()) => self.push_text(lexer.slice()),
            }
        }

        while !self.stack.is_empty() {
            self.pop();
        }

        Ok(self.root)
    }

    fn open(&mut self, name: &str, attributes: Attributes, self_closing: bool) {
        let tag = name.to_ascii_lowercase();

        if let Some(current) = self.stack.last() {
            let implied_close = (current.tag == "p" && CLOSES_PARAGRAPH.contains(&tag.as_str()))
                || (current.tag == "li" && tag == "li");
            if implied_close {
                self.pop();
            }
        }

        let element = Element {
            tag,
            attributes,
            children: Vec::new(),
        };

        if self_closing || element.is_void() {
            self.push_node(MarkupNode::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn close(&mut self, name: &str) {
        let tag = name.to_ascii_lowercase();
        if is_void_element(&tag) {
            return;
        }

        if let Some(index) = self.stack.iter().rposition(|e| e.tag == tag) {
            while self.stack.len() > index {
                self.pop();
            }
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.push_node(MarkupNode::Element(element));
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let children = self.current_children();
        if let Some(MarkupNode::Text(previous)) = children.last_mut() {
            previous.push_str(text);
        } else {
            children.push(MarkupNode::Text(text.to_string()));
        }
    }

    fn push_node(&mut self, node: MarkupNode) {
        self.current_children().push(node);
    }

    fn current_children(&mut self) -> &mut Vec<MarkupNode> {
        match self.stack.last_mut() {
            Some(element) => &mut element.children,
            None => &mut self.root,
        }
    }
}

fn read_attributes<'src>(
    lexer: &mut Lexer<'src, TagToken<'src>>,
    start: usize,
) -> MarkupResult<(Attributes, bool)> {
    let mut attributes = Attributes::new();
    let mut pending: Option<String> = None;

    loop {
        match lexer.next() {
            None => return Err(MarkupError::unexpected_eof(start)),
            Some(Ok(TagToken::End)) => {
                flush_pending(&mut attributes, pending.take());
                return Ok((attributes, false));
            }
            Some(Ok(TagToken::SelfClosingEnd)) => {
                flush_pending(&mut attributes, pending.take());
                return Ok((attributes, true));
            }
            Some(Ok(TagToken::Word(word))) => {
                flush_pending(&mut attributes, pending.take());
                pending = Some(word.to_ascii_lowercase());
            }
            Some(Ok(TagToken::Equals)) => {
                let name = pending.take().ok_or_else(|| {
                    MarkupError::invalid_syntax(lexer.span().start, "attribute value without a name")
                })?;
                let value = match lexer.next() {
                    Some(Ok(TagToken::Quoted(value))) | Some(Ok(TagToken::Word(value))) => {
                        decode_entities(value)
                    }
                    _ => {
                        return Err(MarkupError::invalid_syntax(
                            lexer.span().start,
                            format!("expected a value for attribute '{}'", name),
                        ))
                    }
                };
                // First occurrence wins, as in browsers
                attributes.entry(name).or_insert(value);
            }
            Some(Ok(TagToken::Quoted(value))) => {
                return Err(MarkupError::invalid_syntax(
                    lexer.span().start,
                    format!("unexpected quoted value \"{}\"", value),
                ))
            }
            Some(Err(())) => {
                return Err(MarkupError::invalid_syntax(
                    lexer.span().start,
                    format!("unexpected '{}' inside tag", lexer.slice()),
                ))
            }
        }
    }
}

fn flush_pending(attributes: &mut Attributes, pending: Option<String>) {
    if let Some(name) = pending {
        attributes.entry(name).or_default();
    }
}

/// Parse a markup fragment
pub fn parse(source: &str) -> MarkupResult<Vec<MarkupNode>> {
    Parser::new(source).parse_fragment()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &MarkupNode) -> &Element {
        node.as_element().expect("expected element")
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse(r#"<div data-type="layout-block" data-columns="2"><div data-type="layout-column"><p>Hi</p></div></div>"#).unwrap();

        assert_eq!(nodes.len(), 1);
        let layout = element(&nodes[0]);
        assert_eq!(layout.tag, "div");
        assert_eq!(layout.attribute("data-type"), Some("layout-block"));
        assert_eq!(layout.attribute("data-columns"), Some("2"));

        let column = element(&layout.children[0]);
        let paragraph = element(&column.children[0]);
        assert_eq!(paragraph.tag, "p");
        assert_eq!(paragraph.text_content(), "Hi");
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse(r#"<p>a<br>b<img src="/assets/x"/>c</p>"#).unwrap();
        let paragraph = element(&nodes[0]);

        assert_eq!(paragraph.children.len(), 5);
        assert_eq!(element(&paragraph.children[1]).tag, "br");
        assert_eq!(element(&paragraph.children[3]).attribute("src"), Some("/assets/x"));
    }

    #[test]
    fn test_boolean_attribute_and_entities() {
        let nodes = parse(r#"<video controls src="/a?x=1&amp;y=2"></video>"#).unwrap();
        let video = element(&nodes[0]);

        assert_eq!(video.attribute("controls"), Some(""));
        assert_eq!(video.attribute("src"), Some("/a?x=1&y=2"));
    }

    #[test]
    fn test_mismatched_close_recovers() {
        let nodes = parse("<ul><li>one<li>two</ul><p>after").unwrap();

        assert_eq!(nodes.len(), 2);
        let list = element(&nodes[0]);
        assert_eq!(list.children.len(), 2);
        assert_eq!(element(&nodes[1]).text_content(), "after");
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let nodes = parse("<p>1 < 2</p>").unwrap();
        assert_eq!(element(&nodes[0]).text_content(), "1 < 2");
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        let err = parse(r#"<p class="x""#).unwrap_err();
        assert!(matches!(err, MarkupError::UnexpectedEof { pos: 0 }));
    }
}
