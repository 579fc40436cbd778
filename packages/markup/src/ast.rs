use std::collections::BTreeMap;

/// Attribute map of an element. Ordered so serialized output is stable.
pub type Attributes = BTreeMap<String, String>;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A node of a parsed markup fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

impl MarkupNode {
    pub fn text(value: impl Into<String>) -> Self {
        MarkupNode::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            MarkupNode::Text(value) => value.clone(),
            MarkupNode::Element(element) => element.text_content(),
        }
    }
}

impl From<Element> for MarkupNode {
    fn from(element: Element) -> Self {
        MarkupNode::Element(element)
    }
}

/// Markup element: tag name, attributes, children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        merge_attributes(&mut self.attributes, attributes);
        self
    }

    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = MarkupNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(MarkupNode::Text(text.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Look up one property of the inline `style` attribute
    pub fn style(&self, property: &str) -> Option<String> {
        let style = self.attribute("style")?;
        parse_style(style)
            .into_iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(MarkupNode::text_content).collect()
    }
}

/// Split an inline style attribute into `(property, value)` declarations
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name.to_ascii_lowercase(), value.to_string()))
            }
        })
        .collect()
}

/// Merge `extra` into `base`.
///
/// `class` values are joined with a space and `style` values with `; `,
/// every other key in `extra` overrides the one in `base`.
pub fn merge_attributes(base: &mut Attributes, extra: Attributes) {
    for (name, value) in extra {
        match (name.as_str(), base.get_mut(&name)) {
            ("class", Some(existing)) if !value.is_empty() => {
                for class in value.split_whitespace() {
                    if !existing.split_whitespace().any(|c| c == class) {
                        if !existing.is_empty() {
                            existing.push(' ');
                        }
                        existing.push_str(class);
                    }
                }
            }
            ("style", Some(existing)) if !value.is_empty() => {
                let trimmed = existing.trim_end().trim_end_matches(';').to_string();
                *existing = if trimmed.is_empty() {
                    value
                } else {
                    format!("{}; {}", trimmed, value.trim_end_matches(';'))
                };
            }
            _ => {
                base.insert(name, value);
            }
        }
    }
}
