//! Markup rules of a definition: how elements are recognized when parsing
//! and what a node or mark turns into when serializing.

use folio_markup::{merge_attributes, Attributes, Element};
use folio_model::Attrs;
use std::fmt;
use std::sync::Arc;

pub type GetAttrsFn = Arc<dyn Fn(&Element) -> Option<Attrs> + Send + Sync>;
pub type RenderFn = Arc<dyn Fn(&Attrs, Attributes) -> DomSpec + Send + Sync>;

pub const DEFAULT_PRIORITY: i32 = 50;

/// Attribute predicate of a parse rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Present(String),
    Equals(String, String),
    /// Present and not starting with the prefix
    NotPrefix(String, String),
}

impl AttrMatch {
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            AttrMatch::Present(name) => element.has_attribute(name),
            AttrMatch::Equals(name, value) => element.attribute(name) == Some(value.as_str()),
            AttrMatch::NotPrefix(name, prefix) => element
                .attribute(name)
                .is_some_and(|value| !value.starts_with(prefix.as_str())),
        }
    }
}

/// Recognizes an element as an instance of a node or mark type
#[derive(Clone)]
pub struct ParseRule {
    pub tag: String,
    pub matchers: Vec<AttrMatch>,
    /// Attributes set by the rule itself (a heading level from `h2`)
    pub attrs: Attrs,
    pub priority: i32,
    /// Runs after the predicates; `None` rejects the element
    pub get_attrs: Option<GetAttrsFn>,
}

impl ParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            matchers: Vec::new(),
            attrs: Attrs::new(),
            priority: DEFAULT_PRIORITY,
            get_attrs: None,
        }
    }

    pub fn with_attr_present(mut self, name: impl Into<String>) -> Self {
        self.matchers.push(AttrMatch::Present(name.into()));
        self
    }

    pub fn with_attr_equals(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.matchers.push(AttrMatch::Equals(name.into(), value.into()));
        self
    }

    pub fn with_attr_not_prefix(mut self, name: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.matchers.push(AttrMatch::NotPrefix(name.into(), prefix.into()));
        self
    }

    pub fn with_static_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_get_attrs<F>(mut self, get_attrs: F) -> Self
    where
        F: Fn(&Element) -> Option<Attrs> + Send + Sync + 'static,
    {
        self.get_attrs = Some(Arc::new(get_attrs));
        self
    }

    /// Match `element`, returning the attributes the rule contributes
    pub fn matches(&self, element: &Element) -> Option<Attrs> {
        if element.tag != self.tag || !self.matchers.iter().all(|m| m.matches(element)) {
            return None;
        }
        let mut attrs = self.attrs.clone();
        if let Some(get_attrs) = &self.get_attrs {
            attrs.extend(get_attrs(element)?);
        }
        Some(attrs)
    }

    /// Rules with more predicates are more specific
    pub fn specificity(&self) -> usize {
        self.matchers.len()
    }
}

impl fmt::Debug for ParseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseRule")
            .field("tag", &self.tag)
            .field("matchers", &self.matchers)
            .field("attrs", &self.attrs)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Output shape of a rendered node or mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSpec {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<DomSpec>,
    /// The node's content goes inside this element, after `children`
    pub hole: bool,
}

impl DomSpec {
    pub fn new(tag: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children: Vec::new(),
            hole: false,
        }
    }

    pub fn with_hole(mut self) -> Self {
        self.hole = true;
        self
    }

    pub fn with_child(mut self, child: DomSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Turns a node or mark into markup. Receives the typed attributes and the
/// markup attributes already produced by the attribute descriptors.
#[derive(Clone)]
pub struct RenderSpec(RenderFn);

impl RenderSpec {
    /// `tag` wrapping the content
    pub fn tag(tag: &str) -> Self {
        Self::tag_with(tag, Attributes::new())
    }

    /// `tag` wrapping the content, with static attributes merged under the
    /// descriptor output
    pub fn tag_with(tag: &str, fixed: Attributes) -> Self {
        let tag = tag.to_string();
        RenderSpec(Arc::new(move |_, rendered| {
            DomSpec::new(tag.clone(), with_fixed(&fixed, rendered)).with_hole()
        }))
    }

    /// Childless element for atoms
    pub fn leaf(tag: &str) -> Self {
        Self::leaf_with(tag, Attributes::new())
    }

    pub fn leaf_with(tag: &str, fixed: Attributes) -> Self {
        let tag = tag.to_string();
        RenderSpec(Arc::new(move |_, rendered| {
            DomSpec::new(tag.clone(), with_fixed(&fixed, rendered))
        }))
    }

    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&Attrs, Attributes) -> DomSpec + Send + Sync + 'static,
    {
        RenderSpec(Arc::new(render))
    }

    pub fn render(&self, attrs: &Attrs, rendered: Attributes) -> DomSpec {
        (self.0)(attrs, rendered)
    }
}

impl fmt::Debug for RenderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderSpec(..)")
    }
}

/// Static attributes first, descriptor output merged over them
pub fn with_fixed(fixed: &Attributes, rendered: Attributes) -> Attributes {
    let mut attributes = fixed.clone();
    merge_attributes(&mut attributes, rendered);
    attributes
}

/// Build an attribute map from literal pairs
pub fn attributes<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_predicates() {
        let rule = ParseRule::tag("video")
            .with_attr_present("src")
            .with_attr_not_prefix("src", "data:");

        assert!(rule.matches(&Element::new("video").with_attribute("src", "/assets/a")).is_some());
        assert!(rule.matches(&Element::new("video").with_attribute("src", "data:x")).is_none());
        assert!(rule.matches(&Element::new("video")).is_none());
        assert!(rule.matches(&Element::new("img").with_attribute("src", "/a")).is_none());
        assert_eq!(rule.specificity(), 2);
    }

    #[test]
    fn test_static_attrs() {
        let rule = ParseRule::tag("h3").with_static_attr("level", 3);
        let attrs = rule.matches(&Element::new("h3")).unwrap();
        assert_eq!(attrs.get("level"), Some(&json!(3)));
    }

    #[test]
    fn test_tag_render_merges_fixed_attributes() {
        let render = RenderSpec::tag_with(
            "div",
            attributes([("data-type", "layout-block"), ("class", "layout-block")]),
        );
        let spec = render.render(&Attrs::new(), attributes([("class", "wide")]));

        assert!(spec.hole);
        assert_eq!(spec.attributes.get("class").unwrap(), "layout-block wide");
        assert_eq!(spec.attributes.get("data-type").unwrap(), "layout-block");
    }
}
